//! Competition ranking ("1224"): ties share the lowest rank and the next
//! distinct value resumes at the count of rows ranked so far plus one.

use crate::data::{Metric, TradeRecord};
use std::collections::BTreeMap;

/// Rank values descending. Undefined values get no rank and do not count
/// towards anyone else's rank.
pub fn competition_ranks(values: &[Option<f64>]) -> Vec<Option<u32>> {
    let mut order: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|x| !x.is_nan()).map(|x| (i, x)))
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut ranks = vec![None; values.len()];
    let mut previous: Option<(f64, u32)> = None;

    for (position, (index, value)) in order.into_iter().enumerate() {
        let rank = match previous {
            Some((prev, rank)) if prev == value => rank,
            _ => position as u32 + 1,
        };
        ranks[index] = Some(rank);
        previous = Some((value, rank));
    }

    ranks
}

/// World rank of every record for one metric, computed per year.
/// The result is aligned with `records`.
pub fn rank_within_years(records: &[TradeRecord], metric: Metric) -> Vec<Option<u32>> {
    let mut by_year: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, r) in records.iter().enumerate() {
        by_year.entry(r.year).or_default().push(i);
    }

    let mut ranks = vec![None; records.len()];
    for indices in by_year.values() {
        let values: Vec<Option<f64>> = indices.iter().map(|&i| metric.value(&records[i])).collect();
        for (&i, rank) in indices.iter().zip(competition_ranks(&values)) {
            ranks[i] = rank;
        }
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ties_share_lowest_rank_and_skip() {
        let ranks = competition_ranks(&[Some(5.0), Some(9.0), Some(5.0), Some(1.0)]);
        assert_eq!(ranks, vec![Some(2), Some(1), Some(2), Some(4)]);
    }

    #[test]
    fn negative_values_rank_last() {
        let ranks = competition_ranks(&[Some(-3.0), Some(0.0), Some(-1.0)]);
        assert_eq!(ranks, vec![Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn undefined_values_are_unranked() {
        let ranks = competition_ranks(&[None, Some(2.0), Some(f64::NAN), Some(3.0)]);
        assert_eq!(ranks, vec![None, Some(2), None, Some(1)]);
    }

    proptest! {
        #[test]
        fn rank_is_one_plus_strictly_greater(values in prop::collection::vec(-50i32..50, 0..40)) {
            let values: Vec<Option<f64>> = values.into_iter().map(|v| Some(v as f64)).collect();
            let ranks = competition_ranks(&values);

            for (v, rank) in values.iter().zip(&ranks) {
                let v = v.unwrap();
                let greater = values.iter().filter(|o| o.unwrap() > v).count() as u32;
                prop_assert_eq!(*rank, Some(greater + 1));
            }

            if !values.is_empty() {
                prop_assert!(ranks.contains(&Some(1)));
            }
        }
    }
}

//! Statistics Calculator Module
//! Reductions over metric values where some values may be undefined.

use statrs::statistics::Statistics;

/// Lower percentile used for map colour scaling.
pub const COLOR_LOW_PERCENTILE: f64 = 3.0;
/// Upper percentile used for map colour scaling.
pub const COLOR_HIGH_PERCENTILE: f64 = 97.0;

/// Handles numeric reductions for the query engine.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Defined, finite values only.
    pub fn defined(values: impl IntoIterator<Item = Option<f64>>) -> Vec<f64> {
        values
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .collect()
    }

    /// Sum of the defined values; `None` when there are none.
    pub fn sum(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
        let defined = Self::defined(values);
        if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum())
        }
    }

    /// Arithmetic mean of the defined values; `None` when there are none.
    pub fn mean(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
        let defined = Self::defined(values);
        if defined.is_empty() {
            None
        } else {
            Some(defined.iter().mean())
        }
    }

    /// `part / total * 100`; `None` when the total is zero.
    pub fn percent_of(part: f64, total: f64) -> Option<f64> {
        if total == 0.0 {
            None
        } else {
            Some(part / total * 100.0)
        }
    }

    /// Percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> Option<f64> {
        let n = sorted_values.len();
        if n == 0 {
            return None;
        }
        if n == 1 {
            return Some(sorted_values[0]);
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            Some(sorted_values[lower])
        } else {
            Some(sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac)
        }
    }

    /// Low and high colour-scale bounds of the defined values.
    pub fn color_bounds(values: impl IntoIterator<Item = Option<f64>>) -> Option<(f64, f64)> {
        let mut sorted = Self::defined(values);
        sorted.sort_by(|a, b| a.total_cmp(b));

        let low = Self::percentile(&sorted, COLOR_LOW_PERCENTILE)?;
        let high = Self::percentile(&sorted, COLOR_HIGH_PERCENTILE)?;
        Some((low, high))
    }
}

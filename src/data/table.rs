//! Canonical Table Module
//! The immutable, fully prepared trade table and its metric vocabulary.

use crate::geo::Continent;
use crate::schema::canonical;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Base and derived metrics a query can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    Import,
    Export,
    Production,
    Consumption,
    #[serde(rename = "Net Trade")]
    NetTrade,
    #[serde(rename = "Self-Sufficiency Ratio")]
    SelfSufficiencyRatio,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Import,
        Metric::Export,
        Metric::Production,
        Metric::Consumption,
        Metric::NetTrade,
        Metric::SelfSufficiencyRatio,
    ];

    /// The four metrics summed by the aggregator.
    pub const BASE: [Metric; 4] = [
        Metric::Import,
        Metric::Export,
        Metric::Production,
        Metric::Consumption,
    ];

    /// Canonical column name.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Import => canonical::IMPORT,
            Metric::Export => canonical::EXPORT,
            Metric::Production => canonical::PRODUCTION,
            Metric::Consumption => canonical::CONSUMPTION,
            Metric::NetTrade => canonical::NET_TRADE,
            Metric::SelfSufficiencyRatio => canonical::SELF_SUFFICIENCY_RATIO,
        }
    }

    /// Column name of this metric's world rank.
    pub fn rank_column(&self) -> String {
        format!("{}{}", self.name(), canonical::RANK_SUFFIX)
    }

    /// Value of this metric on a record; `None` when undefined.
    pub fn value(&self, record: &TradeRecord) -> Option<f64> {
        match self {
            Metric::Import => Some(record.import),
            Metric::Export => Some(record.export),
            Metric::Production => Some(record.production),
            Metric::Consumption => Some(record.consumption),
            Metric::NetTrade => Some(record.net_trade),
            Metric::SelfSufficiencyRatio => record.self_sufficiency_ratio,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| {
                m.name().eq_ignore_ascii_case(wanted)
                    || format!("{m:?}").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| wanted.to_string())
    }
}

/// One canonical row, unique per (area, continent, identifier, year).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub area: String,
    pub continent: Continent,
    pub country_identifier: String,
    pub year: i32,
    pub import: f64,
    pub export: f64,
    pub production: f64,
    pub consumption: f64,
    pub net_trade: f64,
    pub self_sufficiency_ratio: Option<f64>,
}

/// The finished table. Built once, never mutated.
#[derive(Debug, Clone, Default)]
pub struct TradeTable {
    records: Vec<TradeRecord>,
    years: Vec<i32>,
}

impl TradeTable {
    pub fn new(records: Vec<TradeRecord>) -> Self {
        let years = records
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self { records, years }
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.years.binary_search(&year).is_ok()
    }

    /// Distinct area names, sorted.
    pub fn areas(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.area.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(area: &str, year: i32) -> TradeRecord {
        TradeRecord {
            area: area.to_string(),
            continent: Continent::Asia,
            country_identifier: "XXX".to_string(),
            year,
            import: 1.0,
            export: 2.0,
            production: 3.0,
            consumption: 0.0,
            net_trade: 1.0,
            self_sufficiency_ratio: None,
        }
    }

    #[test]
    fn metric_names_parse() {
        assert_eq!("Net Trade".parse::<Metric>(), Ok(Metric::NetTrade));
        assert_eq!("self-sufficiency ratio".parse::<Metric>(), Ok(Metric::SelfSufficiencyRatio));
        assert_eq!("NetTrade".parse::<Metric>(), Ok(Metric::NetTrade));
        assert_eq!("import".parse::<Metric>(), Ok(Metric::Import));
        assert!("Yield".parse::<Metric>().is_err());
    }

    #[test]
    fn rank_columns_use_suffix() {
        assert_eq!(Metric::NetTrade.rank_column(), "Net Trade_Rank");
        assert_eq!(Metric::Import.rank_column(), "Import_Rank");
    }

    #[test]
    fn undefined_ratio_has_no_value() {
        let r = record("A", 2000);
        assert_eq!(Metric::SelfSufficiencyRatio.value(&r), None);
        assert_eq!(Metric::Production.value(&r), Some(3.0));
    }

    #[test]
    fn years_and_areas_are_distinct_and_sorted() {
        let table = TradeTable::new(vec![
            record("B", 2001),
            record("A", 1999),
            record("B", 1999),
        ]);
        assert_eq!(table.years(), &[1999, 2001]);
        assert_eq!(table.latest_year(), Some(2001));
        assert!(table.has_year(1999));
        assert!(!table.has_year(2000));
        assert_eq!(table.areas(), vec!["A", "B"]);
    }
}

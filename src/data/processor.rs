//! Data Processor Module
//! Join, classification, aggregation and derived-metric stages.

use super::cleaner::{CleanTradeRecord, Metrics, ReferenceEntry};
use super::table::TradeRecord;
use crate::geo::{Continent, ContinentClassifier};
use std::collections::{BTreeMap, HashMap};

/// Trade row after the left join; `country_identifier` is `None` on a miss.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub area: String,
    pub numeric_code: Option<i64>,
    pub country_identifier: Option<String>,
    pub year: i32,
    pub metrics: Metrics,
}

/// Trade row with a resolved continent and identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub area: String,
    pub continent: Continent,
    pub country_identifier: String,
    pub year: i32,
    pub metrics: Metrics,
}

/// Lookup from numeric code to country identifier.
///
/// Numeric codes are expected to be unique. A duplicated code makes the join
/// emit one row per matching entry; the count is kept for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    by_code: HashMap<i64, Vec<String>>,
    duplicate_codes: usize,
}

impl ReferenceIndex {
    pub fn new(entries: &[ReferenceEntry]) -> Self {
        let mut by_code: HashMap<i64, Vec<String>> = HashMap::new();
        for entry in entries {
            by_code
                .entry(entry.numeric_code)
                .or_default()
                .push(entry.country_identifier.clone());
        }
        let duplicate_codes = by_code.values().filter(|ids| ids.len() > 1).count();

        Self {
            by_code,
            duplicate_codes,
        }
    }

    pub fn lookup(&self, code: i64) -> &[String] {
        self.by_code.get(&code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of numeric codes with more than one entry.
    pub fn duplicate_codes(&self) -> usize {
        self.duplicate_codes
    }
}

/// Grouping key of the aggregator.
type GroupKey = (String, Continent, String, i32);

/// Handles the transformation stages between cleaning and the canonical table.
pub struct DataProcessor;

impl DataProcessor {
    /// Left outer join of trade rows to the reference table on numeric code.
    pub fn join(records: Vec<CleanTradeRecord>, index: &ReferenceIndex) -> Vec<JoinedRecord> {
        let mut joined = Vec::with_capacity(records.len());

        for record in records {
            let matches = record.numeric_code.map(|c| index.lookup(c)).unwrap_or(&[]);

            if matches.is_empty() {
                joined.push(JoinedRecord {
                    area: record.area,
                    numeric_code: record.numeric_code,
                    country_identifier: None,
                    year: record.year,
                    metrics: record.metrics,
                });
                continue;
            }

            for id in matches {
                joined.push(JoinedRecord {
                    area: record.area.clone(),
                    numeric_code: record.numeric_code,
                    country_identifier: Some(id.clone()),
                    year: record.year,
                    metrics: record.metrics,
                });
            }
        }

        joined
    }

    /// Resolve a continent for every joined row.
    ///
    /// Rows lacking a code, an identifier or a continent are dropped; the
    /// second value is how many.
    pub fn classify<C>(records: Vec<JoinedRecord>, classifier: &C) -> (Vec<ClassifiedRecord>, usize)
    where
        C: ContinentClassifier + ?Sized,
    {
        let total = records.len();

        let classified: Vec<ClassifiedRecord> = records
            .into_iter()
            .filter_map(|r| {
                let continent = r.numeric_code.and_then(|c| classifier.classify(c))?;
                let country_identifier = r.country_identifier?;
                Some(ClassifiedRecord {
                    area: r.area,
                    continent,
                    country_identifier,
                    year: r.year,
                    metrics: r.metrics,
                })
            })
            .collect();

        let unresolved = total - classified.len();
        (classified, unresolved)
    }

    /// Collapse rows sharing (area, continent, identifier, year) by summing
    /// their metrics. Output is ordered by the grouping key.
    pub fn aggregate(records: Vec<ClassifiedRecord>) -> Vec<ClassifiedRecord> {
        let mut groups: BTreeMap<GroupKey, Metrics> = BTreeMap::new();

        for r in records {
            *groups
                .entry((r.area, r.continent, r.country_identifier, r.year))
                .or_default() += r.metrics;
        }

        groups
            .into_iter()
            .map(
                |((area, continent, country_identifier, year), metrics)| ClassifiedRecord {
                    area,
                    continent,
                    country_identifier,
                    year,
                    metrics,
                },
            )
            .collect()
    }

    /// Attach net trade and self-sufficiency ratio to an aggregated row.
    pub fn derive(record: ClassifiedRecord) -> TradeRecord {
        let m = record.metrics;
        TradeRecord {
            area: record.area,
            continent: record.continent,
            country_identifier: record.country_identifier,
            year: record.year,
            import: m.import,
            export: m.export,
            production: m.production,
            consumption: m.consumption,
            net_trade: net_trade(m.export, m.import),
            self_sufficiency_ratio: self_sufficiency_ratio(m.production, m.consumption),
        }
    }
}

pub fn net_trade(export: f64, import: f64) -> f64 {
    export - import
}

/// Production over consumption; undefined when consumption is zero.
pub fn self_sufficiency_ratio(production: f64, consumption: f64) -> Option<f64> {
    if consumption == 0.0 {
        None
    } else {
        Some(production / consumption)
    }
}

//! Pipeline Module
//! Runs loading through metric derivation once and publishes the table.

use super::cleaner::{clean_reference, clean_trade};
use super::loader::{DataLoader, LoadError, RawReferenceEntry, RawTradeRecord};
use super::processor::{DataProcessor, ReferenceIndex};
use super::table::TradeTable;
use crate::geo::ContinentClassifier;
use log::{info, warn};
use serde::Serialize;
use std::path::Path;

/// Row counts observed while building the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub raw_trade_rows: usize,
    pub raw_reference_rows: usize,
    pub invalid_reference_rows: usize,
    pub duplicate_reference_codes: usize,
    /// Trade rows without an area or a coercible year.
    pub malformed_rows: usize,
    /// Kept trade rows with an empty metric cell, summed as 0.0.
    pub rows_with_missing_metrics: usize,
    /// Rows with an uncoercible code, no reference match, or no continent.
    pub unresolved_rows: usize,
    pub classified_rows: usize,
    pub canonical_rows: usize,
}

impl PipelineReport {
    /// Trade rows that did not reach aggregation.
    pub fn excluded_rows(&self) -> usize {
        self.malformed_rows + self.unresolved_rows
    }
}

/// Build the canonical table from already-loaded source rows.
pub fn build_table<C>(
    trade: &[RawTradeRecord],
    reference: &[RawReferenceEntry],
    classifier: &C,
) -> (TradeTable, PipelineReport)
where
    C: ContinentClassifier + ?Sized,
{
    let mut report = PipelineReport {
        raw_trade_rows: trade.len(),
        raw_reference_rows: reference.len(),
        ..Default::default()
    };

    let cleaned_reference = clean_reference(reference);
    report.invalid_reference_rows = cleaned_reference.invalid_codes;
    let index = ReferenceIndex::new(&cleaned_reference.entries);
    report.duplicate_reference_codes = index.duplicate_codes();
    if report.duplicate_reference_codes > 0 {
        warn!(
            "Reference table has {} duplicated numeric codes; matching trade rows will be repeated",
            report.duplicate_reference_codes
        );
    }

    let cleaned = clean_trade(trade);
    report.malformed_rows = cleaned.malformed;
    report.rows_with_missing_metrics = cleaned.missing_metrics;
    if cleaned.missing_metrics > 0 {
        warn!(
            "{} trade rows have empty metric cells, read as 0",
            cleaned.missing_metrics
        );
    }
    info!(
        "Cleaned {} trade rows ({} malformed), {} reference entries",
        cleaned.records.len(),
        cleaned.malformed,
        cleaned_reference.entries.len()
    );

    let joined = DataProcessor::join(cleaned.records, &index);
    let (classified, unresolved) = DataProcessor::classify(joined, classifier);
    report.unresolved_rows = unresolved;
    report.classified_rows = classified.len();
    info!(
        "Classified {} rows, {} dropped as unresolved",
        classified.len(),
        unresolved
    );

    let records: Vec<_> = DataProcessor::aggregate(classified)
        .into_iter()
        .map(DataProcessor::derive)
        .collect();
    report.canonical_rows = records.len();

    let table = TradeTable::new(records);
    info!(
        "Canonical table ready: {} rows across {} years",
        table.len(),
        table.years().len()
    );
    if report.excluded_rows() > 0 {
        warn!("{} trade rows excluded from the canonical table", report.excluded_rows());
    }

    (table, report)
}

/// Load both sources from disk and build the canonical table.
pub fn build_table_from_files<C>(
    loader: &DataLoader,
    trade_path: &Path,
    reference_path: &Path,
    classifier: &C,
) -> Result<(TradeTable, PipelineReport), LoadError>
where
    C: ContinentClassifier + ?Sized,
{
    let trade = loader.load_trade(trade_path)?;
    let reference = loader.load_reference(reference_path)?;
    info!(
        "Loaded {} trade rows from {} and {} reference rows from {}",
        trade.len(),
        trade_path.display(),
        reference.len(),
        reference_path.display()
    );

    Ok(build_table(&trade, &reference, classifier))
}

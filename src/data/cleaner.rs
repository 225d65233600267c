//! Data Cleaner Module
//! Normalizes codes, applies the known source corrections and shortens
//! display names. Every transform here is idempotent.

use super::loader::{RawReferenceEntry, RawTradeRecord};

/// Area whose raw M49 code disagrees with the reference table.
pub const SUDAN_AREA: &str = "Sudan";
/// Code the Sudan rows are pinned to before the join.
pub const SUDAN_CODE: i64 = 736;

/// Long area names replaced by a shorter display form.
const DISPLAY_NAMES: [(&str, &str); 1] = [(
    "United Kingdom of Great Britain and Northern Ireland",
    "UK and Northern Ireland",
)];

/// Four raw trade quantities of one row or group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub import: f64,
    pub export: f64,
    pub production: f64,
    pub consumption: f64,
}

impl std::ops::Add for Metrics {
    type Output = Metrics;

    fn add(self, rhs: Metrics) -> Metrics {
        Metrics {
            import: self.import + rhs.import,
            export: self.export + rhs.export,
            production: self.production + rhs.production,
            consumption: self.consumption + rhs.consumption,
        }
    }
}

impl std::ops::AddAssign for Metrics {
    fn add_assign(&mut self, rhs: Metrics) {
        *self = *self + rhs;
    }
}

/// Trade row after cleaning. `numeric_code` is `None` when the raw text could
/// not be coerced to an integer.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTradeRecord {
    pub area: String,
    pub numeric_code: Option<i64>,
    pub year: i32,
    pub metrics: Metrics,
}

/// Reference row after cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub numeric_code: i64,
    pub country_identifier: String,
}

/// Cleaned trade rows plus the rows that could not be kept.
#[derive(Debug, Clone, Default)]
pub struct CleanedTrade {
    pub records: Vec<CleanTradeRecord>,
    /// Rows without an area name or a coercible year.
    pub malformed: usize,
    /// Kept rows with at least one empty metric cell, read as 0.0.
    pub missing_metrics: usize,
}

/// Cleaned reference rows plus the rows that could not be kept.
#[derive(Debug, Clone, Default)]
pub struct CleanedReference {
    pub entries: Vec<ReferenceEntry>,
    pub invalid_codes: usize,
}

/// Strip stray quoting and whitespace from a raw text cell.
pub fn strip_quoting(raw: &str) -> &str {
    raw.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
}

/// Coerce a raw code cell to an integer; anything else is missing.
pub fn normalize_code(raw: &str) -> Option<i64> {
    let text = strip_quoting(raw);
    if let Ok(code) = text.parse::<i64>() {
        return Some(code);
    }
    // Codes that went through a float column ("4.0")
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i64)
}

/// Display form of an area name.
pub fn display_name(area: &str) -> &str {
    DISPLAY_NAMES
        .iter()
        .find(|(long, _)| *long == area)
        .map(|(_, short)| *short)
        .unwrap_or(area)
}

/// Apply the hard-coded source corrections to a cleaned row.
pub fn fix_known_defects(mut record: CleanTradeRecord) -> CleanTradeRecord {
    if record.area == SUDAN_AREA {
        record.numeric_code = Some(SUDAN_CODE);
    }
    record.area = display_name(&record.area).to_string();
    record
}

/// Clean a single trade row. Returns `None` for malformed rows.
pub fn clean_trade_record(raw: &RawTradeRecord) -> Option<CleanTradeRecord> {
    let area = raw.area.as_deref().map(str::trim).filter(|a| !a.is_empty())?;
    let year = raw.year.and_then(|y| i32::try_from(y).ok())?;

    let record = CleanTradeRecord {
        area: area.to_string(),
        numeric_code: raw.area_code.as_deref().and_then(normalize_code),
        year,
        metrics: Metrics {
            import: raw.import.unwrap_or(0.0),
            export: raw.export.unwrap_or(0.0),
            production: raw.production.unwrap_or(0.0),
            consumption: raw.consumption.unwrap_or(0.0),
        },
    };

    Some(fix_known_defects(record))
}

fn has_missing_metric(raw: &RawTradeRecord) -> bool {
    [raw.import, raw.export, raw.production, raw.consumption]
        .iter()
        .any(Option::is_none)
}

/// Clean every trade row, counting the malformed ones.
pub fn clean_trade(raw: &[RawTradeRecord]) -> CleanedTrade {
    let mut cleaned = CleanedTrade::default();
    for row in raw {
        match clean_trade_record(row) {
            Some(record) => {
                if has_missing_metric(row) {
                    cleaned.missing_metrics += 1;
                }
                cleaned.records.push(record);
            }
            None => cleaned.malformed += 1,
        }
    }
    cleaned
}

/// Clean every reference row; rows without a coercible code or identifier
/// are dropped and counted.
pub fn clean_reference(raw: &[RawReferenceEntry]) -> CleanedReference {
    let mut cleaned = CleanedReference::default();
    for row in raw {
        let code = row.numeric_code.as_deref().and_then(normalize_code);
        let identifier = row
            .alpha3_code
            .as_deref()
            .map(strip_quoting)
            .filter(|s| !s.is_empty());

        match (code, identifier) {
            (Some(numeric_code), Some(id)) => cleaned.entries.push(ReferenceEntry {
                numeric_code,
                country_identifier: id.to_string(),
            }),
            _ => cleaned.invalid_codes += 1,
        }
    }
    cleaned
}

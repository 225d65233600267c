//! CSV Data Loader Module
//! Reads the trade and reference tables with Polars and extracts typed rows.

use crate::schema::{reference, trade};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: &'static str, column: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rows scanned to infer the type of columns outside the input contract.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

/// One trade row exactly as read; codes are still raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTradeRecord {
    pub area: Option<String>,
    pub area_code: Option<String>,
    pub year: Option<i64>,
    pub import: Option<f64>,
    pub export: Option<f64>,
    pub production: Option<f64>,
    pub consumption: Option<f64>,
    pub unit: Option<String>,
}

/// One reference row exactly as read.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReferenceEntry {
    pub numeric_code: Option<String>,
    pub alpha3_code: Option<String>,
}

/// Handles CSV file loading with Polars.
#[derive(Debug, Clone)]
pub struct DataLoader {
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }

    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = rows;
        self
    }

    pub fn infer_schema_length(&self) -> usize {
        self.infer_schema_length
    }

    /// Load a CSV file into a DataFrame.
    ///
    /// `required` columns must be present in the header. Columns listed in
    /// `dtypes` are parsed with that type; any other column is inferred. A
    /// cell that does not parse as its pinned type fails the load.
    pub fn read_frame(
        &self,
        file_path: &Path,
        table: &'static str,
        required: &[&str],
        dtypes: &[(&str, DataType)],
    ) -> Result<DataFrame, LoadError> {
        if !file_path.exists() {
            return Err(LoadError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", file_path.display()),
            )));
        }

        // Header only: every column reads as String without scanning rows
        let header = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect_schema()?;
        if let Some(missing) = required.iter().find(|name| header.get(**name).is_none()) {
            return Err(LoadError::MissingColumn {
                table,
                column: missing.to_string(),
            });
        }

        let overwrite: Schema = dtypes
            .iter()
            .map(|(name, dtype)| (PlSmallStr::from(*name), dtype.clone()))
            .collect();

        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_dtype_overwrite(Some(Arc::new(overwrite)))
            .finish()?
            .collect()?;

        log::debug!(
            "Read {} rows x {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );
        Ok(df)
    }

    /// Load and extract the trade source.
    pub fn load_trade(&self, file_path: &Path) -> Result<Vec<RawTradeRecord>, LoadError> {
        let df = self.read_frame(file_path, "trade", &trade::REQUIRED, &trade_dtypes())?;
        Self::trade_records(&df)
    }

    /// Load and extract the reference source.
    pub fn load_reference(&self, file_path: &Path) -> Result<Vec<RawReferenceEntry>, LoadError> {
        let df = self.read_frame(
            file_path,
            "reference",
            &reference::REQUIRED,
            &reference_dtypes(),
        )?;
        Self::reference_entries(&df)
    }

    /// Extract typed trade rows from a frame holding the trade columns.
    pub fn trade_records(df: &DataFrame) -> Result<Vec<RawTradeRecord>, LoadError> {
        require_columns(df, "trade", &trade::REQUIRED)?;

        let areas = string_column(df, trade::AREA)?;
        let codes = string_column(df, trade::AREA_CODE)?;
        let years = i64_column(df, trade::YEAR)?;
        let imports = f64_column(df, trade::IMPORT)?;
        let exports = f64_column(df, trade::EXPORT)?;
        let productions = f64_column(df, trade::PRODUCTION)?;
        let consumptions = f64_column(df, trade::CONSUMPTION)?;
        let units = string_column(df, trade::UNIT)?;

        let records = (0..df.height())
            .map(|i| RawTradeRecord {
                area: areas[i].clone(),
                area_code: codes[i].clone(),
                year: years[i],
                import: imports[i],
                export: exports[i],
                production: productions[i],
                consumption: consumptions[i],
                unit: units[i].clone(),
            })
            .collect();

        Ok(records)
    }

    /// Extract typed reference rows from a frame holding the reference columns.
    pub fn reference_entries(df: &DataFrame) -> Result<Vec<RawReferenceEntry>, LoadError> {
        require_columns(df, "reference", &reference::REQUIRED)?;

        let codes = string_column(df, reference::NUMERIC_CODE)?;
        let alpha3 = string_column(df, reference::ALPHA3_CODE)?;

        Ok(codes
            .into_iter()
            .zip(alpha3)
            .map(|(numeric_code, alpha3_code)| RawReferenceEntry {
                numeric_code,
                alpha3_code,
            })
            .collect())
    }
}

fn trade_dtypes() -> [(&'static str, DataType); 8] {
    [
        (trade::AREA_CODE, DataType::String),
        (trade::AREA, DataType::String),
        (trade::YEAR, DataType::Int64),
        (trade::IMPORT, DataType::Float64),
        (trade::EXPORT, DataType::Float64),
        (trade::PRODUCTION, DataType::Float64),
        (trade::CONSUMPTION, DataType::Float64),
        (trade::UNIT, DataType::String),
    ]
}

fn reference_dtypes() -> [(&'static str, DataType); 2] {
    [
        (reference::NUMERIC_CODE, DataType::String),
        (reference::ALPHA3_CODE, DataType::String),
    ]
}

fn require_columns(df: &DataFrame, table: &'static str, columns: &[&str]) -> Result<(), LoadError> {
    match columns.iter().find(|name| df.column(name).is_err()) {
        Some(missing) => Err(LoadError::MissingColumn {
            table,
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoadError> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let ca = column.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, LoadError> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    let ca = column.f64()?;
    Ok(ca.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect())
}

fn i64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, LoadError> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    let ca = column.i64()?;
    Ok(ca.into_iter().collect())
}

//! Export Module
//! Builds the three flat views handed to the presentation layer and writes
//! them as CSV.

use crate::data::{Metric, TradeTable};
use crate::schema::{canonical, files};
use crate::stats::QueryEngine;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Full canonical table, one row per (area, continent, identifier, year).
pub fn canonical_frame(table: &TradeTable) -> Result<DataFrame, ExportError> {
    let rows = table.records();

    let df = DataFrame::new(vec![
        Column::new(
            canonical::AREA.into(),
            rows.iter().map(|r| r.area.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            canonical::CONTINENT.into(),
            rows.iter().map(|r| r.continent.name()).collect::<Vec<_>>(),
        ),
        Column::new(
            canonical::ISO3.into(),
            rows.iter()
                .map(|r| r.country_identifier.as_str())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            canonical::YEAR.into(),
            rows.iter().map(|r| r.year).collect::<Vec<_>>(),
        ),
        metric_column(table, Metric::Import),
        metric_column(table, Metric::Export),
        metric_column(table, Metric::Production),
        metric_column(table, Metric::Consumption),
        metric_column(table, Metric::NetTrade),
        metric_column(table, Metric::SelfSufficiencyRatio),
    ])?;

    Ok(df)
}

fn metric_column(table: &TradeTable, metric: Metric) -> Column {
    let values: Vec<Option<f64>> = table.records().iter().map(|r| metric.value(r)).collect();
    Column::new(metric.name().into(), values)
}

/// Base metrics summed per (continent, year).
pub fn continental_frame(table: &TradeTable) -> Result<DataFrame, ExportError> {
    let totals = QueryEngine::continental_aggregate(table);

    let df = DataFrame::new(vec![
        Column::new(
            canonical::CONTINENT.into(),
            totals.iter().map(|t| t.continent.name()).collect::<Vec<_>>(),
        ),
        Column::new(
            canonical::YEAR.into(),
            totals.iter().map(|t| t.year).collect::<Vec<_>>(),
        ),
        Column::new(
            canonical::IMPORT.into(),
            totals.iter().map(|t| t.metrics.import).collect::<Vec<_>>(),
        ),
        Column::new(
            canonical::EXPORT.into(),
            totals.iter().map(|t| t.metrics.export).collect::<Vec<_>>(),
        ),
        Column::new(
            canonical::PRODUCTION.into(),
            totals.iter().map(|t| t.metrics.production).collect::<Vec<_>>(),
        ),
        Column::new(
            canonical::CONSUMPTION.into(),
            totals.iter().map(|t| t.metrics.consumption).collect::<Vec<_>>(),
        ),
    ])?;

    Ok(df)
}

/// World rank of every metric, one row per (area, year).
pub fn world_rank_frame(table: &TradeTable) -> Result<DataFrame, ExportError> {
    let ranks = QueryEngine::world_rank_table(table);

    let mut columns = vec![
        Column::new(
            canonical::AREA.into(),
            ranks.iter().map(|r| r.area.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            canonical::YEAR.into(),
            ranks.iter().map(|r| r.year).collect::<Vec<_>>(),
        ),
    ];
    for metric in Metric::ALL {
        let values: Vec<Option<u32>> = ranks.iter().map(|r| r.rank(metric)).collect();
        columns.push(Column::new(metric.rank_column().into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

/// Write a frame as CSV with a header row.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), ExportError> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Write all three views into `dir`, returning the written paths.
pub fn export_all(table: &TradeTable, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir)?;

    let views = [
        (files::CANONICAL, canonical_frame(table)?),
        (files::CONTINENTAL, continental_frame(table)?),
        (files::WORLD_RANK, world_rank_frame(table)?),
    ];

    let mut written = Vec::with_capacity(views.len());
    for (name, mut df) in views {
        let path = dir.join(name);
        write_csv(&mut df, &path)?;
        log::info!("Wrote {} rows to {}", df.height(), path.display());
        written.push(path);
    }

    Ok(written)
}

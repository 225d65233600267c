//! Agricultural trade data preparation & analytics.
//!
//! Loads raw trade records and a country-code reference table, cleans and
//! joins them, classifies each record by continent, aggregates duplicates,
//! derives net trade and self-sufficiency, and answers ranking, top-N and
//! market-share queries over the resulting immutable table.

pub mod config;
pub mod data;
pub mod export;
pub mod geo;
pub mod schema;
pub mod stats;

pub use config::PipelineConfig;
pub use data::{build_table, build_table_from_files, Metric, PipelineReport, TradeRecord, TradeTable};
pub use geo::{Continent, ContinentClassifier, M49Classifier};
pub use stats::{QueryEngine, QueryError, Scope};

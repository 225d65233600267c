//! Data module - CSV loading and table preparation

mod cleaner;
mod loader;
mod pipeline;
mod processor;
mod table;

pub use cleaner::{
    clean_reference, clean_trade, clean_trade_record, display_name, fix_known_defects,
    normalize_code, strip_quoting, CleanTradeRecord, CleanedReference, CleanedTrade, Metrics,
    ReferenceEntry, SUDAN_AREA, SUDAN_CODE,
};
pub use loader::{
    DataLoader, LoadError, RawReferenceEntry, RawTradeRecord, DEFAULT_INFER_SCHEMA_LENGTH,
};
pub use pipeline::{build_table, build_table_from_files, PipelineReport};
pub use processor::{
    net_trade, self_sufficiency_ratio, ClassifiedRecord, DataProcessor, JoinedRecord,
    ReferenceIndex,
};
pub use table::{Metric, TradeRecord, TradeTable};

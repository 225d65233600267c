//! Stats module - read-only queries over the canonical table

mod calculator;
mod query;
mod ranking;

pub use calculator::{StatsCalculator, COLOR_HIGH_PERCENTILE, COLOR_LOW_PERCENTILE};
pub use query::{
    parse_metric, ColorBounds, ContinentShare, ContinentYearTotals, GroupBy, GroupKey,
    GroupedValue, MarketShareEntry, QueryEngine, QueryError, RankPoint, RankedRow, Scope,
    SeriesPoint, TopN, WorldRankRow, DEFAULT_TOP_N,
};
pub use ranking::{competition_ranks, rank_within_years};

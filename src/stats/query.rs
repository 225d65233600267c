//! Query Engine Module
//! Read-only views over the canonical table: year slices, grouped
//! reductions, continental shares, world ranks and scoped top-N.

use super::calculator::StatsCalculator;
use super::ranking::rank_within_years;
use crate::data::{Metric, Metrics, TradeRecord, TradeTable};
use crate::geo::Continent;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of rows in a top-N view.
pub const DEFAULT_TOP_N: usize = 5;

/// Caller contract violations. Legitimately missing data is never reported
/// through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
    #[error("Unknown scope: {0}")]
    UnknownScope(String),
    #[error("Year {0} is not present in the table")]
    UnknownYear(i32),
    #[error("Unknown area: {0}")]
    UnknownArea(String),
    #[error("End year {end} must be greater than start year {start}")]
    InvalidYearRange { start: i32, end: i32 },
}

/// Bound of a top-N or market-share computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scope {
    World,
    Continent(Continent),
}

impl Scope {
    pub fn contains(&self, record: &TradeRecord) -> bool {
        match self {
            Scope::World => true,
            Scope::Continent(c) => record.continent == *c,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::World => f.write_str("the Whole World"),
            Scope::Continent(c) => write!(f, "{c}"),
        }
    }
}

impl FromStr for Scope {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("world") || s.eq_ignore_ascii_case("the whole world") {
            return Ok(Scope::World);
        }
        s.parse::<Continent>()
            .map(Scope::Continent)
            .map_err(QueryError::UnknownScope)
    }
}

/// Parse a metric name, failing loudly on anything unrecognised.
pub fn parse_metric(name: &str) -> Result<Metric, QueryError> {
    name.parse().map_err(QueryError::UnknownMetric)
}

/// Which record fields form the grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupBy {
    pub area: bool,
    pub continent: bool,
    pub year: bool,
}

impl GroupBy {
    pub const YEAR: GroupBy = GroupBy {
        area: false,
        continent: false,
        year: true,
    };
    pub const CONTINENT: GroupBy = GroupBy {
        area: false,
        continent: true,
        year: false,
    };
    pub const CONTINENT_YEAR: GroupBy = GroupBy {
        area: false,
        continent: true,
        year: true,
    };
    pub const AREA: GroupBy = GroupBy {
        area: true,
        continent: false,
        year: false,
    };

    fn key(&self, record: &TradeRecord) -> GroupKey {
        GroupKey {
            area: self.area.then(|| record.area.clone()),
            continent: self.continent.then_some(record.continent),
            year: self.year.then_some(record.year),
        }
    }
}

/// Grouping key; fields not grouped on are `None`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    pub area: Option<String>,
    pub continent: Option<Continent>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedValue {
    pub key: GroupKey,
    pub value: Option<f64>,
}

/// Base metrics summed per (continent, year).
#[derive(Debug, Clone, PartialEq)]
pub struct ContinentYearTotals {
    pub continent: Continent,
    pub year: i32,
    pub metrics: Metrics,
}

/// A continent's share of one year's world total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinentShare {
    pub continent: Continent,
    pub year: i32,
    pub total: Option<f64>,
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub area: String,
    pub year: i32,
    pub value: Option<f64>,
    pub rank: Option<u32>,
}

/// World ranks of one (area, year) row for every metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldRankRow {
    pub area: String,
    pub year: i32,
    /// Indexed in `Metric::ALL` order.
    pub ranks: [Option<u32>; 6],
}

impl WorldRankRow {
    pub fn rank(&self, metric: Metric) -> Option<u32> {
        Metric::ALL
            .iter()
            .position(|m| *m == metric)
            .and_then(|i| self.ranks[i])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketShareEntry {
    pub area: String,
    pub country_identifier: String,
    pub continent: Continent,
    pub value: f64,
    /// Percentage of the scope total; `None` when that total is zero.
    pub market_share: Option<f64>,
}

/// The largest rows of a scope for one metric and year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopN {
    pub metric: Metric,
    pub year: i32,
    pub scope: Scope,
    pub requested: usize,
    /// Sum over every row in the scope, not only the selected ones.
    pub scope_total: f64,
    pub entries: Vec<MarketShareEntry>,
}

impl TopN {
    /// Whether the scope held at least `requested` rows.
    pub fn is_complete(&self) -> bool {
        self.entries.len() == self.requested
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub area: String,
    pub year: i32,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankPoint {
    pub area: String,
    pub year: i32,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorBounds {
    pub low: f64,
    pub high: f64,
}

/// Stateless queries. Every function borrows the table and returns owned
/// results, so calls can run concurrently without coordination.
pub struct QueryEngine;

impl QueryEngine {
    fn require_year(table: &TradeTable, year: i32) -> Result<(), QueryError> {
        if table.has_year(year) {
            Ok(())
        } else {
            Err(QueryError::UnknownYear(year))
        }
    }

    /// Rows observed in `year`.
    pub fn year_slice(table: &TradeTable, year: i32) -> Result<Vec<&TradeRecord>, QueryError> {
        Self::require_year(table, year)?;
        Ok(table.records().iter().filter(|r| r.year == year).collect())
    }

    fn group_values(
        table: &TradeTable,
        group_by: GroupBy,
        metric: Metric,
    ) -> BTreeMap<GroupKey, Vec<Option<f64>>> {
        let mut groups: BTreeMap<GroupKey, Vec<Option<f64>>> = BTreeMap::new();
        for r in table.records() {
            groups
                .entry(group_by.key(r))
                .or_default()
                .push(metric.value(r));
        }
        groups
    }

    /// Sum of a metric per group, ordered by key.
    pub fn grouped_sum(table: &TradeTable, group_by: GroupBy, metric: Metric) -> Vec<GroupedValue> {
        Self::group_values(table, group_by, metric)
            .into_iter()
            .map(|(key, values)| GroupedValue {
                key,
                value: StatsCalculator::sum(values),
            })
            .collect()
    }

    /// Mean of a metric per group, ordered by key.
    pub fn grouped_mean(table: &TradeTable, group_by: GroupBy, metric: Metric) -> Vec<GroupedValue> {
        Self::group_values(table, group_by, metric)
            .into_iter()
            .map(|(key, values)| GroupedValue {
                key,
                value: StatsCalculator::mean(values),
            })
            .collect()
    }

    /// World average of a metric for each year.
    pub fn world_average_by_year(table: &TradeTable, metric: Metric) -> Vec<(i32, Option<f64>)> {
        Self::grouped_mean(table, GroupBy::YEAR, metric)
            .into_iter()
            .filter_map(|g| g.key.year.map(|y| (y, g.value)))
            .collect()
    }

    /// Base metrics summed per (continent, year).
    pub fn continental_aggregate(table: &TradeTable) -> Vec<ContinentYearTotals> {
        let mut groups: BTreeMap<(Continent, i32), Metrics> = BTreeMap::new();
        for r in table.records() {
            *groups.entry((r.continent, r.year)).or_default() += Metrics {
                import: r.import,
                export: r.export,
                production: r.production,
                consumption: r.consumption,
            };
        }

        groups
            .into_iter()
            .map(|((continent, year), metrics)| ContinentYearTotals {
                continent,
                year,
                metrics,
            })
            .collect()
    }

    /// Per-continent totals of a metric in one year.
    pub fn continent_breakdown(
        table: &TradeTable,
        metric: Metric,
        year: i32,
    ) -> Result<Vec<(Continent, Option<f64>)>, QueryError> {
        Self::require_year(table, year)?;
        Ok(Self::grouped_sum(table, GroupBy::CONTINENT_YEAR, metric)
            .into_iter()
            .filter(|g| g.key.year == Some(year))
            .filter_map(|g| g.key.continent.map(|c| (c, g.value)))
            .collect())
    }

    /// Each continent's percentage of the yearly world total.
    pub fn percent_of_total_by_year(table: &TradeTable, metric: Metric) -> Vec<ContinentShare> {
        let by_continent = Self::grouped_sum(table, GroupBy::CONTINENT_YEAR, metric);

        let mut year_totals: BTreeMap<i32, f64> = BTreeMap::new();
        for g in &by_continent {
            if let (Some(year), Some(v)) = (g.key.year, g.value) {
                *year_totals.entry(year).or_default() += v;
            }
        }

        by_continent
            .into_iter()
            .filter_map(|g| {
                let continent = g.key.continent?;
                let year = g.key.year?;
                let year_total = year_totals.get(&year).copied().unwrap_or(0.0);
                Some(ContinentShare {
                    continent,
                    year,
                    total: g.value,
                    percent: g
                        .value
                        .and_then(|v| StatsCalculator::percent_of(v, year_total)),
                })
            })
            .collect()
    }

    /// World rank of every row for one metric, independently per year.
    pub fn world_rank(table: &TradeTable, metric: Metric) -> Vec<RankedRow> {
        let records = table.records();
        records
            .iter()
            .zip(rank_within_years(records, metric))
            .map(|(r, rank)| RankedRow {
                area: r.area.clone(),
                year: r.year,
                value: metric.value(r),
                rank,
            })
            .collect()
    }

    /// World ranks for all six metrics, one row per (area, year).
    pub fn world_rank_table(table: &TradeTable) -> Vec<WorldRankRow> {
        let records = table.records();
        let per_metric: Vec<Vec<Option<u32>>> = Metric::ALL[..]
            .par_iter()
            .map(|m| rank_within_years(records, *m))
            .collect();

        records
            .iter()
            .enumerate()
            .map(|(i, r)| WorldRankRow {
                area: r.area.clone(),
                year: r.year,
                ranks: std::array::from_fn(|k| per_metric[k][i]),
            })
            .collect()
    }

    /// The `n` largest rows of `scope` in `year` with their market shares.
    ///
    /// Rows with an undefined value are not candidates and do not count
    /// towards the scope total. A scope with fewer than `n` rows yields
    /// fewer entries.
    pub fn top_n(
        table: &TradeTable,
        metric: Metric,
        year: i32,
        scope: Scope,
        n: usize,
    ) -> Result<TopN, QueryError> {
        let rows = Self::year_slice(table, year)?;

        let mut candidates: Vec<(&TradeRecord, f64)> = rows
            .into_iter()
            .filter(|r| scope.contains(r))
            .filter_map(|r| metric.value(r).filter(|v| v.is_finite()).map(|v| (r, v)))
            .collect();

        let scope_total: f64 = candidates.iter().map(|(_, v)| v).sum();

        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.truncate(n);

        let entries = candidates
            .into_iter()
            .map(|(r, value)| MarketShareEntry {
                area: r.area.clone(),
                country_identifier: r.country_identifier.clone(),
                continent: r.continent,
                value,
                market_share: StatsCalculator::percent_of(value, scope_total),
            })
            .collect();

        Ok(TopN {
            metric,
            year,
            scope,
            requested: n,
            scope_total,
            entries,
        })
    }

    fn check_selection(
        table: &TradeTable,
        areas: &[&str],
        start: i32,
        end: i32,
    ) -> Result<BTreeSet<String>, QueryError> {
        if end <= start {
            return Err(QueryError::InvalidYearRange { start, end });
        }
        let known: BTreeSet<&str> = table.areas().into_iter().collect();
        if let Some(unknown) = areas.iter().find(|a| !known.contains(**a)) {
            return Err(QueryError::UnknownArea(unknown.to_string()));
        }
        Ok(areas.iter().map(|a| a.to_string()).collect())
    }

    /// Metric values of the selected areas over an inclusive year range.
    pub fn country_series(
        table: &TradeTable,
        areas: &[&str],
        metric: Metric,
        start: i32,
        end: i32,
    ) -> Result<Vec<SeriesPoint>, QueryError> {
        let selected = Self::check_selection(table, areas, start, end)?;

        let mut points: Vec<SeriesPoint> = table
            .records()
            .iter()
            .filter(|r| selected.contains(&r.area) && (start..=end).contains(&r.year))
            .map(|r| SeriesPoint {
                area: r.area.clone(),
                year: r.year,
                value: metric.value(r),
            })
            .collect();
        points.sort_by(|a, b| a.area.cmp(&b.area).then(a.year.cmp(&b.year)));
        Ok(points)
    }

    /// World ranks of the selected areas over an inclusive year range.
    pub fn country_rank_series(
        table: &TradeTable,
        areas: &[&str],
        metric: Metric,
        start: i32,
        end: i32,
    ) -> Result<Vec<RankPoint>, QueryError> {
        let selected = Self::check_selection(table, areas, start, end)?;

        let mut points: Vec<RankPoint> = Self::world_rank(table, metric)
            .into_iter()
            .filter(|r| selected.contains(&r.area) && (start..=end).contains(&r.year))
            .map(|r| RankPoint {
                area: r.area,
                year: r.year,
                rank: r.rank,
            })
            .collect();
        points.sort_by(|a, b| a.area.cmp(&b.area).then(a.year.cmp(&b.year)));
        Ok(points)
    }

    /// Colour-scale bounds of a metric within one year.
    pub fn color_bounds(
        table: &TradeTable,
        metric: Metric,
        year: i32,
    ) -> Result<Option<ColorBounds>, QueryError> {
        let rows = Self::year_slice(table, year)?;
        Ok(
            StatsCalculator::color_bounds(rows.into_iter().map(|r| metric.value(r)))
                .map(|(low, high)| ColorBounds { low, high }),
        )
    }
}

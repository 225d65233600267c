//! Agri Trade - trade table builder and query CLI
//!
//! Builds the canonical trade table once, then exports its views or answers
//! a single query against it.

use agri_trade::data::{build_table_from_files, DataLoader, PipelineReport, TradeTable};
use agri_trade::export::export_all;
use agri_trade::stats::{parse_metric, QueryEngine, Scope};
use agri_trade::{M49Classifier, PipelineConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "agri-trade", version, about = "Agricultural trade table builder")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "AGRI_TRADE_CONFIG")]
    config: Option<PathBuf>,

    /// Trade records CSV
    #[arg(long, global = true)]
    trade: Option<PathBuf>,

    /// Country code reference CSV
    #[arg(long, global = true)]
    reference: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the table and write the canonical, continental and world-rank views
    Build {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Largest countries for a metric and year, with market share
    Top {
        #[arg(long)]
        metric: String,
        /// Defaults to the latest year in the table
        #[arg(long)]
        year: Option<i32>,
        /// "world" or a continent name
        #[arg(long, default_value = "world")]
        scope: String,
        #[arg(long)]
        n: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// World rank of countries for a metric over a year range
    Rank {
        #[arg(long)]
        metric: String,
        #[arg(long = "area", required = true)]
        areas: Vec<String>,
        #[arg(long)]
        start: i32,
        #[arg(long)]
        end: i32,
    },
}

fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(trade) = &cli.trade {
        config.trade_path = trade.clone();
    }
    if let Some(reference) = &cli.reference {
        config.reference_path = reference.clone();
    }
    Ok(config)
}

fn build(config: &PipelineConfig) -> Result<(TradeTable, PipelineReport)> {
    let loader = DataLoader::new().with_infer_schema_length(config.infer_schema_length);
    build_table_from_files(&loader, &config.trade_path, &config.reference_path, &M49Classifier)
        .context("building trade table")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = resolve_config(&cli)?;
    let (table, report) = build(&config)?;

    match cli.command {
        Command::Build { out } => {
            if let Some(out) = out {
                config.output_dir = out;
            }
            let written = export_all(&table, &config.output_dir)
                .with_context(|| format!("exporting to {}", config.output_dir.display()))?;
            info!("Exported {} views", written.len());
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Top {
            metric,
            year,
            scope,
            n,
            json,
        } => {
            let metric = parse_metric(&metric)?;
            let scope: Scope = scope.parse()?;
            let year = year
                .or(table.latest_year())
                .context("trade table is empty")?;
            let top = QueryEngine::top_n(&table, metric, year, scope, n.unwrap_or(config.top_n))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&top)?);
            } else {
                println!("Top {} countries of {} in {} within {}", top.requested, metric, year, scope);
                for (i, entry) in top.entries.iter().enumerate() {
                    let share = entry
                        .market_share
                        .map(|s| format!("{s:.2}%"))
                        .unwrap_or_else(|| "n/a".to_string());
                    println!("{:>2}. {:<40} {:>16.2} {:>8}", i + 1, entry.area, entry.value, share);
                }
                if !top.is_complete() {
                    println!("(only {} countries in scope)", top.entries.len());
                }
            }
        }
        Command::Rank {
            metric,
            areas,
            start,
            end,
        } => {
            let metric = parse_metric(&metric)?;
            let areas: Vec<&str> = areas.iter().map(String::as_str).collect();
            let points = QueryEngine::country_rank_series(&table, &areas, metric, start, end)?;
            for p in points {
                let rank = p.rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
                println!("{}\t{}\t{}", p.area, p.year, rank);
            }
        }
    }

    Ok(())
}

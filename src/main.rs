//! vaultrisk - risk scoring CLI for prize-savings vault strategies
//!
//! Results are printed to stdout as JSON; logs go to stderr.
//!
//! # Usage
//! ```sh
//! vaultrisk score superlend-usdc pancake-lp
//! vaultrisk portfolio --strategies superlend,pancake --allocations 0.6,0.4
//! vaultrisk allocate --scores superlend=0.2,pancake=0.5 --volatility 0.8
//! vaultrisk monitor superlend pancake --market-stress
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;
use vaultrisk::application::engine::RiskEngine;
use vaultrisk::application::feature_extraction::{
    RegistryFeatureExtractor, SyntheticFeatureExtractor,
};
use vaultrisk::config::Config;
use vaultrisk::domain::ml::feature_registry::FeatureVector;
use vaultrisk::infrastructure::observability::RiskMetrics;

#[derive(Parser)]
#[command(author, version, about = "DeFi vault strategy risk engine", long_about = None)]
struct Cli {
    /// JSON file of known feature vectors: {"<address>": {"tvl": ..., ...}}
    #[arg(long, global = true)]
    features: Option<PathBuf>,

    /// Print Prometheus metrics to stderr when done
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quick risk score (0-1) for one or more strategies
    Score {
        #[arg(required = true)]
        strategies: Vec<String>,
    },
    /// Full risk assessment of one strategy
    Assess { strategy: String },
    /// Allocation-weighted portfolio risk
    Portfolio {
        /// Comma-separated strategy identifiers
        #[arg(long, value_delimiter = ',', required = true)]
        strategies: Vec<String>,

        /// Comma-separated allocation fractions, summing to 1
        #[arg(long, value_delimiter = ',', required = true)]
        allocations: Vec<f64>,
    },
    /// Optimal allocation percentages from risk scores
    Allocate {
        /// name=risk_score pairs, comma-separated
        #[arg(long, value_delimiter = ',', required = true)]
        scores: Vec<String>,

        /// Market volatility (0-1)
        #[arg(long, default_value_t = 0.3)]
        volatility: f64,

        /// Per-strategy cap in percent (default: MAX_SINGLE_STRATEGY_PCT)
        #[arg(long)]
        cap: Option<f64>,

        /// name=current_pct pairs; when given, prints a rebalance plan
        #[arg(long, value_delimiter = ',')]
        current: Vec<String>,
    },
    /// Emergency scan over the vault's strategies
    Monitor {
        #[arg(required = true)]
        strategies: Vec<String>,

        /// Treat the market as stressed
        #[arg(long)]
        market_stress: bool,
    },
}

fn main() -> Result<()> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!("vaultrisk {} starting", env!("CARGO_PKG_VERSION"));

    let engine = build_engine(&config, cli.features.as_deref())?;
    let metrics = RiskMetrics::new()?;
    let engine = engine.with_metrics(metrics.clone());

    match cli.command {
        Commands::Score { strategies } => {
            let scores: BTreeMap<String, f64> = strategies
                .iter()
                .map(|s| (s.clone(), engine.score(s)))
                .collect();
            print_json(&scores)?;
        }
        Commands::Assess { strategy } => {
            print_json(&engine.assess(&strategy))?;
        }
        Commands::Portfolio {
            strategies,
            allocations,
        } => {
            let portfolio = engine
                .portfolio(&strategies, &allocations)
                .context("Invalid portfolio")?;
            print_json(&portfolio)?;
        }
        Commands::Allocate {
            scores,
            volatility,
            cap,
            current,
        } => {
            let scores = parse_pairs(&scores)?;
            let cap = cap.unwrap_or(engine.max_single_strategy_pct());
            if current.is_empty() {
                print_json(&engine.allocate(&scores, volatility, cap))?;
            } else {
                let current = parse_pairs(&current)?;
                print_json(&engine.plan_rebalance(&scores, &current, volatility, cap))?;
            }
        }
        Commands::Monitor {
            strategies,
            market_stress,
        } => {
            print_json(&engine.emergency_scan(&strategies, market_stress))?;
        }
    }

    if cli.metrics {
        eprintln!("{}", metrics.render());
    }
    Ok(())
}

fn build_engine(config: &Config, features: Option<&Path>) -> Result<RiskEngine> {
    let Some(path) = features else {
        return RiskEngine::from_config(config);
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read feature file {:?}", path))?;
    let raw: HashMap<String, HashMap<String, f64>> =
        serde_json::from_str(&content).context("Failed to parse feature file")?;
    let known = raw
        .into_iter()
        .map(|(id, record)| {
            FeatureVector::from_named(&record)
                .map(|fv| (id.clone(), fv))
                .with_context(|| format!("Invalid features for {}", id))
        })
        .collect::<Result<HashMap<_, _>>>()?;
    info!("Loaded features for {} strategies from {:?}", known.len(), path);

    let fallback = SyntheticFeatureExtractor::new(config.model.feature_noise_seed)?;
    let extractor = RegistryFeatureExtractor::new(known, fallback);
    Ok(RiskEngine::from_config_with_extractor(
        config,
        Arc::new(extractor),
    ))
}

fn parse_pairs(pairs: &[String]) -> Result<BTreeMap<String, f64>> {
    let mut parsed = BTreeMap::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("Expected name=value, got '{}'", pair);
        };
        let value = value
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid number in '{}'", pair))?;
        parsed.insert(name.trim().to_string(), value);
    }
    Ok(parsed)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! Offline trainer for the strategy risk model.
//!
//! Fits the random forest, scaler and anomaly detector either on synthetic
//! data drawn from the risk ontology or on a labeled CSV, reports hold-out
//! metrics and writes the artifact the engine loads at start-up.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;
use vaultrisk::application::ml::smartcore_predictor::{ModelOrigin, RiskModel, TrainingConfig};
use vaultrisk::config::DEFAULT_MODEL_PATH;
use vaultrisk::domain::ml::feature_registry::FeatureVector;
use vaultrisk::domain::ports::RiskPredictor;
use vaultrisk::infrastructure::persistence::ModelStore;
use vaultrisk::infrastructure::persistence::labeled_csv::read_labeled_csv;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Labeled CSV (12 feature columns + risk_score). Synthetic data when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Path to output model file
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    output: PathBuf,

    /// Synthetic samples to generate
    #[arg(long, default_value_t = 1000)]
    samples: usize,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum depth of trees
    #[arg(long, default_value_t = 10)]
    max_depth: u16,

    /// Trees in the anomaly detector
    #[arg(long, default_value_t = 100)]
    anomaly_trees: usize,

    /// Expected share of outliers in the training data
    #[arg(long, default_value_t = 0.1)]
    contamination: f64,

    /// Seed for data generation, split and forests
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    let config = TrainingConfig {
        samples: args.samples,
        n_trees: args.n_trees,
        max_depth: args.max_depth,
        seed: args.seed,
        anomaly_trees: args.anomaly_trees,
        contamination: args.contamination,
        ..Default::default()
    };

    let model = match &args.input {
        Some(path) => {
            let dataset = read_labeled_csv(path)
                .with_context(|| format!("Failed to load training data from {:?}", path))?;
            RiskModel::train(&dataset, &config, ModelOrigin::Labeled)?
        }
        None => {
            info!("No --input given, training on {} synthetic samples", args.samples);
            RiskModel::train_synthetic(&config)?
        }
    };

    match model.training_summary() {
        Some(summary) => println!(
            "OOS Test (n={}, train n={}): RMSE={:.6}, MAE={:.6}, R²={:.4}",
            summary.test_samples, summary.train_samples, summary.rmse, summary.mae, summary.r2
        ),
        None => println!("No hold-out set; metrics unavailable."),
    }

    // Quick sanity check against a known-safe and a known-risky profile.
    let safe = FeatureVector::from_values(&[
        5_000_000.0, 4.0, 1_000_000.0, 2_000_000.0, 700.0, 0.95, 0.9, 0.9, 0.05, 0.001, 0.02, 0.2,
    ])?;
    let risky = FeatureVector::from_values(&[
        50_000.0, 45.0, 5_000.0, 20_000.0, 10.0, 0.2, 0.3, 0.3, 0.9, 0.08, 0.9, 0.95,
    ])?;
    println!(
        "Sanity: safe profile {:.3}, risky profile {:.3}",
        model.predict(&safe)?,
        model.predict(&risky)?
    );

    ModelStore::new(&args.output).save(&model)?;
    println!("Done. Model saved to {:?}", args.output);
    Ok(())
}

//! Risk model configuration parsing from environment variables.
//!
//! This module handles the model artifact location, training sizes and seeds.

use super::{Lookup, parse_bool, parse_value};
use crate::application::ml::smartcore_predictor::TrainingConfig;
use anyhow::{Result, bail};
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "data/models/risk_model.json";

/// Risk model environment configuration
#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub model_path: PathBuf,
    pub seed: u64,
    pub feature_noise_seed: u64,
    pub samples: usize,
    pub n_trees: usize,
    pub max_depth: u16,
    pub anomaly_contamination: f64,
    pub anomaly_trees: usize,
    /// Save a freshly trained model when none could be loaded.
    pub persist: bool,
}

impl ModelEnvConfig {
    pub fn from_lookup(lookup: &Lookup<'_>) -> Result<Self> {
        let config = Self {
            model_path: lookup("RISK_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            seed: parse_value(lookup, "RISK_MODEL_SEED", 42)?,
            feature_noise_seed: parse_value(lookup, "FEATURE_NOISE_SEED", 42)?,
            samples: parse_value(lookup, "RISK_MODEL_SAMPLES", 1000)?,
            n_trees: parse_value(lookup, "RISK_MODEL_TREES", 100)?,
            max_depth: parse_value(lookup, "RISK_MODEL_MAX_DEPTH", 10)?,
            anomaly_contamination: parse_value(lookup, "ANOMALY_CONTAMINATION", 0.10)?,
            anomaly_trees: parse_value(lookup, "ANOMALY_TREES", 100)?,
            persist: parse_bool(lookup, "RISK_MODEL_PERSIST", true),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.samples < 10 {
            bail!("RISK_MODEL_SAMPLES must be at least 10, got {}", self.samples);
        }
        if self.n_trees == 0 {
            bail!("RISK_MODEL_TREES must be positive");
        }
        if self.max_depth == 0 {
            bail!("RISK_MODEL_MAX_DEPTH must be positive");
        }
        if self.anomaly_trees == 0 {
            bail!("ANOMALY_TREES must be positive");
        }
        if !(self.anomaly_contamination > 0.0 && self.anomaly_contamination <= 0.5) {
            bail!(
                "ANOMALY_CONTAMINATION must be in (0, 0.5], got {}",
                self.anomaly_contamination
            );
        }
        Ok(())
    }

    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            samples: self.samples,
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            seed: self.seed,
            anomaly_trees: self.anomaly_trees,
            contamination: self.anomaly_contamination,
            ..Default::default()
        }
    }
}

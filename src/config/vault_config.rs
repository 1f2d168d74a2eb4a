//! Vault risk policy configuration parsing from environment variables.
//!
//! Tolerances are fractions in [0, 1]; allocation limits are percentages.

use super::{Lookup, parse_value};
use crate::domain::risk::allocation::{
    DEFAULT_HIGH_VOLATILITY_THRESHOLD, DEFAULT_MAX_STRATEGY_PCT, DEFAULT_REBALANCE_THRESHOLD_PCT,
};
use anyhow::{Result, bail};

/// Vault risk policy environment configuration
#[derive(Debug, Clone)]
pub struct VaultEnvConfig {
    pub max_risk_tolerance: f64,
    pub emergency_threshold: f64,
    pub rebalance_threshold_pct: f64,
    pub max_single_strategy_pct: f64,
    pub high_volatility_threshold: f64,
}

impl Default for VaultEnvConfig {
    fn default() -> Self {
        Self {
            max_risk_tolerance: 0.6,
            emergency_threshold: 0.8,
            rebalance_threshold_pct: DEFAULT_REBALANCE_THRESHOLD_PCT,
            max_single_strategy_pct: DEFAULT_MAX_STRATEGY_PCT,
            high_volatility_threshold: DEFAULT_HIGH_VOLATILITY_THRESHOLD,
        }
    }
}

impl VaultEnvConfig {
    pub fn from_lookup(lookup: &Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            max_risk_tolerance: parse_value(lookup, "MAX_RISK_TOLERANCE", defaults.max_risk_tolerance)?,
            emergency_threshold: parse_value(lookup, "EMERGENCY_THRESHOLD", defaults.emergency_threshold)?,
            rebalance_threshold_pct: parse_value(
                lookup,
                "REBALANCE_THRESHOLD_PCT",
                defaults.rebalance_threshold_pct,
            )?,
            max_single_strategy_pct: parse_value(
                lookup,
                "MAX_SINGLE_STRATEGY_PCT",
                defaults.max_single_strategy_pct,
            )?,
            high_volatility_threshold: parse_value(
                lookup,
                "HIGH_VOLATILITY_THRESHOLD",
                defaults.high_volatility_threshold,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("MAX_RISK_TOLERANCE", self.max_risk_tolerance),
            ("EMERGENCY_THRESHOLD", self.emergency_threshold),
            ("HIGH_VOLATILITY_THRESHOLD", self.high_volatility_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be between 0 and 1, got {}", key, value);
            }
        }
        if !(self.rebalance_threshold_pct >= 0.0 && self.rebalance_threshold_pct <= 100.0) {
            bail!(
                "REBALANCE_THRESHOLD_PCT must be between 0 and 100, got {}",
                self.rebalance_threshold_pct
            );
        }
        if !(self.max_single_strategy_pct > 0.0 && self.max_single_strategy_pct <= 100.0) {
            bail!(
                "MAX_SINGLE_STRATEGY_PCT must be in (0, 100], got {}",
                self.max_single_strategy_pct
            );
        }
        Ok(())
    }
}

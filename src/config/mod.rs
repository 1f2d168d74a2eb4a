//! Configuration module for vaultrisk.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by domain: Model and Vault policy. Every sub-config parses from a
//! key lookup so it can be built from a map in tests.

mod model_config;
mod vault_config;

pub use model_config::{DEFAULT_MODEL_PATH, ModelEnvConfig};
pub use vault_config::VaultEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Key to optional raw value.
pub type Lookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelEnvConfig,
    pub vault: VaultEnvConfig,
}

impl Config {
    /// Load configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup(lookup: &Lookup<'_>) -> Result<Self> {
        let model = ModelEnvConfig::from_lookup(lookup).context("Failed to load model config")?;
        let vault = VaultEnvConfig::from_lookup(lookup).context("Failed to load vault config")?;
        Ok(Self { model, vault })
    }
}

fn parse_value<T>(lookup: &Lookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}", key)),
        None => Ok(default),
    }
}

fn parse_bool(lookup: &Lookup<'_>, key: &str, default: bool) -> bool {
    lookup(key)
        .and_then(|raw| raw.trim().parse::<bool>().ok())
        .unwrap_or(default)
}

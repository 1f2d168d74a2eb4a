use crate::config::{Config, DEFAULT_MODEL_PATH};
use std::collections::HashMap;
use std::path::PathBuf;

fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(&|key: &str| vars.get(key).cloned())
}

#[test]
fn test_config_defaults() {
    let config = config_from(&[]).unwrap();

    assert_eq!(config.model.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    assert_eq!(config.model.seed, 42);
    assert_eq!(config.model.feature_noise_seed, 42);
    assert_eq!(config.model.samples, 1000);
    assert_eq!(config.model.n_trees, 100);
    assert_eq!(config.model.max_depth, 10);
    assert_eq!(config.model.anomaly_trees, 100);
    assert!((config.model.anomaly_contamination - 0.1).abs() < 1e-12);
    assert!(config.model.persist);

    assert!((config.vault.max_risk_tolerance - 0.6).abs() < 1e-12);
    assert!((config.vault.emergency_threshold - 0.8).abs() < 1e-12);
    assert!((config.vault.rebalance_threshold_pct - 5.0).abs() < 1e-12);
    assert!((config.vault.max_single_strategy_pct - 40.0).abs() < 1e-12);
    assert!((config.vault.high_volatility_threshold - 0.7).abs() < 1e-12);
}

#[test]
fn test_config_overrides() {
    let config = config_from(&[
        ("RISK_MODEL_PATH", "/tmp/model.json"),
        ("RISK_MODEL_SEED", "7"),
        ("RISK_MODEL_TREES", "25"),
        ("RISK_MODEL_MAX_DEPTH", " 6 "),
        ("MAX_SINGLE_STRATEGY_PCT", "35"),
        ("EMERGENCY_THRESHOLD", "0.75"),
    ])
    .unwrap();

    assert_eq!(config.model.model_path, PathBuf::from("/tmp/model.json"));
    assert_eq!(config.model.seed, 7);
    assert_eq!(config.model.n_trees, 25);
    assert_eq!(config.model.max_depth, 6);
    assert!((config.vault.max_single_strategy_pct - 35.0).abs() < 1e-12);
    assert!((config.vault.emergency_threshold - 0.75).abs() < 1e-12);

    let training = config.model.training_config();
    assert_eq!(training.n_trees, 25);
    assert_eq!(training.seed, 7);
    assert!((training.test_fraction - 0.2).abs() < 1e-12);
}

#[test]
fn test_unparsable_number_is_an_error() {
    let err = config_from(&[("RISK_MODEL_TREES", "many")]).unwrap_err();
    assert!(format!("{:#}", err).contains("RISK_MODEL_TREES"));
}

#[test]
fn test_out_of_range_values_are_errors() {
    assert!(config_from(&[("ANOMALY_CONTAMINATION", "0.9")]).is_err());
    assert!(config_from(&[("MAX_RISK_TOLERANCE", "1.5")]).is_err());
    assert!(config_from(&[("MAX_SINGLE_STRATEGY_PCT", "0")]).is_err());
    assert!(config_from(&[("RISK_MODEL_SAMPLES", "3")]).is_err());
}

#[test]
fn test_unparsable_bool_falls_back_to_default() {
    let config = config_from(&[("RISK_MODEL_PERSIST", "sometimes")]).unwrap();
    assert!(config.model.persist);

    let config = config_from(&[("RISK_MODEL_PERSIST", "false")]).unwrap();
    assert!(!config.model.persist);
}

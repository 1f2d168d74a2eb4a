//! Property-based tests for the risk engine invariants
//!
//! These tests use proptest to check score bounds, classification determinism
//! and allocation normalization across many random inputs.

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use vaultrisk::application::ml::smartcore_predictor::{RiskModel, TrainingConfig};
use vaultrisk::application::risk_management::allocation_policy::AllocationPolicy;
use vaultrisk::domain::ml::feature_registry::{FEATURE_BOUNDS, FeatureVector};
use vaultrisk::domain::ports::RiskPredictor;
use vaultrisk::domain::risk::risk_level::RiskLevel;
use vaultrisk::domain::risk::risk_factors::RiskFactors;
use vaultrisk::domain::strategy::classify_type;

static MODEL: OnceLock<RiskModel> = OnceLock::new();

fn model() -> &'static RiskModel {
    MODEL.get_or_init(|| {
        RiskModel::train_synthetic(&TrainingConfig {
            samples: 300,
            n_trees: 10,
            max_depth: 6,
            anomaly_trees: 20,
            ..Default::default()
        })
        .expect("small synthetic model trains")
    })
}

/// Feature vectors drawn uniformly from each feature's valid range.
fn feature_vector() -> impl Strategy<Value = FeatureVector> {
    let ranges: Vec<_> = FEATURE_BOUNDS
        .iter()
        .map(|&(lo, hi)| lo..=hi.min(1e8))
        .collect();
    ranges.prop_map(|values| FeatureVector::from_values(&values).expect("in-range features"))
}

fn risk_map() -> impl Strategy<Value = BTreeMap<String, f64>> {
    prop::collection::btree_map("[a-z]{1,8}", 0.0f64..=1.0f64, 1..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Scores stay in [0, 1] for every valid feature vector
    #[test]
    fn prediction_is_bounded(fv in feature_vector()) {
        let score = model().predict(&fv).unwrap();
        prop_assert!((0.0..=1.0).contains(&score));

        let inference = model().analyze(&fv).unwrap();
        prop_assert!((0.0..=1.0).contains(&inference.confidence));
    }

    /// Factor scores stay in [0, 1]
    #[test]
    fn risk_factors_are_bounded(fv in feature_vector()) {
        let f = RiskFactors::from_features(&fv);
        for v in [
            f.smart_contract_risk,
            f.liquidity_risk,
            f.market_risk,
            f.operational_risk,
            f.technical_risk,
            f.composability_risk,
        ] {
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }

    /// Classification is a pure function of the identifier
    #[test]
    fn classification_is_deterministic(id in "[a-zA-Z0-9x-]{0,40}") {
        prop_assert_eq!(classify_type(&id), classify_type(&id));
        prop_assert_eq!(classify_type(&id), classify_type(&id.to_uppercase()));
    }

    /// Risk levels are monotone in the score
    #[test]
    fn risk_level_is_monotone(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(RiskLevel::from_score(lo) <= RiskLevel::from_score(hi));
    }

    /// Allocations always sum to 100 and respect any feasible cap
    #[test]
    fn allocation_sums_to_hundred(
        scores in risk_map(),
        volatility in 0.0f64..=1.0,
        cap in 5.0f64..=100.0,
    ) {
        let alloc = AllocationPolicy::default().recommend_allocation(&scores, volatility, cap);
        prop_assert_eq!(alloc.len(), scores.len());

        let total: f64 = alloc.values().sum();
        prop_assert!((total - 100.0).abs() < 0.01);

        let effective_cap = cap.max(100.0 / scores.len() as f64);
        for pct in alloc.values() {
            prop_assert!(*pct >= 0.0);
            prop_assert!(*pct <= effective_cap + 1e-6);
        }
    }
}

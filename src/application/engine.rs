//! Risk Engine
//!
//! Single entry point for callers (agent tools, the CLI): scoring, full
//! assessments, portfolio aggregation, allocation, trends and emergency scans,
//! all sharing one assessment service and one hot-swappable model.

use crate::application::bootstrap::model::ModelBootstrap;
use crate::application::feature_extraction::SyntheticFeatureExtractor;
use crate::application::ml::smartcore_predictor::{RiskModel, TrainingConfig, TrainingSummary};
use crate::application::risk_management::allocation_policy::AllocationPolicy;
use crate::application::risk_management::assessment_service::RiskAssessmentService;
use crate::application::risk_management::emergency_monitor::EmergencyMonitor;
use crate::application::risk_management::portfolio_aggregator::PortfolioRiskAggregator;
use crate::application::risk_management::trend_analyzer::analyze_trend;
use crate::config::{Config, VaultEnvConfig};
use crate::domain::errors::RiskEngineError;
use crate::domain::ports::{FeatureExtractor, RiskPredictor};
use crate::domain::risk::allocation::AllocationPlan;
use crate::domain::risk::assessment::RiskAssessment;
use crate::domain::risk::emergency::{EmergencyReport, StrategyVerdict};
use crate::domain::risk::portfolio::PortfolioAssessment;
use crate::domain::risk::trend::{RiskObservation, RiskTrend};
use crate::infrastructure::observability::RiskMetrics;
use anyhow::Context;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub struct RiskEngine {
    service: RiskAssessmentService,
    allocation: AllocationPolicy,
    emergency: EmergencyMonitor,
    max_risk_tolerance: f64,
    max_single_strategy_pct: f64,
}

impl RiskEngine {
    pub fn new(
        extractor: Arc<dyn FeatureExtractor>,
        model: Arc<dyn RiskPredictor>,
        vault: &VaultEnvConfig,
    ) -> Self {
        Self {
            service: RiskAssessmentService::new(extractor, model),
            allocation: AllocationPolicy::new(
                vault.rebalance_threshold_pct,
                vault.high_volatility_threshold,
            ),
            emergency: EmergencyMonitor::new(vault.emergency_threshold),
            max_risk_tolerance: vault.max_risk_tolerance,
            max_single_strategy_pct: vault.max_single_strategy_pct,
        }
    }

    /// Loads (or trains) the model and uses the seeded synthetic extractor.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let extractor = SyntheticFeatureExtractor::new(config.model.feature_noise_seed)
            .context("Failed to create feature extractor")?;
        Ok(Self::from_config_with_extractor(config, Arc::new(extractor)))
    }

    pub fn from_config_with_extractor(
        config: &Config,
        extractor: Arc<dyn FeatureExtractor>,
    ) -> Self {
        let model = ModelBootstrap::init(&config.model);
        info!("Risk engine ready: {} ({})", model.name(), model.version());
        Self::new(extractor, model, &config.vault)
    }

    pub fn with_metrics(mut self, metrics: RiskMetrics) -> Self {
        self.service = self.service.with_metrics(metrics);
        self
    }

    pub fn service(&self) -> &RiskAssessmentService {
        &self.service
    }

    pub fn max_single_strategy_pct(&self) -> f64 {
        self.max_single_strategy_pct
    }

    pub fn score(&self, identifier: &str) -> f64 {
        self.service.quick_score(identifier)
    }

    pub fn assess(&self, identifier: &str) -> RiskAssessment {
        self.service.detailed_assessment(identifier)
    }

    /// Fails only on invalid allocations.
    pub fn portfolio(
        &self,
        identifiers: &[String],
        allocations: &[f64],
    ) -> Result<PortfolioAssessment, RiskEngineError> {
        PortfolioRiskAggregator::assess_portfolio(&self.service, identifiers, allocations)
    }

    pub fn allocate(
        &self,
        risk_scores: &BTreeMap<String, f64>,
        market_volatility: f64,
        max_per_strategy_pct: f64,
    ) -> BTreeMap<String, f64> {
        self.allocation
            .recommend_allocation(risk_scores, market_volatility, max_per_strategy_pct)
    }

    pub fn plan_rebalance(
        &self,
        risk_scores: &BTreeMap<String, f64>,
        current_pcts: &BTreeMap<String, f64>,
        market_volatility: f64,
        max_per_strategy_pct: f64,
    ) -> AllocationPlan {
        self.allocation.plan_rebalance(
            risk_scores,
            current_pcts,
            market_volatility,
            max_per_strategy_pct,
        )
    }

    /// Trend over the supplied history plus a fresh score taken now.
    pub fn trend(
        &self,
        identifier: &str,
        history: &[RiskObservation],
    ) -> Result<RiskTrend, RiskEngineError> {
        let mut observations = history.to_vec();
        observations.push(RiskObservation {
            timestamp: Utc::now(),
            risk_score: self.score(identifier),
        });
        analyze_trend(identifier, &observations)
    }

    pub fn emergency_scan(&self, identifiers: &[String], market_stress: bool) -> EmergencyReport {
        self.emergency.scan(&self.service, identifiers, market_stress)
    }

    pub fn is_strategy_safe(&self, identifier: &str) -> bool {
        self.score(identifier) < self.max_risk_tolerance
    }

    pub fn verdict(&self, identifier: &str) -> StrategyVerdict {
        StrategyVerdict::from_score(self.score(identifier))
    }

    pub fn swap_model(&self, model: Arc<dyn RiskPredictor>) -> Arc<dyn RiskPredictor> {
        self.service.swap_model(model)
    }

    /// Trains a fresh synthetic model and swaps it in; in-flight calls keep
    /// the model they started with.
    pub fn retrain(
        &self,
        training: &TrainingConfig,
    ) -> Result<Option<TrainingSummary>, RiskEngineError> {
        let model = RiskModel::train_synthetic(training)?;
        let summary = model.training_summary().cloned();
        self.swap_model(Arc::new(model));
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::FeatureVector;
    use crate::domain::strategy::StrategyType;
    use crate::application::feature_extraction::base_features;

    struct TypeDefaults;

    impl FeatureExtractor for TypeDefaults {
        fn extract(&self, identifier: &str) -> Result<FeatureVector, RiskEngineError> {
            FeatureVector::from_values(&base_features(StrategyType::classify(identifier)))
        }
    }

    /// Scores by strategy type so tests can pick the outcome by name.
    struct ByType;

    impl RiskPredictor for ByType {
        fn predict(&self, features: &FeatureVector) -> Result<f64, RiskEngineError> {
            Ok(features.smart_contract_complexity())
        }
        fn name(&self) -> &str {
            "ByType"
        }
        fn version(&self) -> &str {
            "test"
        }
    }

    fn engine() -> RiskEngine {
        RiskEngine::new(Arc::new(TypeDefaults), Arc::new(ByType), &VaultEnvConfig::default())
    }

    #[test]
    fn test_safety_and_verdicts() {
        let engine = engine();
        // lottery complexity 0.3, dex 0.7
        assert!(engine.is_strategy_safe("lottery-pool"));
        assert!(!engine.is_strategy_safe("pancake-lp"));
        assert_eq!(engine.verdict("lottery-pool"), StrategyVerdict::Approve);
        assert_eq!(engine.verdict("pancake-lp"), StrategyVerdict::Caution);
    }

    #[test]
    fn test_trend_appends_current_score() {
        let engine = engine();
        let history = vec![RiskObservation {
            timestamp: Utc::now() - chrono::Duration::days(10),
            risk_score: 0.1,
        }];
        let trend = engine.trend("pancake-lp", &history).unwrap();
        assert_eq!(trend.observations, 2);
        assert!((trend.current_risk - 0.7).abs() < 1e-12);
        assert_eq!(trend.period_days, 10);
    }

    #[test]
    fn test_retrain_swaps_model() {
        let engine = engine();
        let summary = engine
            .retrain(&TrainingConfig {
                samples: 200,
                n_trees: 5,
                max_depth: 6,
                anomaly_trees: 10,
                ..Default::default()
            })
            .unwrap();

        assert!(summary.is_some());
        assert_eq!(engine.service().snapshot().version(), "1.0-synthetic");
        let score = engine.score("aave-usdc");
        assert!((0.0..=1.0).contains(&score));
    }
}

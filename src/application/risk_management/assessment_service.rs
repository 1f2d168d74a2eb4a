use super::recommendations::{prepend_anomaly, strategy_recommendations};
use crate::application::ml::model_handle::ModelHandle;
use crate::domain::errors::RiskEngineError;
use crate::domain::ports::{FeatureExtractor, RiskPredictor};
use crate::domain::risk::assessment::{FALLBACK_SCORE, RiskAssessment};
use crate::domain::risk::risk_factors::RiskFactors;
use crate::domain::risk::risk_level::RiskLevel;
use crate::domain::strategy::classify_type;
use crate::infrastructure::observability::RiskMetrics;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Feature extraction plus model inference for single strategies.
///
/// The public calls never fail: any internal error is logged and replaced by
/// the conservative fallback (score 0.5, MEDIUM).
pub struct RiskAssessmentService {
    extractor: Arc<dyn FeatureExtractor>,
    model: ModelHandle,
    metrics: Option<RiskMetrics>,
}

impl RiskAssessmentService {
    pub fn new(extractor: Arc<dyn FeatureExtractor>, model: Arc<dyn RiskPredictor>) -> Self {
        Self {
            extractor,
            model: ModelHandle::new(model),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: RiskMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn metrics(&self) -> Option<&RiskMetrics> {
        self.metrics.as_ref()
    }

    /// The model every call in one request should use.
    pub fn snapshot(&self) -> Arc<dyn RiskPredictor> {
        self.model.snapshot()
    }

    pub fn swap_model(&self, model: Arc<dyn RiskPredictor>) -> Arc<dyn RiskPredictor> {
        if let Some(metrics) = &self.metrics {
            metrics.model_swaps_total.inc();
        }
        self.model.swap(model)
    }

    /// Score only; the cheapest path.
    pub fn quick_score(&self, identifier: &str) -> f64 {
        let model = self.snapshot();
        self.quick_score_with(model.as_ref(), identifier)
    }

    pub fn quick_score_with(&self, model: &dyn RiskPredictor, identifier: &str) -> f64 {
        let (score, fallback) = match self.try_score(model, identifier) {
            Ok(score) => (score, false),
            Err(e) => {
                error!("Risk assessment error for {}: {}", identifier, e);
                (FALLBACK_SCORE, true)
            }
        };
        if let Some(metrics) = &self.metrics {
            metrics.record_assessment("quick", score, fallback);
        }
        score
    }

    /// Full pipeline: features, score, factors, recommendations, anomaly check.
    pub fn detailed_assessment(&self, identifier: &str) -> RiskAssessment {
        let model = self.snapshot();
        self.detailed_assessment_with(model.as_ref(), identifier)
    }

    pub fn detailed_assessment_with(
        &self,
        model: &dyn RiskPredictor,
        identifier: &str,
    ) -> RiskAssessment {
        let (assessment, fallback) = match self.try_assess(model, identifier) {
            Ok(assessment) => (assessment, false),
            Err(e) => {
                error!("Detailed assessment error for {}: {}", identifier, e);
                (RiskAssessment::fallback(identifier), true)
            }
        };
        if let Some(metrics) = &self.metrics {
            metrics.record_assessment("detailed", assessment.risk_score, fallback);
        }
        assessment
    }

    fn try_score(&self, model: &dyn RiskPredictor, identifier: &str) -> Result<f64, RiskEngineError> {
        let features = self.extractor.extract(identifier)?;
        bounded(model.predict(&features)?)
    }

    fn try_assess(
        &self,
        model: &dyn RiskPredictor,
        identifier: &str,
    ) -> Result<RiskAssessment, RiskEngineError> {
        let features = self.extractor.extract(identifier)?;
        let inference = model.analyze(&features)?;
        let risk_score = bounded(inference.risk_score)?;
        let risk_level = RiskLevel::from_score(risk_score);
        let risk_factors = RiskFactors::from_features(&features);
        let kind = classify_type(identifier);

        let mut recommendations = strategy_recommendations(risk_level, &risk_factors, kind);
        if inference.is_anomaly {
            warn!("Anomalous risk profile for {} ({})", identifier, kind);
            prepend_anomaly(&mut recommendations);
            if let Some(metrics) = &self.metrics {
                metrics.anomalies_total.inc();
            }
        }

        debug!(
            "Assessed {} as {} ({:.3}, confidence {:.2})",
            identifier, risk_level, risk_score, inference.confidence
        );

        Ok(RiskAssessment {
            identifier: identifier.to_string(),
            risk_score,
            risk_level,
            confidence: inference.confidence.clamp(0.0, 1.0),
            risk_factors,
            recommendations,
            timestamp: Utc::now(),
            model_version: model.version().to_string(),
            fallback: false,
        })
    }
}

// Predictors promise [0, 1]; anything else (mock, corrupted artifact) is an
// inference failure rather than a silently clipped number.
fn bounded(score: f64) -> Result<f64, RiskEngineError> {
    if !score.is_finite() {
        return Err(RiskEngineError::Inference {
            reason: format!("model returned non-finite score {}", score),
        });
    }
    Ok(score.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::FeatureVector;
    use crate::domain::ports::{ModelInference, UnfittedModel};
    use crate::domain::risk::assessment::{MANUAL_REVIEW_RECOMMENDATION, MAX_RECOMMENDATIONS};
    use crate::application::ml::smartcore_predictor::{RiskModel, TrainingConfig};
    use crate::application::risk_management::recommendations::ANOMALY_RECOMMENDATION;
    use crate::domain::ml::feature_registry::{MAX_APY, MAX_SLIPPAGE};
    use crate::domain::risk::assessment::FALLBACK_MODEL_VERSION;

    struct FixedExtractor;

    impl FeatureExtractor for FixedExtractor {
        fn extract(&self, _identifier: &str) -> Result<FeatureVector, RiskEngineError> {
            FeatureVector::from_values(&[
                2_000_000.0, 12.0, 500_000.0, 800_000.0, 120.0, 0.7, 0.65, 0.75, 0.35, 0.02, 0.6, 0.7,
            ])
        }
    }

    /// Every feature at the edge of its range at once.
    struct OutlierExtractor;

    impl FeatureExtractor for OutlierExtractor {
        fn extract(&self, _identifier: &str) -> Result<FeatureVector, RiskEngineError> {
            FeatureVector::from_values(&[
                1e12, MAX_APY, 1e12, 1e12, 1e6, 0.0, 0.0, 0.0, 1.0, MAX_SLIPPAGE, 1.0, 1.0,
            ])
        }
    }

    struct FailingExtractor;

    impl FeatureExtractor for FailingExtractor {
        fn extract(&self, _identifier: &str) -> Result<FeatureVector, RiskEngineError> {
            Err(RiskEngineError::ExtractorUnavailable {
                reason: "rpc down".to_string(),
            })
        }
    }

    struct StubModel {
        score: f64,
        anomaly: bool,
    }

    impl RiskPredictor for StubModel {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, RiskEngineError> {
            Ok(self.score)
        }
        fn analyze(&self, features: &FeatureVector) -> Result<ModelInference, RiskEngineError> {
            Ok(ModelInference {
                risk_score: self.predict(features)?,
                confidence: if self.anomaly { 0.72 } else { 0.9 },
                is_anomaly: self.anomaly,
            })
        }
        fn name(&self) -> &str {
            "Stub"
        }
        fn version(&self) -> &str {
            "stub-1"
        }
    }

    fn service(score: f64, anomaly: bool) -> RiskAssessmentService {
        RiskAssessmentService::new(Arc::new(FixedExtractor), Arc::new(StubModel { score, anomaly }))
    }

    #[test]
    fn test_quick_score_uses_model() {
        assert_eq!(service(0.42, false).quick_score("0xabc"), 0.42);
    }

    #[test]
    fn test_detailed_assessment_fields() {
        let a = service(0.65, false).detailed_assessment("pancake-usdc");

        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(a.confidence, 0.9);
        assert_eq!(a.model_version, "stub-1");
        assert!(a.recommendations[0].starts_with("HIGH RISK"));
        // DEX with market risk (0.35 + 0.6) / 2 > 0.5
        assert!(a.recommendations.iter().any(|r| r.contains("impermanent loss")));
        assert!(a.recommendations.len() <= MAX_RECOMMENDATIONS);
    }

    #[test]
    fn test_anomaly_is_prepended() {
        let a = service(0.2, true).detailed_assessment("0xabc");
        assert_eq!(a.recommendations[0], ANOMALY_RECOMMENDATION);
        assert_eq!(a.confidence, 0.72);
    }

    #[test]
    fn test_extractor_failure_returns_fallback() {
        let svc = RiskAssessmentService::new(
            Arc::new(FailingExtractor),
            Arc::new(StubModel {
                score: 0.1,
                anomaly: false,
            }),
        );

        assert_eq!(svc.quick_score("0xabc"), 0.5);
        let a = svc.detailed_assessment("0xabc");
        assert_eq!(a.risk_score, 0.5);
        assert_eq!(a.risk_level, RiskLevel::Medium);
        assert_eq!(a.confidence, 0.3);
        assert_eq!(a.recommendations, vec![MANUAL_REVIEW_RECOMMENDATION.to_string()]);
        assert_eq!(a.identifier, "0xabc");
    }

    #[test]
    fn test_unfitted_model_returns_fallback() {
        let svc = RiskAssessmentService::new(Arc::new(FixedExtractor), Arc::new(UnfittedModel));
        assert_eq!(svc.quick_score("x"), 0.5);
        assert!(svc.detailed_assessment("x").is_fallback());
    }

    #[test]
    fn test_non_finite_score_is_a_failure() {
        assert_eq!(service(f64::NAN, false).quick_score("x"), 0.5);
        assert_eq!(service(1.7, false).quick_score("x"), 1.0);
    }

    #[test]
    fn test_swap_model_changes_scores() {
        let svc = service(0.2, false);
        svc.swap_model(Arc::new(StubModel {
            score: 0.9,
            anomaly: false,
        }));
        assert_eq!(svc.quick_score("x"), 0.9);
    }

    #[test]
    fn test_metrics_are_recorded() {
        let metrics = RiskMetrics::new().unwrap();
        let svc = service(0.3, true).with_metrics(metrics.clone());
        svc.detailed_assessment("x");
        assert_eq!(metrics.anomalies_total.get(), 1);
    }

    #[test]
    fn test_trained_model_flags_outlier_first() {
        let model = RiskModel::train_synthetic(&TrainingConfig {
            samples: 300,
            n_trees: 15,
            max_depth: 8,
            anomaly_trees: 30,
            ..Default::default()
        })
        .unwrap();
        let svc = RiskAssessmentService::new(Arc::new(OutlierExtractor), Arc::new(model));

        let a = svc.detailed_assessment("0xabc");
        assert!(!a.is_fallback());
        assert_eq!(a.recommendations[0], ANOMALY_RECOMMENDATION);
        assert!(a.recommendations.len() <= MAX_RECOMMENDATIONS);
    }

    #[test]
    fn test_fallback_metrics_follow_the_failure_path() {
        struct Impostor;

        impl RiskPredictor for Impostor {
            fn predict(&self, _features: &FeatureVector) -> Result<f64, RiskEngineError> {
                Ok(0.4)
            }
            fn name(&self) -> &str {
                "Impostor"
            }
            fn version(&self) -> &str {
                FALLBACK_MODEL_VERSION
            }
        }

        let metrics = RiskMetrics::new().unwrap();
        let svc = RiskAssessmentService::new(Arc::new(FixedExtractor), Arc::new(Impostor))
            .with_metrics(metrics.clone());

        let a = svc.detailed_assessment("x");
        assert!(!a.is_fallback());
        let counted = |outcome: &str| {
            metrics
                .assessments_total
                .with_label_values(&["detailed", outcome])
                .get()
        };
        assert_eq!(counted("ok"), 1.0);
        assert_eq!(counted("fallback"), 0.0);
    }
}

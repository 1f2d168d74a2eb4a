use crate::domain::errors::RiskEngineError;
use crate::domain::ml::feature_registry::FeatureVector;

/// Source of strategy features (on-chain reads, a registry, or synthetic data).
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, identifier: &str) -> Result<FeatureVector, RiskEngineError>;
}

/// Output of one full model pass over a feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelInference {
    /// Clipped to [0, 1].
    pub risk_score: f64,
    /// Heuristic in [0.6, 1]; not a statistical interval.
    pub confidence: f64,
    pub is_anomaly: bool,
}

/// Interface for the risk models.
///
/// Implementations are immutable once built and shared across threads; a
/// retrained model is a new instance.
pub trait RiskPredictor: Send + Sync {
    /// Risk score in [0, 1].
    fn predict(&self, features: &FeatureVector) -> Result<f64, RiskEngineError>;

    /// Score plus confidence and anomaly flag. Models without a detector keep
    /// the default, which reports full confidence and no anomaly.
    fn analyze(&self, features: &FeatureVector) -> Result<ModelInference, RiskEngineError> {
        Ok(ModelInference {
            risk_score: self.predict(features)?,
            confidence: 1.0,
            is_anomaly: false,
        })
    }

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}

/// Placeholder used when no model could be loaded or trained.
/// Every call fails, so callers receive their documented fallbacks.
pub struct UnfittedModel;

impl RiskPredictor for UnfittedModel {
    fn predict(&self, _features: &FeatureVector) -> Result<f64, RiskEngineError> {
        Err(RiskEngineError::ModelNotFitted)
    }

    fn name(&self) -> &str {
        "Unfitted"
    }

    fn version(&self) -> &str {
        "none"
    }
}

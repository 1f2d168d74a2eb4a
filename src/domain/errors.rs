use thiserror::Error;

/// Errors raised inside the risk engine.
///
/// Only the allocation validation variants ever leave the public API; the
/// inference variants are turned into conservative fallback values at the
/// service boundary and the model lifecycle variants into synthetic retraining.
#[derive(Debug, Error)]
pub enum RiskEngineError {
    #[error("Strategy/allocation length mismatch: {strategies} strategies, {allocations} allocations")]
    AllocationLengthMismatch {
        strategies: usize,
        allocations: usize,
    },

    #[error("Allocation {index} must be a finite fraction in [0, 1], got {value}")]
    AllocationOutOfRange { index: usize, value: f64 },

    #[error("Allocations must sum to 1.0 (±{tolerance}), got {sum:.4}")]
    AllocationSumInvalid { sum: f64, tolerance: f64 },

    #[error("Missing feature: {name}")]
    MissingFeature { name: String },

    #[error("Invalid value for feature {name}: {value}")]
    InvalidFeature { name: String, value: f64 },

    #[error("Risk model is not fitted")]
    ModelNotFitted,

    #[error("Inference failed: {reason}")]
    Inference { reason: String },

    #[error("Feature extractor unavailable: {reason}")]
    ExtractorUnavailable { reason: String },

    #[error("Training failed: {reason}")]
    Training { reason: String },

    #[error("Failed to load model artifact: {reason}")]
    ModelLoad { reason: String },

    #[error("Incompatible model artifact version {found} (expected major {expected_major})")]
    IncompatibleModelVersion { found: String, expected_major: u32 },

    #[error("Model persistence failed: {reason}")]
    Persistence { reason: String },

    #[error("Insufficient history for trend analysis of {identifier}")]
    EmptyHistory { identifier: String },
}

impl RiskEngineError {
    /// True for the caller-facing validation errors that must never be masked.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RiskEngineError::AllocationLengthMismatch { .. }
                | RiskEngineError::AllocationOutOfRange { .. }
                | RiskEngineError::AllocationSumInvalid { .. }
        )
    }
}

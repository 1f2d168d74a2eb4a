use crate::domain::risk::risk_factors::RiskFactors;
use crate::domain::risk::risk_level::RiskLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_RECOMMENDATIONS: usize = 6;
pub const FALLBACK_SCORE: f64 = 0.5;
pub const FALLBACK_CONFIDENCE: f64 = 0.3;
pub const FALLBACK_MODEL_VERSION: &str = "1.0-fallback";
pub const MANUAL_REVIEW_RECOMMENDATION: &str = "Unable to assess - manual review required";

/// Result of a detailed risk assessment.
///
/// Serializes to a flat record: the factor scores sit next to the headline
/// score and the timestamp is RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(rename = "address")]
    pub identifier: String,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    #[serde(flatten)]
    pub risk_factors: RiskFactors,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub model_version: String,
    /// Set only by `fallback`; not part of the serialized record.
    #[serde(skip)]
    pub fallback: bool,
}

impl RiskAssessment {
    /// Conservative assessment returned whenever the pipeline fails.
    pub fn fallback(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            risk_score: FALLBACK_SCORE,
            risk_level: RiskLevel::Medium,
            confidence: FALLBACK_CONFIDENCE,
            risk_factors: RiskFactors::uniform(FALLBACK_SCORE),
            recommendations: vec![MANUAL_REVIEW_RECOMMENDATION.to_string()],
            timestamp: Utc::now(),
            model_version: FALLBACK_MODEL_VERSION.to_string(),
            fallback: true,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

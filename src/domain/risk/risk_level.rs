use serde::{Deserialize, Serialize};
use std::fmt;

pub const LOW_THRESHOLD: f64 = 0.3;
pub const MEDIUM_THRESHOLD: f64 = 0.6;
pub const HIGH_THRESHOLD: f64 = 0.8;

/// Ordinal bucket of a continuous risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// `< 0.3` LOW, `< 0.6` MEDIUM, `< 0.8` HIGH, otherwise CRITICAL.
    /// Boundaries belong to the upper bucket; NaN is treated as CRITICAL.
    pub fn from_score(score: f64) -> Self {
        if score < LOW_THRESHOLD {
            RiskLevel::Low
        } else if score < MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else if score < HIGH_THRESHOLD {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

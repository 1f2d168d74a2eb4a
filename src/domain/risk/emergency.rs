use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const APPROVE_BELOW: f64 = 0.5;
pub const CAUTION_BELOW: f64 = 0.8;
pub const MONITOR_ABOVE: f64 = 0.6;

/// Go/no-go call on deploying capital into a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrategyVerdict {
    Approve,
    Caution,
    Reject,
}

impl StrategyVerdict {
    pub fn from_score(score: f64) -> Self {
        if score < APPROVE_BELOW {
            StrategyVerdict::Approve
        } else if score < CAUTION_BELOW {
            StrategyVerdict::Caution
        } else {
            StrategyVerdict::Reject
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmergencyAction {
    EmergencyExit,
    Monitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VaultStatus {
    Normal,
    Monitor,
    AttentionRequired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAtRisk {
    #[serde(rename = "address")]
    pub identifier: String,
    pub risk_score: f64,
    pub action: EmergencyAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyReport {
    pub strategies_at_risk: Vec<StrategyAtRisk>,
    pub risk_scores: Vec<(String, f64)>,
    pub market_stress: bool,
    pub recommended_actions: Vec<String>,
    pub overall_status: VaultStatus,
    pub timestamp: DateTime<Utc>,
}

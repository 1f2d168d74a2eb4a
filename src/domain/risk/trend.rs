use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A risk score observed at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskObservation {
    pub timestamp: DateTime<Utc>,
    pub risk_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTrend {
    #[serde(rename = "address")]
    pub identifier: String,
    pub period_days: i64,
    pub observations: usize,
    pub current_risk: f64,
    pub average_risk: f64,
    pub risk_volatility: f64,
    pub trend_direction: TrendDirection,
    pub trend_magnitude: f64,
}

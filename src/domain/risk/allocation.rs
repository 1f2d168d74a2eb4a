use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Drift (in percentage points) below which rebalancing is not worth the gas.
pub const DEFAULT_REBALANCE_THRESHOLD_PCT: f64 = 5.0;
pub const DEFAULT_MAX_STRATEGY_PCT: f64 = 40.0;
pub const DEFAULT_HIGH_VOLATILITY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AllocationAction {
    Increase,
    Decrease,
    Hold,
}

impl fmt::Display for AllocationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationAction::Increase => write!(f, "INCREASE"),
            AllocationAction::Decrease => write!(f, "DECREASE"),
            AllocationAction::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketRegime {
    Normal,
    Stressed,
}

impl MarketRegime {
    pub fn from_volatility(volatility: f64, threshold: f64) -> Self {
        if volatility > threshold {
            MarketRegime::Stressed
        } else {
            MarketRegime::Normal
        }
    }

    pub fn is_stressed(&self) -> bool {
        matches!(self, MarketRegime::Stressed)
    }
}

/// Target versus actual weight of one strategy, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationDecision {
    pub strategy: String,
    pub current_pct: f64,
    pub optimal_pct: f64,
    pub action: AllocationAction,
    pub magnitude: f64,
}

impl AllocationDecision {
    pub fn new(strategy: impl Into<String>, current_pct: f64, optimal_pct: f64, threshold_pct: f64) -> Self {
        let delta = optimal_pct - current_pct;
        let action = if delta > threshold_pct {
            AllocationAction::Increase
        } else if delta < -threshold_pct {
            AllocationAction::Decrease
        } else {
            AllocationAction::Hold
        };
        Self {
            strategy: strategy.into(),
            current_pct,
            optimal_pct,
            action,
            magnitude: delta.abs(),
        }
    }

    pub fn exceeds(&self, threshold_pct: f64) -> bool {
        self.magnitude > threshold_pct
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub decisions: Vec<AllocationDecision>,
    pub rebalancing_needed: bool,
    pub market_regime: MarketRegime,
    pub timestamp: DateTime<Utc>,
}

use crate::domain::errors::RiskEngineError;
use crate::domain::risk::risk_level::RiskLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ALLOCATION_SUM_TOLERANCE: f64 = 0.01;
pub const DIVERSIFICATION_STEP: f64 = 0.05;
pub const MAX_DIVERSIFICATION_BENEFIT: f64 = 0.2;

/// One line of a portfolio: where capital sits and how risky it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAllocation {
    #[serde(rename = "address")]
    pub identifier: String,
    /// Fraction of the portfolio, in [0, 1].
    pub allocation: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAssessment {
    pub strategy_assessments: Vec<StrategyAllocation>,
    /// Allocation-weighted risk before the diversification discount.
    pub raw_risk_score: f64,
    pub portfolio_risk_score: f64,
    pub portfolio_risk_level: RiskLevel,
    pub diversification_benefit: f64,
    pub num_strategies: usize,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Checks the caller-supplied allocation vector. Never corrects it.
pub fn validate_allocations(strategies: usize, allocations: &[f64]) -> Result<(), RiskEngineError> {
    if strategies != allocations.len() {
        return Err(RiskEngineError::AllocationLengthMismatch {
            strategies,
            allocations: allocations.len(),
        });
    }
    if let Some((index, value)) = allocations
        .iter()
        .enumerate()
        .find(|(_, a)| !(0.0..=1.0).contains(*a))
    {
        return Err(RiskEngineError::AllocationOutOfRange {
            index,
            value: *value,
        });
    }
    let sum: f64 = allocations.iter().sum();
    // Written so NaN sums fail too.
    if !((sum - 1.0).abs() <= ALLOCATION_SUM_TOLERANCE) {
        return Err(RiskEngineError::AllocationSumInvalid {
            sum,
            tolerance: ALLOCATION_SUM_TOLERANCE,
        });
    }
    Ok(())
}

/// Capped linear discount for holding several strategies: 0.05 per extra
/// strategy, at most 0.2.
pub fn diversification_benefit(num_strategies: usize) -> f64 {
    (num_strategies.saturating_sub(1) as f64 * DIVERSIFICATION_STEP).min(MAX_DIVERSIFICATION_BENEFIT)
}

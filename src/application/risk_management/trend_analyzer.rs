use crate::domain::errors::RiskEngineError;
use crate::domain::risk::trend::{RiskObservation, RiskTrend, TrendDirection};
use statrs::statistics::Statistics;

/// End-to-start moves smaller than this are noise.
pub const STABLE_BAND: f64 = 0.005;

/// Summarizes a strategy's score history. Observations may arrive in any
/// order; they are sorted by timestamp first.
pub fn analyze_trend(
    identifier: &str,
    history: &[RiskObservation],
) -> Result<RiskTrend, RiskEngineError> {
    let mut sorted = history.to_vec();
    sorted.sort_by_key(|o| o.timestamp);

    let (first, last) = match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(RiskEngineError::EmptyHistory {
                identifier: identifier.to_string(),
            });
        }
    };

    let scores: Vec<f64> = sorted.iter().map(|o| o.risk_score).collect();
    let average_risk = scores.iter().mean();
    let risk_volatility = if scores.len() > 1 {
        scores.iter().population_std_dev()
    } else {
        0.0
    };

    let delta = last.risk_score - first.risk_score;
    let trend_direction = if delta > STABLE_BAND {
        TrendDirection::Increasing
    } else if delta < -STABLE_BAND {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    Ok(RiskTrend {
        identifier: identifier.to_string(),
        period_days: (last.timestamp - first.timestamp).num_days(),
        observations: sorted.len(),
        current_risk: last.risk_score,
        average_risk,
        risk_volatility,
        trend_direction,
        trend_magnitude: delta.abs(),
    })
}

use crate::domain::ml::feature_registry::FeatureVector;
use serde::{Deserialize, Serialize};

const LIQUIDITY_DEPTH_REFERENCE: f64 = 1_000_000.0;
const DAYS_PER_MONTH: f64 = 30.0;

/// Per-dimension decomposition of a strategy's risk.
///
/// Each factor is a fixed linear combination of features; the weights are part
/// of the engine's contract and must not be retuned without labeled data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub smart_contract_risk: f64,
    pub liquidity_risk: f64,
    pub market_risk: f64,
    pub operational_risk: f64,
    pub technical_risk: f64,
    pub composability_risk: f64,
}

impl RiskFactors {
    pub fn from_features(f: &FeatureVector) -> Self {
        let slippage_pressure = (f.slippage() * 20.0).min(1.0);
        let depth_coverage = (f.liquidity_depth() / LIQUIDITY_DEPTH_REFERENCE).min(1.0);
        let youth = (1.0 / (f.age_days() / DAYS_PER_MONTH).max(1.0)).min(1.0);

        Self {
            smart_contract_risk: clamp_unit(
                0.7 * f.smart_contract_complexity() + 0.3 * (1.0 - f.audit_score()),
            ),
            liquidity_risk: clamp_unit(0.6 * slippage_pressure + 0.4 * (1.0 - depth_coverage)),
            market_risk: clamp_unit(0.5 * f.volatility() + 0.5 * f.impermanent_loss_risk()),
            operational_risk: clamp_unit(
                0.5 * (1.0 - f.governance_score()) + 0.5 * (1.0 - f.team_score()),
            ),
            technical_risk: clamp_unit(0.6 * f.smart_contract_complexity() + 0.4 * youth),
            composability_risk: clamp_unit(
                0.4 * f.smart_contract_complexity() + 0.3 * f.volatility() + 3.0 * f.slippage(),
            ),
        }
    }

    /// Every factor at the same value; used by fallback assessments.
    pub fn uniform(value: f64) -> Self {
        Self {
            smart_contract_risk: value,
            liquidity_risk: value,
            market_risk: value,
            operational_risk: value,
            technical_risk: value,
            composability_risk: value,
        }
    }
}

// Validated features keep every combination inside [0, 1]; this only absorbs
// float rounding at the edges.
fn clamp_unit(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lending_features() -> FeatureVector {
        FeatureVector::from_values(&[
            1_000_000.0,
            5.5,
            100_000.0,
            500_000.0,
            180.0,
            0.85,
            0.75,
            0.8,
            0.15,
            0.005,
            0.1,
            0.4,
        ])
        .unwrap()
    }

    #[test]
    fn test_factor_formulas() {
        let f = RiskFactors::from_features(&lending_features());

        assert!((f.smart_contract_risk - (0.28 + 0.045)).abs() < 1e-9);
        // slippage 0.005 * 20 = 0.1 ; depth 0.5
        assert!((f.liquidity_risk - (0.06 + 0.2)).abs() < 1e-9);
        assert!((f.market_risk - 0.125).abs() < 1e-9);
        assert!((f.operational_risk - (0.125 + 0.1)).abs() < 1e-9);
        // age 180d => 1 / 6
        assert!((f.technical_risk - (0.24 + 0.4 / 6.0)).abs() < 1e-9);
        assert!((f.composability_risk - (0.16 + 0.045 + 0.015)).abs() < 1e-9);
    }

    #[test]
    fn test_young_strategy_maxes_age_component() {
        let fv = lending_features()
            .with("age_days", 10.0)
            .and_then(|fv| fv.with("smart_contract_complexity", 0.0))
            .unwrap();
        let f = RiskFactors::from_features(&fv);
        assert!((f.technical_risk - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_uniform() {
        let f = RiskFactors::uniform(0.5);
        assert_eq!(f.market_risk, 0.5);
        assert_eq!(f.composability_risk, 0.5);
    }
}

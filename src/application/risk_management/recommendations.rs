//! Rule cascades that turn scores into actionable advice.
//!
//! Rules run in a fixed order (severity band, then individual factors, then
//! strategy-type specifics) and the list is cut to the first
//! `MAX_RECOMMENDATIONS` entries, so the most severe advice always survives.

use crate::domain::risk::assessment::MAX_RECOMMENDATIONS;
use crate::domain::risk::portfolio::StrategyAllocation;
use crate::domain::risk::risk_factors::RiskFactors;
use crate::domain::risk::risk_level::RiskLevel;
use crate::domain::strategy::StrategyType;

pub const ANOMALY_RECOMMENDATION: &str = "ANOMALY DETECTED: Strategy exhibits unusual risk patterns";

const HIGH_LIQUIDITY_RISK: f64 = 0.7;
const HIGH_SMART_CONTRACT_RISK: f64 = 0.6;
const HIGH_MARKET_RISK: f64 = 0.7;
const HIGH_OPERATIONAL_RISK: f64 = 0.6;
const DEX_MARKET_RISK: f64 = 0.5;
const LENDING_LIQUIDITY_RISK: f64 = 0.5;

const HIGH_RISK_STRATEGY: f64 = 0.7;
const MAX_HIGH_RISK_SHARE: f64 = 0.3;
const MIN_DIVERSIFIED_STRATEGIES: usize = 3;

pub fn strategy_recommendations(
    level: RiskLevel,
    factors: &RiskFactors,
    kind: StrategyType,
) -> Vec<String> {
    let mut recs: Vec<&str> = match level {
        RiskLevel::Critical => vec![
            "CRITICAL: Emergency review required - consider immediate exit",
            "Reduce allocation to this strategy to minimal amounts",
        ],
        RiskLevel::High => vec![
            "HIGH RISK: Limit allocation to maximum 20% of portfolio",
            "Increase monitoring frequency to daily checks",
        ],
        RiskLevel::Medium => vec![
            "MEDIUM RISK: Limit allocation to maximum 40% of portfolio",
            "Monitor weekly for risk changes",
        ],
        RiskLevel::Low => vec![
            "LOW RISK: Strategy suitable for higher allocations",
            "Continue normal monitoring schedule",
        ],
    };

    if factors.liquidity_risk > HIGH_LIQUIDITY_RISK {
        recs.push("High liquidity risk detected - avoid large position sizes");
    }
    if factors.smart_contract_risk > HIGH_SMART_CONTRACT_RISK {
        recs.push("Smart contract risk elevated - verify latest audit reports");
    }
    if factors.market_risk > HIGH_MARKET_RISK {
        recs.push("High market risk - consider hedging positions");
    }
    if factors.operational_risk > HIGH_OPERATIONAL_RISK {
        recs.push("Operational concerns - review team and governance structures");
    }

    if kind == StrategyType::Dex && factors.market_risk > DEX_MARKET_RISK {
        recs.push("DEX strategy with high market risk - monitor impermanent loss closely");
    }
    if kind == StrategyType::Lending && factors.liquidity_risk > LENDING_LIQUIDITY_RISK {
        recs.push("Lending strategy with liquidity concerns - check utilization rates");
    }

    recs.truncate(MAX_RECOMMENDATIONS);
    recs.into_iter().map(String::from).collect()
}

/// Puts the anomaly warning first, keeping the list within the cap.
pub fn prepend_anomaly(recommendations: &mut Vec<String>) {
    recommendations.insert(0, ANOMALY_RECOMMENDATION.to_string());
    recommendations.truncate(MAX_RECOMMENDATIONS);
}

pub fn portfolio_recommendations(level: RiskLevel, strategies: &[StrategyAllocation]) -> Vec<String> {
    let mut recs = vec![
        match level {
            RiskLevel::Critical => {
                "CRITICAL: Portfolio risk extremely high - immediate rebalancing required"
            }
            RiskLevel::High => "HIGH: Portfolio risk elevated - consider reducing high-risk allocations",
            RiskLevel::Medium => "MEDIUM: Portfolio risk acceptable but monitor closely",
            RiskLevel::Low => "LOW: Portfolio risk well-managed",
        }
        .to_string(),
    ];

    let high_risk_share: f64 = strategies
        .iter()
        .filter(|s| s.risk_score > HIGH_RISK_STRATEGY)
        .map(|s| s.allocation)
        .sum();
    if high_risk_share > MAX_HIGH_RISK_SHARE {
        recs.push(format!(
            "Concentration risk: {:.1}% in high-risk strategies",
            high_risk_share * 100.0
        ));
    }

    if strategies.len() < MIN_DIVERSIFIED_STRATEGIES {
        recs.push("Consider adding more strategies for better diversification".to_string());
    }

    recs
}

//! Portfolio Risk Aggregator
//!
//! Combines per-strategy scores into one allocation-weighted portfolio risk
//! with a capped diversification discount.

use super::assessment_service::RiskAssessmentService;
use super::recommendations::portfolio_recommendations;
use crate::domain::errors::RiskEngineError;
use crate::domain::risk::portfolio::{
    PortfolioAssessment, StrategyAllocation, diversification_benefit, validate_allocations,
};
use crate::domain::risk::risk_level::RiskLevel;
use chrono::Utc;
use tracing::info;

pub struct PortfolioRiskAggregator;

impl PortfolioRiskAggregator {
    /// Scores every strategy against one model snapshot and aggregates.
    ///
    /// Allocation length/sum problems are returned as errors before any
    /// scoring happens; they are never renormalized.
    pub fn assess_portfolio(
        service: &RiskAssessmentService,
        identifiers: &[String],
        allocations: &[f64],
    ) -> Result<PortfolioAssessment, RiskEngineError> {
        validate_allocations(identifiers.len(), allocations)?;

        let model = service.snapshot();
        let strategies = identifiers
            .iter()
            .zip(allocations)
            .map(|(identifier, &allocation)| {
                let assessment = service.detailed_assessment_with(model.as_ref(), identifier);
                StrategyAllocation {
                    identifier: identifier.clone(),
                    allocation,
                    risk_score: assessment.risk_score,
                    risk_level: assessment.risk_level,
                    confidence: assessment.confidence,
                }
            })
            .collect();

        let portfolio = Self::aggregate(strategies)?;
        if let Some(metrics) = service.metrics() {
            metrics.portfolio_risk_current.set(portfolio.portfolio_risk_score);
        }
        info!(
            "Portfolio of {} strategies: risk {:.3} ({})",
            portfolio.num_strategies, portfolio.portfolio_risk_score, portfolio.portfolio_risk_level
        );
        Ok(portfolio)
    }

    /// Aggregates already-scored strategies.
    pub fn aggregate(
        strategies: Vec<StrategyAllocation>,
    ) -> Result<PortfolioAssessment, RiskEngineError> {
        let allocations: Vec<f64> = strategies.iter().map(|s| s.allocation).collect();
        validate_allocations(strategies.len(), &allocations)?;

        let raw_risk_score: f64 = strategies
            .iter()
            .map(|s| s.risk_score * s.allocation)
            .sum();
        let num_strategies = strategies.len();
        let benefit = diversification_benefit(num_strategies);
        let portfolio_risk_score = (raw_risk_score - benefit).max(0.0);
        let portfolio_risk_level = RiskLevel::from_score(portfolio_risk_score);
        let recommendations = portfolio_recommendations(portfolio_risk_level, &strategies);

        Ok(PortfolioAssessment {
            strategy_assessments: strategies,
            raw_risk_score,
            portfolio_risk_score,
            portfolio_risk_level,
            diversification_benefit: benefit,
            num_strategies,
            recommendations,
            timestamp: Utc::now(),
        })
    }
}

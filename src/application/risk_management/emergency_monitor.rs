//! Emergency scan over every strategy a vault deploys into.

use super::assessment_service::RiskAssessmentService;
use crate::domain::risk::emergency::{
    EmergencyAction, EmergencyReport, MONITOR_ABOVE, StrategyAtRisk, VaultStatus,
};
use chrono::Utc;
use tracing::{info, warn};

pub const REVIEW_ACTION: &str = "Review high-risk strategies";
pub const EXIT_ACTION: &str = "URGENT: Emergency exit from high-risk strategies";
pub const MARKET_STRESS_ACTION: &str = "Market stress detected - reduce risk exposure";

pub struct EmergencyMonitor {
    emergency_threshold: f64,
}

impl EmergencyMonitor {
    pub fn new(emergency_threshold: f64) -> Self {
        Self {
            emergency_threshold,
        }
    }

    pub fn emergency_threshold(&self) -> f64 {
        self.emergency_threshold
    }

    /// Scores every strategy against one model snapshot and builds the report.
    pub fn scan(
        &self,
        service: &RiskAssessmentService,
        identifiers: &[String],
        market_stress: bool,
    ) -> EmergencyReport {
        let model = service.snapshot();
        let scores: Vec<(String, f64)> = identifiers
            .iter()
            .map(|id| (id.clone(), service.quick_score_with(model.as_ref(), id)))
            .collect();
        self.evaluate(scores, market_stress)
    }

    /// Builds the report from scores already computed.
    pub fn evaluate(&self, risk_scores: Vec<(String, f64)>, market_stress: bool) -> EmergencyReport {
        let strategies_at_risk: Vec<StrategyAtRisk> = risk_scores
            .iter()
            .filter_map(|(id, score)| {
                let action = if *score > self.emergency_threshold {
                    EmergencyAction::EmergencyExit
                } else if *score > MONITOR_ABOVE {
                    EmergencyAction::Monitor
                } else {
                    return None;
                };
                Some(StrategyAtRisk {
                    identifier: id.clone(),
                    risk_score: *score,
                    action,
                })
            })
            .collect();

        let mut recommended_actions = Vec::new();
        if !strategies_at_risk.is_empty() {
            recommended_actions.push(REVIEW_ACTION.to_string());
            if strategies_at_risk
                .iter()
                .any(|s| s.action == EmergencyAction::EmergencyExit)
            {
                recommended_actions.push(EXIT_ACTION.to_string());
            }
        }
        if market_stress {
            recommended_actions.push(MARKET_STRESS_ACTION.to_string());
        }

        let overall_status = if !strategies_at_risk.is_empty() {
            VaultStatus::AttentionRequired
        } else if market_stress {
            VaultStatus::Monitor
        } else {
            VaultStatus::Normal
        };

        match overall_status {
            VaultStatus::AttentionRequired => warn!(
                "Emergency scan: {} of {} strategies at risk",
                strategies_at_risk.len(),
                risk_scores.len()
            ),
            _ => info!(
                "Emergency scan of {} strategies: {:?}",
                risk_scores.len(),
                overall_status
            ),
        }

        EmergencyReport {
            strategies_at_risk,
            risk_scores,
            market_stress,
            recommended_actions,
            overall_status,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[f64]) -> Vec<(String, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &s)| (format!("s{}", i), s))
            .collect()
    }

    #[test]
    fn test_calm_vault_is_normal() {
        let report = EmergencyMonitor::new(0.8).evaluate(scores(&[0.2, 0.6]), false);
        assert_eq!(report.overall_status, VaultStatus::Normal);
        assert!(report.strategies_at_risk.is_empty());
        assert!(report.recommended_actions.is_empty());
    }

    #[test]
    fn test_exit_and_monitor_classification() {
        let report = EmergencyMonitor::new(0.8).evaluate(scores(&[0.85, 0.65, 0.8]), false);

        assert_eq!(report.overall_status, VaultStatus::AttentionRequired);
        assert_eq!(report.strategies_at_risk.len(), 3);
        assert_eq!(report.strategies_at_risk[0].action, EmergencyAction::EmergencyExit);
        assert_eq!(report.strategies_at_risk[1].action, EmergencyAction::Monitor);
        // 0.8 is not above the threshold
        assert_eq!(report.strategies_at_risk[2].action, EmergencyAction::Monitor);
        assert_eq!(report.recommended_actions, vec![REVIEW_ACTION, EXIT_ACTION]);
    }

    #[test]
    fn test_market_stress_alone_means_monitor() {
        let report = EmergencyMonitor::new(0.8).evaluate(scores(&[0.1]), true);
        assert_eq!(report.overall_status, VaultStatus::Monitor);
        assert_eq!(report.recommended_actions, vec![MARKET_STRESS_ACTION]);
    }

    #[test]
    fn test_custom_threshold() {
        let report = EmergencyMonitor::new(0.7).evaluate(scores(&[0.75]), false);
        assert_eq!(report.strategies_at_risk[0].action, EmergencyAction::EmergencyExit);
    }
}

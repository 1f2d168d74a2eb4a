//! Allocation Policy
//!
//! Turns per-strategy risk scores into target portfolio weights (percent).
//! Order of operations: score, regime tilt, normalize to 100, then cap and
//! redistribute the excess.

use crate::domain::risk::allocation::{
    AllocationDecision, AllocationPlan, DEFAULT_HIGH_VOLATILITY_THRESHOLD,
    DEFAULT_REBALANCE_THRESHOLD_PCT, MarketRegime,
};
use crate::domain::strategy::classify_type;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

const FULL_ALLOCATION_PCT: f64 = 100.0;
const CAP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPolicy {
    pub rebalance_threshold_pct: f64,
    pub high_volatility_threshold: f64,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            rebalance_threshold_pct: DEFAULT_REBALANCE_THRESHOLD_PCT,
            high_volatility_threshold: DEFAULT_HIGH_VOLATILITY_THRESHOLD,
        }
    }
}

impl AllocationPolicy {
    pub fn new(rebalance_threshold_pct: f64, high_volatility_threshold: f64) -> Self {
        Self {
            rebalance_threshold_pct,
            high_volatility_threshold,
        }
    }

    pub fn regime(&self, market_volatility: f64) -> MarketRegime {
        // Unknown volatility is treated as the worst case.
        let volatility = if market_volatility.is_nan() {
            1.0
        } else {
            market_volatility
        };
        MarketRegime::from_volatility(volatility, self.high_volatility_threshold)
    }

    /// Optimal percentage per strategy. Empty input yields an empty map; any
    /// non-empty result sums to 100.
    pub fn recommend_allocation(
        &self,
        risk_scores: &BTreeMap<String, f64>,
        market_volatility: f64,
        max_per_strategy_pct: f64,
    ) -> BTreeMap<String, f64> {
        if risk_scores.is_empty() {
            return BTreeMap::new();
        }
        let stressed = self.regime(market_volatility).is_stressed();

        let weights: Vec<(String, f64)> = risk_scores
            .iter()
            .map(|(name, &risk)| {
                let risk = if risk.is_nan() { 1.0 } else { risk.clamp(0.0, 1.0) };
                let multiplier = classify_type(name).regime_multiplier(stressed);
                (name.clone(), (1.0 - risk) * multiplier)
            })
            .collect();

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        let n = weights.len() as f64;
        let mut allocation: Vec<(String, f64)> = if total > 0.0 {
            weights
                .iter()
                .map(|(name, w)| (name.clone(), w / total * FULL_ALLOCATION_PCT))
                .collect()
        } else {
            weights
                .iter()
                .map(|(name, _)| (name.clone(), FULL_ALLOCATION_PCT / n))
                .collect()
        };

        let cap = effective_cap(max_per_strategy_pct, allocation.len());
        apply_cap(&mut allocation, cap);

        debug!(
            "Allocation over {} strategies (stressed: {}, cap {:.2}%)",
            allocation.len(),
            stressed,
            cap
        );
        allocation.into_iter().collect()
    }

    /// Compares optimal weights with the current ones and flags material drift.
    ///
    /// Strategies held today but absent from `risk_scores` get an optimal
    /// weight of 0.
    pub fn plan_rebalance(
        &self,
        risk_scores: &BTreeMap<String, f64>,
        current_pcts: &BTreeMap<String, f64>,
        market_volatility: f64,
        max_per_strategy_pct: f64,
    ) -> AllocationPlan {
        let optimal = self.recommend_allocation(risk_scores, market_volatility, max_per_strategy_pct);
        let names: BTreeSet<&String> = optimal.keys().chain(current_pcts.keys()).collect();

        let decisions: Vec<AllocationDecision> = names
            .into_iter()
            .map(|name| {
                let current = current_pcts.get(name).copied().unwrap_or(0.0);
                let target = optimal.get(name).copied().unwrap_or(0.0);
                AllocationDecision::new(name.clone(), current, target, self.rebalance_threshold_pct)
            })
            .collect();
        let rebalancing_needed = decisions
            .iter()
            .any(|d| d.exceeds(self.rebalance_threshold_pct));

        if rebalancing_needed {
            info!(
                "Rebalancing needed: {} of {} strategies drifted beyond {:.1}%",
                decisions
                    .iter()
                    .filter(|d| d.exceeds(self.rebalance_threshold_pct))
                    .count(),
                decisions.len(),
                self.rebalance_threshold_pct
            );
        }

        AllocationPlan {
            decisions,
            rebalancing_needed,
            market_regime: self.regime(market_volatility),
            timestamp: Utc::now(),
        }
    }
}

/// The cap actually enforced: invalid caps mean "no cap", and a cap too small
/// for the strategy count to reach 100% is raised to an equal share.
fn effective_cap(requested_pct: f64, strategies: usize) -> f64 {
    let cap = if requested_pct.is_finite() && requested_pct > 0.0 {
        requested_pct.min(FULL_ALLOCATION_PCT)
    } else {
        FULL_ALLOCATION_PCT
    };
    let floor = FULL_ALLOCATION_PCT / strategies.max(1) as f64;
    cap.max(floor)
}

/// Clamps over-cap strategies and spreads the excess over the rest in
/// proportion to their first-pass weights, repeating until nothing exceeds
/// the cap.
fn apply_cap(allocation: &mut [(String, f64)], cap: f64) {
    let base: Vec<f64> = allocation.iter().map(|(_, pct)| *pct).collect();
    let mut capped = vec![false; allocation.len()];

    loop {
        let newly_capped: Vec<usize> = allocation
            .iter()
            .enumerate()
            .filter(|(i, (_, pct))| !capped[*i] && *pct > cap + CAP_EPSILON)
            .map(|(i, _)| i)
            .collect();
        if newly_capped.is_empty() {
            break;
        }
        for i in newly_capped {
            capped[i] = true;
            allocation[i].1 = cap;
        }

        let free: Vec<usize> = (0..allocation.len()).filter(|&i| !capped[i]).collect();
        if free.is_empty() {
            break;
        }
        let remaining = FULL_ALLOCATION_PCT - cap * (allocation.len() - free.len()) as f64;
        let free_weight: f64 = free.iter().map(|&i| base[i]).sum();
        for &i in &free {
            allocation[i].1 = if free_weight > 0.0 {
                remaining * base[i] / free_weight
            } else {
                remaining / free.len() as f64
            };
        }
    }
}

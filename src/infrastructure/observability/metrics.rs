//! Prometheus metrics definitions for the risk engine
//!
//! All metrics use the `vaultrisk_` prefix and are read-only.

use prometheus::{
    CounterVec, Gauge, HistogramOpts, HistogramVec, IntCounter, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the risk engine
#[derive(Clone)]
pub struct RiskMetrics {
    registry: Arc<Registry>,
    /// Assessments by path (quick/detailed) and outcome (ok/fallback)
    pub assessments_total: CounterVec,
    /// Strategies flagged by the anomaly detector
    pub anomalies_total: IntCounter,
    /// Distribution of produced risk scores by path
    pub risk_score: HistogramVec,
    /// Model replacements since start
    pub model_swaps_total: IntCounter,
    /// Risk score of the last assessed portfolio (0-1)
    pub portfolio_risk_current: GenericGauge<AtomicF64>,
}

impl RiskMetrics {
    /// Create a new RiskMetrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let assessments_total = CounterVec::new(
            Opts::new(
                "vaultrisk_assessments_total",
                "Risk assessments by path and outcome",
            ),
            &["path", "outcome"],
        )?;
        registry.register(Box::new(assessments_total.clone()))?;

        let anomalies_total = IntCounter::with_opts(Opts::new(
            "vaultrisk_anomalies_total",
            "Strategies flagged as anomalous",
        ))?;
        registry.register(Box::new(anomalies_total.clone()))?;

        let risk_score = HistogramVec::new(
            HistogramOpts::new("vaultrisk_risk_score", "Produced risk scores (0-1)")
                .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]),
            &["path"],
        )?;
        registry.register(Box::new(risk_score.clone()))?;

        let model_swaps_total = IntCounter::with_opts(Opts::new(
            "vaultrisk_model_swaps_total",
            "Risk model replacements",
        ))?;
        registry.register(Box::new(model_swaps_total.clone()))?;

        let portfolio_risk_current = Gauge::with_opts(Opts::new(
            "vaultrisk_portfolio_risk_current",
            "Risk score of the last assessed portfolio (0-1)",
        ))?;
        registry.register(Box::new(portfolio_risk_current.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            assessments_total,
            anomalies_total,
            risk_score,
            model_swaps_total,
            portfolio_risk_current,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    /// Count one assessment and record its score
    pub fn record_assessment(&self, path: &str, score: f64, fallback: bool) {
        let outcome = if fallback { "fallback" } else { "ok" };
        self.assessments_total
            .with_label_values(&[path, outcome])
            .inc();
        self.risk_score.with_label_values(&[path]).observe(score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = RiskMetrics::new().expect("Failed to create metrics");
        metrics.anomalies_total.inc();
        assert!(metrics.render().contains("vaultrisk_"));
    }

    #[test]
    fn test_record_assessment() {
        let metrics = RiskMetrics::new().expect("Failed to create metrics");
        metrics.record_assessment("quick", 0.42, false);
        metrics.record_assessment("detailed", 0.5, true);
        let output = metrics.render();
        assert!(output.contains("vaultrisk_assessments_total"));
        assert!(output.contains("fallback"));
        assert!(output.contains("vaultrisk_risk_score_bucket"));
    }

    #[test]
    fn test_portfolio_gauge() {
        let metrics = RiskMetrics::new().expect("Failed to create metrics");
        metrics.portfolio_risk_current.set(0.45);
        assert!(metrics.render().contains("vaultrisk_portfolio_risk_current 0.45"));
    }
}

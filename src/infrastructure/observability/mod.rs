//! Push-based observability for the risk engine
//!
//! Metrics are only exposed as rendered Prometheus text (the CLI can print it
//! or a caller can push it to a gateway); nothing here listens for requests.

pub mod metrics;

pub use metrics::RiskMetrics;

// Risk scoring, aggregation and allocation services
pub mod allocation_policy;
pub mod assessment_service;
pub mod emergency_monitor;
pub mod portfolio_aggregator;
pub mod recommendations;
pub mod trend_analyzer;

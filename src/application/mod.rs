// Start-up wiring (model load or training)
pub mod bootstrap;

// Facade used by the CLI and agent tools
pub mod engine;

// Feature sources
pub mod feature_extraction;

// Model training and inference
pub mod ml;

// Scoring, aggregation and allocation
pub mod risk_management;

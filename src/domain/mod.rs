// Feature registry shared by training and inference
pub mod ml;

// Port interfaces
pub mod ports;

// Risk scores, levels, assessments and allocation decisions
pub mod risk;

// Strategy classification
pub mod strategy;

// Domain-specific error types
pub mod errors;

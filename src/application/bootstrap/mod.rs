// Process start-up wiring
pub mod model;

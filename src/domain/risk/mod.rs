// Risk engine domain
pub mod allocation;
pub mod assessment;
pub mod emergency;
pub mod portfolio;
pub mod risk_factors;
pub mod risk_level;
pub mod trend;

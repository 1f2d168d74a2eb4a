pub mod isolation_forest;
pub mod model_handle;
pub mod scaler;
pub mod smartcore_predictor;
pub mod synthetic;

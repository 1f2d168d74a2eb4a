use crate::application::ml::smartcore_predictor::{RiskModel, TrainingConfig};
use crate::config::ModelEnvConfig;
use crate::domain::ports::{RiskPredictor, UnfittedModel};
use crate::infrastructure::persistence::model_store::ModelStore;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct ModelBootstrap;

impl ModelBootstrap {
    /// Loads the persisted model, falling back to synthetic training.
    ///
    /// Never fails: if training also fails the returned predictor refuses
    /// every call, which the assessment service turns into fallbacks.
    pub fn init(config: &ModelEnvConfig) -> Arc<dyn RiskPredictor> {
        let store = ModelStore::new(&config.model_path);
        match store.load() {
            Ok(model) => return Arc::new(model),
            Err(e) => warn!(
                "Could not load risk model from {:?}: {}. Training on synthetic data",
                store.path(),
                e
            ),
        }

        match Self::train(&config.training_config()) {
            Some(model) => {
                if config.persist {
                    if let Err(e) = store.save(&model) {
                        warn!("Trained model not persisted: {}", e);
                    }
                }
                Arc::new(model)
            }
            None => Arc::new(UnfittedModel),
        }
    }

    pub fn train(training: &TrainingConfig) -> Option<RiskModel> {
        match RiskModel::train_synthetic(training) {
            Ok(model) => {
                if let Some(summary) = model.training_summary() {
                    info!(
                        "Synthetic risk model trained: RMSE {:.4}, MAE {:.4}, R2 {:.4}",
                        summary.rmse, summary.mae, summary.r2
                    );
                }
                Some(model)
            }
            Err(e) => {
                error!("Risk model training failed, serving fallbacks only: {}", e);
                None
            }
        }
    }
}

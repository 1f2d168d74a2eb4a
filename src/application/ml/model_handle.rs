use crate::domain::ports::RiskPredictor;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Shared, swappable reference to the live risk model.
///
/// Readers take a snapshot (`Arc` clone) and run a whole request against it;
/// a swap replaces the reference and never touches the model being read.
pub struct ModelHandle {
    inner: RwLock<Arc<dyn RiskPredictor>>,
}

impl ModelHandle {
    pub fn new(model: Arc<dyn RiskPredictor>) -> Self {
        Self {
            inner: RwLock::new(model),
        }
    }

    pub fn snapshot(&self) -> Arc<dyn RiskPredictor> {
        // A poisoned lock still holds a complete Arc; the guard is only ever
        // used for a pointer clone or replacement.
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Installs `model` and returns the one it replaced.
    pub fn swap(&self, model: Arc<dyn RiskPredictor>) -> Arc<dyn RiskPredictor> {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        info!(
            "Swapping risk model {} {} -> {} {}",
            guard.name(),
            guard.version(),
            model.name(),
            model.version()
        );
        std::mem::replace(&mut *guard, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::RiskEngineError;
    use crate::domain::ml::feature_registry::FeatureVector;
    use crate::domain::ports::UnfittedModel;

    struct ConstantModel(f64);

    impl RiskPredictor for ConstantModel {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, RiskEngineError> {
            Ok(self.0)
        }
        fn name(&self) -> &str {
            "Constant"
        }
        fn version(&self) -> &str {
            "test"
        }
    }

    #[test]
    fn test_snapshot_survives_swap() {
        let handle = ModelHandle::new(Arc::new(UnfittedModel));
        let before = handle.snapshot();

        let old = handle.swap(Arc::new(ConstantModel(0.25)));
        assert_eq!(old.name(), "Unfitted");
        assert_eq!(before.name(), "Unfitted");
        assert_eq!(handle.snapshot().name(), "Constant");
    }
}

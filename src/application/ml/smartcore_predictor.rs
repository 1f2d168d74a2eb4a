use super::isolation_forest::{IsolationForest, IsolationForestParameters};
use super::scaler::StandardScaler;
use super::synthetic::{self, LabeledDataset};
use crate::domain::errors::RiskEngineError;
use crate::domain::ml::feature_registry::{FeatureVector, canonical_columns};
use crate::domain::ports::{ModelInference, RiskPredictor};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use statrs::statistics::Statistics;
use tracing::info;

/// Artifact format version. Loaders accept any `1.x`.
pub const MODEL_FORMAT_VERSION: &str = "1.0";
pub const MODEL_FORMAT_MAJOR: u32 = 1;

const MAX_CONFIDENCE_PENALTY: f64 = 0.4;
const ANOMALY_CONFIDENCE_FACTOR: f64 = 0.8;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub samples: usize,
    pub n_trees: usize,
    pub max_depth: u16,
    pub test_fraction: f64,
    pub seed: u64,
    pub anomaly_trees: usize,
    pub contamination: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples: synthetic::DEFAULT_SAMPLES,
            n_trees: 100,
            max_depth: 10,
            test_fraction: 0.2,
            seed: 42,
            anomaly_trees: 100,
            contamination: 0.1,
        }
    }
}

/// Where the training labels came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelOrigin {
    Synthetic,
    Labeled,
}

/// Hold-out metrics recorded at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub train_samples: usize,
    pub test_samples: usize,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

/// Random forest risk regressor with its scaler and anomaly detector.
///
/// Serialized as a whole, this struct is the persisted model artifact.
#[derive(Serialize, Deserialize)]
pub struct RiskModel {
    version: String,
    model_version: String,
    origin: ModelOrigin,
    created_at: DateTime<Utc>,
    feature_columns: Vec<String>,
    scaler: StandardScaler,
    regressor: Forest,
    anomaly_detector: Option<IsolationForest>,
    training_summary: Option<TrainingSummary>,
}

impl RiskModel {
    /// Fits the model on freshly generated synthetic data.
    pub fn train_synthetic(config: &TrainingConfig) -> Result<Self, RiskEngineError> {
        let dataset = synthetic::generate(config.samples, config.seed)?;
        Self::train(&dataset, config, ModelOrigin::Synthetic)
    }

    /// Shuffled train/test split, scaler fitted on the training part only,
    /// then regressor and anomaly detector on the scaled training features.
    pub fn train(
        dataset: &LabeledDataset,
        config: &TrainingConfig,
        origin: ModelOrigin,
    ) -> Result<Self, RiskEngineError> {
        if dataset.features.len() != dataset.targets.len() {
            return Err(RiskEngineError::Training {
                reason: format!(
                    "{} feature rows but {} targets",
                    dataset.features.len(),
                    dataset.targets.len()
                ),
            });
        }
        let n = dataset.len();
        if n < 10 {
            return Err(RiskEngineError::Training {
                reason: format!("need at least 10 samples, got {}", n),
            });
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);
        let test_size = ((n as f64) * config.test_fraction.clamp(0.0, 0.5)).ceil() as usize;
        let (test_idx, train_idx) = indices.split_at(test_size);

        let pick = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
            idx.iter()
                .map(|&i| (dataset.features[i].clone(), dataset.targets[i]))
                .unzip()
        };
        let (x_train, y_train) = pick(train_idx);
        let (x_test, y_test) = pick(test_idx);

        let scaler = StandardScaler::fit(&x_train)?;
        let x_train_scaled = scaler.transform(&x_train)?;

        info!(
            "Training Random Forest risk regressor (Trees: {}, Depth: {}, Samples: {})...",
            config.n_trees,
            config.max_depth,
            x_train_scaled.len()
        );
        let x_matrix = DenseMatrix::from_2d_vec(&x_train_scaled).map_err(|e| {
            RiskEngineError::Training {
                reason: format!("Matrix error: {}", e),
            }
        })?;
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(config.n_trees)
            .with_max_depth(config.max_depth)
            .with_seed(config.seed);
        let regressor =
            RandomForestRegressor::fit(&x_matrix, &y_train, params).map_err(|e| {
                RiskEngineError::Training {
                    reason: format!("Training error: {}", e),
                }
            })?;

        let detector_params = IsolationForestParameters::default()
            .with_n_trees(config.anomaly_trees)
            .with_contamination(config.contamination)
            .with_seed(config.seed);
        let anomaly_detector = IsolationForest::fit(&x_train_scaled, &detector_params)?;

        let mut model = Self {
            version: MODEL_FORMAT_VERSION.to_string(),
            model_version: format!(
                "{}-{}",
                MODEL_FORMAT_VERSION,
                match origin {
                    ModelOrigin::Synthetic => "synthetic",
                    ModelOrigin::Labeled => "labeled",
                }
            ),
            origin,
            created_at: Utc::now(),
            feature_columns: canonical_columns(),
            scaler,
            regressor,
            anomaly_detector: Some(anomaly_detector),
            training_summary: None,
        };

        if !x_test.is_empty() {
            let summary = model.evaluate(&x_test, &y_test, x_train.len())?;
            info!(
                "OOS Test (n={}): RMSE={:.6}, MAE={:.6}, R²={:.4}",
                summary.test_samples, summary.rmse, summary.mae, summary.r2
            );
            model.training_summary = Some(summary);
        }

        Ok(model)
    }

    fn evaluate(
        &self,
        x_test: &[Vec<f64>],
        y_test: &[f64],
        train_samples: usize,
    ) -> Result<TrainingSummary, RiskEngineError> {
        let x_scaled = self.scaler.transform(x_test)?;
        let pred = self.predict_scaled_rows(&x_scaled)?;

        let n = pred.len() as f64;
        let sq_err: f64 = pred.iter().zip(y_test).map(|(p, t)| (p - t).powi(2)).sum();
        let mae = pred.iter().zip(y_test).map(|(p, t)| (p - t).abs()).sum::<f64>() / n;
        let var_y = y_test.iter().population_variance();
        let r2 = if var_y > 0.0 {
            1.0 - (sq_err / n) / var_y
        } else {
            0.0
        };

        Ok(TrainingSummary {
            train_samples,
            test_samples: pred.len(),
            rmse: (sq_err / n).sqrt(),
            mae,
            r2,
        })
    }

    fn predict_scaled_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, RiskEngineError> {
        let matrix = DenseMatrix::from_2d_vec(&rows.to_vec()).map_err(|e| {
            RiskEngineError::Inference {
                reason: format!("Matrix creation failed: {}", e),
            }
        })?;
        self.regressor
            .predict(&matrix)
            .map_err(|e| RiskEngineError::Inference {
                reason: format!("Prediction failed: {}", e),
            })
    }

    /// Features in this model's column order, standardised.
    ///
    /// Non-finite values are rejected on both sides of the scaler: the forest
    /// routes NaN down a branch and would still return a finite score.
    pub fn scale(&self, features: &FeatureVector) -> Result<Vec<f64>, RiskEngineError> {
        let ordered = features.ordered(&self.feature_columns)?;
        let scaled = self.scaler.transform_row(&ordered)?;
        for ((name, raw), value) in self.feature_columns.iter().zip(&ordered).zip(&scaled) {
            if !value.is_finite() {
                return Err(RiskEngineError::InvalidFeature {
                    name: name.clone(),
                    value: *raw,
                });
            }
        }
        Ok(scaled)
    }

    fn score_scaled(&self, scaled: &[f64]) -> Result<f64, RiskEngineError> {
        let raw = self
            .predict_scaled_rows(&[scaled.to_vec()])?
            .first()
            .copied()
            .ok_or_else(|| RiskEngineError::Inference {
                reason: "No prediction returned".to_string(),
            })?;
        if !raw.is_finite() {
            return Err(RiskEngineError::Inference {
                reason: format!("non-finite prediction {}", raw),
            });
        }
        Ok(raw.clamp(0.0, 1.0))
    }

    pub fn format_version(&self) -> &str {
        &self.version
    }

    pub fn origin(&self) -> ModelOrigin {
        self.origin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn training_summary(&self) -> Option<&TrainingSummary> {
        self.training_summary.as_ref()
    }

    pub fn has_anomaly_detector(&self) -> bool {
        self.anomaly_detector.is_some()
    }
}

/// `1 - min(0.4, var(scaled))`: unusual inputs spread far from the training
/// mean after scaling and get less confidence.
pub fn scaled_confidence(scaled: &[f64]) -> f64 {
    let variance = scaled.iter().population_variance();
    let penalty = if variance.is_finite() {
        variance.min(MAX_CONFIDENCE_PENALTY)
    } else {
        MAX_CONFIDENCE_PENALTY
    };
    1.0 - penalty
}

impl RiskPredictor for RiskModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, RiskEngineError> {
        let scaled = self.scale(features)?;
        self.score_scaled(&scaled)
    }

    fn analyze(&self, features: &FeatureVector) -> Result<ModelInference, RiskEngineError> {
        let scaled = self.scale(features)?;
        let risk_score = self.score_scaled(&scaled)?;
        let mut confidence = scaled_confidence(&scaled);

        let is_anomaly = match &self.anomaly_detector {
            Some(detector) => detector.is_anomaly(&scaled)?,
            None => false,
        };
        if is_anomaly {
            confidence *= ANOMALY_CONFIDENCE_FACTOR;
        }

        Ok(ModelInference {
            risk_score,
            confidence,
            is_anomaly,
        })
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }

    fn version(&self) -> &str {
        &self.model_version
    }
}

//! Persistence for the trained risk model artifact.
//!
//! The artifact is a single JSON document bundling the regressor, scaler,
//! anomaly detector, feature column order, creation timestamp and version.

use crate::application::ml::smartcore_predictor::{MODEL_FORMAT_MAJOR, RiskModel};
use crate::domain::errors::RiskEngineError;
use crate::domain::ml::feature_registry::FEATURE_NAMES;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Handles persistence of the risk model to disk.
pub struct ModelStore {
    file_path: PathBuf,
}

impl ModelStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Loads and validates the artifact.
    ///
    /// Fails when the file is missing or malformed, when its major version
    /// differs from this build's, or when its feature columns do not match the
    /// canonical feature set.
    pub fn load(&self) -> Result<RiskModel, RiskEngineError> {
        if !self.file_path.exists() {
            return Err(RiskEngineError::ModelLoad {
                reason: format!("model file not found at {:?}", self.file_path),
            });
        }

        let content = fs::read_to_string(&self.file_path).map_err(|e| RiskEngineError::ModelLoad {
            reason: format!("failed to read {:?}: {}", self.file_path, e),
        })?;
        let model: RiskModel =
            serde_json::from_str(&content).map_err(|e| RiskEngineError::ModelLoad {
                reason: format!("failed to parse model artifact: {}", e),
            })?;

        check_version(model.format_version())?;
        check_columns(model.feature_columns())?;

        info!(
            "Successfully loaded risk model from {:?} (created {})",
            self.file_path,
            model.created_at()
        );
        Ok(model)
    }

    /// Saves the artifact; writes a temp file then renames it into place.
    pub fn save(&self, model: &RiskModel) -> Result<(), RiskEngineError> {
        let persist_err = |what: &str, e: &dyn std::fmt::Display| RiskEngineError::Persistence {
            reason: format!("{}: {}", what, e),
        };

        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| persist_err("failed to create model directory", &e))?;
        }

        let content = serde_json::to_string(model)
            .map_err(|e| persist_err("failed to serialize model", &e))?;
        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(|e| persist_err("failed to write temp file", &e))?;
        fs::rename(&temp_path, &self.file_path)
            .map_err(|e| persist_err("failed to rename temp file", &e))?;

        info!("Saved risk model to {:?}", self.file_path);
        Ok(())
    }
}

fn check_version(version: &str) -> Result<(), RiskEngineError> {
    let major = version
        .split('.')
        .next()
        .and_then(|m| m.parse::<u32>().ok());
    if major != Some(MODEL_FORMAT_MAJOR) {
        return Err(RiskEngineError::IncompatibleModelVersion {
            found: version.to_string(),
            expected_major: MODEL_FORMAT_MAJOR,
        });
    }
    Ok(())
}

fn check_columns(columns: &[String]) -> Result<(), RiskEngineError> {
    let expected: HashSet<&str> = FEATURE_NAMES.iter().copied().collect();
    let found: HashSet<&str> = columns.iter().map(String::as_str).collect();
    if columns.len() != FEATURE_NAMES.len() || found != expected {
        return Err(RiskEngineError::ModelLoad {
            reason: format!("feature columns {:?} do not match the feature registry", columns),
        });
    }
    Ok(())
}

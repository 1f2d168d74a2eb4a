//! Labeled training data: one row per strategy observation, the twelve
//! canonical feature columns plus a `risk_score` label. Extra columns are
//! ignored.

use crate::application::ml::synthetic::LabeledDataset;
use crate::domain::errors::RiskEngineError;
use crate::domain::ml::feature_registry::FeatureVector;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

pub const LABEL_COLUMN: &str = "risk_score";

pub fn read_labeled_csv(path: &Path) -> Result<LabeledDataset, RiskEngineError> {
    let file = File::open(path).map_err(|e| RiskEngineError::Training {
        reason: format!("cannot open training data {:?}: {}", path, e),
    })?;
    let dataset = parse_labeled(BufReader::new(file))?;
    info!("Loaded {} labeled rows from {:?}", dataset.len(), path);
    Ok(dataset)
}

pub fn parse_labeled<R: Read>(reader: R) -> Result<LabeledDataset, RiskEngineError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut features = Vec::new();
    let mut targets = Vec::new();

    for (row, result) in rdr.deserialize::<HashMap<String, f64>>().enumerate() {
        let record = result.map_err(|e| RiskEngineError::Training {
            reason: format!("row {}: {}", row + 1, e),
        })?;
        let label = record
            .get(LABEL_COLUMN)
            .copied()
            .ok_or_else(|| RiskEngineError::MissingFeature {
                name: LABEL_COLUMN.to_string(),
            })?;
        if !(0.0..=1.0).contains(&label) {
            return Err(RiskEngineError::InvalidFeature {
                name: LABEL_COLUMN.to_string(),
                value: label,
            });
        }
        features.push(FeatureVector::from_named(&record)?.to_vec());
        targets.push(label);
    }

    Ok(LabeledDataset { features, targets })
}

use crate::domain::errors::RiskEngineError;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Per-column standardisation, `(x - mean) / std`, fitted on training data only.
///
/// Uses the population standard deviation; constant columns get a scale of 1
/// so they map to 0 instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, RiskEngineError> {
        let width = rows.first().map(|r| r.len()).ok_or_else(|| RiskEngineError::Training {
            reason: "cannot fit scaler on an empty dataset".to_string(),
        })?;
        if rows.iter().any(|r| r.len() != width) {
            return Err(RiskEngineError::Training {
                reason: "ragged feature matrix".to_string(),
            });
        }

        let mut mean = Vec::with_capacity(width);
        let mut scale = Vec::with_capacity(width);
        for col in 0..width {
            let column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
            let mu = column.iter().mean();
            let sd = column.iter().population_std_dev();
            mean.push(mu);
            scale.push(if sd.is_finite() && sd > f64::EPSILON { sd } else { 1.0 });
        }
        Ok(Self { mean, scale })
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, RiskEngineError> {
        if row.len() != self.width() {
            return Err(RiskEngineError::Inference {
                reason: format!(
                    "scaler expects {} features, got {}",
                    self.width(),
                    row.len()
                ),
            });
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mu, sd))| (x - mu) / sd)
            .collect())
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, RiskEngineError> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_and_transform() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();

        let scaled = scaler.transform(&rows).unwrap();
        assert!((scaled[0][0] + 1.0).abs() < 1e-12);
        assert!((scaled[1][0] - 1.0).abs() < 1e-12);
        // Constant column maps to zero
        assert_eq!(scaled[0][1], 0.0);
    }

    #[test]
    fn test_width_mismatch_is_an_error() {
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0], vec![2.0, 3.0]]).unwrap();
        assert!(scaler.transform_row(&[1.0]).is_err());
    }

    #[test]
    fn test_empty_fit_fails() {
        assert!(StandardScaler::fit(&[]).is_err());
    }
}

//! Isolation forest outlier detector.
//!
//! Points that are isolated by few random splits are anomalous. The detector
//! is fitted on standardised training features and labels a point an outlier
//! when its anomaly score exceeds the `(1 - contamination)` quantile of the
//! training scores.

use crate::domain::errors::RiskEngineError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone)]
pub struct IsolationForestParameters {
    pub n_trees: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl Default for IsolationForestParameters {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_samples: 256,
            contamination: 0.1,
            seed: 42,
        }
    }
}

impl IsolationForestParameters {
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum IsolationNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<IsolationNode>,
        right: Box<IsolationNode>,
    },
    Leaf {
        size: usize,
    },
}

impl IsolationNode {
    fn path_length(&self, x: &[f64], depth: usize) -> f64 {
        match self {
            IsolationNode::Leaf { size } => depth as f64 + average_path_length(*size),
            IsolationNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if x[*feature] < *threshold {
                    left.path_length(x, depth + 1)
                } else {
                    right.path_length(x, depth + 1)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    trees: Vec<IsolationNode>,
    sample_size: usize,
    n_features: usize,
    contamination: f64,
    threshold: f64,
}

impl IsolationForest {
    pub fn fit(rows: &[Vec<f64>], params: &IsolationForestParameters) -> Result<Self, RiskEngineError> {
        let n = rows.len();
        if n < 2 {
            return Err(RiskEngineError::Training {
                reason: format!("isolation forest needs at least 2 samples, got {}", n),
            });
        }
        if params.n_trees == 0 || !(0.0..0.5).contains(&params.contamination) {
            return Err(RiskEngineError::Training {
                reason: format!(
                    "invalid isolation forest parameters: n_trees={}, contamination={}",
                    params.n_trees, params.contamination
                ),
            });
        }
        let n_features = rows[0].len();
        let sample_size = params.max_samples.clamp(2, n);
        let max_depth = (sample_size as f64).log2().ceil() as usize;

        // Each tree owns an RNG derived from its index, so the parallel build
        // is deterministic for a given seed.
        let trees: Vec<IsolationNode> = (0..params.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(i as u64));
                let indices = rand::seq::index::sample(&mut rng, n, sample_size).into_vec();
                build_node(rows, indices, 0, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            n_features,
            contamination: params.contamination,
            threshold: f64::INFINITY,
        };

        let scores: Vec<f64> = rows.iter().map(|r| forest.score_unchecked(r)).collect();
        let mut data = Data::new(scores);
        forest.threshold = data.quantile(1.0 - params.contamination);
        Ok(forest)
    }

    /// Anomaly score in (0, 1]; values near 1 are easy to isolate.
    pub fn score(&self, x: &[f64]) -> Result<f64, RiskEngineError> {
        if x.len() != self.n_features {
            return Err(RiskEngineError::Inference {
                reason: format!(
                    "anomaly detector expects {} features, got {}",
                    self.n_features,
                    x.len()
                ),
            });
        }
        Ok(self.score_unchecked(x))
    }

    pub fn is_anomaly(&self, x: &[f64]) -> Result<bool, RiskEngineError> {
        Ok(self.score(x)? > self.threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn contamination(&self) -> f64 {
        self.contamination
    }

    fn score_unchecked(&self, x: &[f64]) -> f64 {
        let mean_path = self
            .trees
            .iter()
            .map(|t| t.path_length(x, 0))
            .sum::<f64>()
            / self.trees.len() as f64;
        2f64.powf(-mean_path / average_path_length(self.sample_size))
    }
}

fn build_node(
    rows: &[Vec<f64>],
    indices: Vec<usize>,
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> IsolationNode {
    if depth >= max_depth || indices.len() <= 1 {
        return IsolationNode::Leaf {
            size: indices.len(),
        };
    }

    // Only features that still vary inside this node can split it.
    let candidates: Vec<(usize, f64, f64)> = (0..rows[indices[0]].len())
        .filter_map(|f| {
            let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(rows[i][f]), hi.max(rows[i][f]))
            });
            (hi > lo).then_some((f, lo, hi))
        })
        .collect();
    if candidates.is_empty() {
        return IsolationNode::Leaf {
            size: indices.len(),
        };
    }

    let (feature, lo, hi) = candidates[rng.random_range(0..candidates.len())];
    let threshold = rng.random_range(lo..hi);
    let (left, right): (Vec<usize>, Vec<usize>) =
        indices.into_iter().partition(|&i| rows[i][feature] < threshold);

    IsolationNode::Split {
        feature,
        threshold,
        left: Box::new(build_node(rows, left, depth + 1, max_depth, rng)),
        right: Box::new(build_node(rows, right, depth + 1, max_depth, rng)),
    }
}

/// Average path length of an unsuccessful BST search over `n` points, `c(n)`.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_distr::{Distribution, Normal};

    fn gaussian_cloud(n: usize, seed: u64) -> Vec<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 1.0).unwrap();
        (0..n)
            .map(|_| (0..4).map(|_| normal.sample(&mut rng)).collect())
            .collect()
    }

    #[test]
    fn test_far_point_is_anomalous() {
        let rows = gaussian_cloud(400, 7);
        let forest = IsolationForest::fit(&rows, &IsolationForestParameters::default()).unwrap();

        assert!(forest.is_anomaly(&[8.0, -8.0, 8.0, -8.0]).unwrap());
        assert!(!forest.is_anomaly(&[0.0, 0.0, 0.0, 0.0]).unwrap());
    }

    #[test]
    fn test_contamination_share_of_training_outliers() {
        let rows = gaussian_cloud(500, 11);
        let forest = IsolationForest::fit(&rows, &IsolationForestParameters::default()).unwrap();

        let flagged = rows
            .iter()
            .filter(|r| forest.is_anomaly(r).unwrap())
            .count();
        // Quantile threshold => roughly 10% of the training set
        assert!((30..=70).contains(&flagged), "flagged {}", flagged);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let rows = gaussian_cloud(200, 3);
        let params = IsolationForestParameters::default().with_n_trees(20);
        let a = IsolationForest::fit(&rows, &params).unwrap();
        let b = IsolationForest::fit(&rows, &params).unwrap();
        assert_eq!(a.threshold(), b.threshold());
        assert_eq!(a.score(&rows[0]).unwrap(), b.score(&rows[0]).unwrap());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(IsolationForest::fit(&[vec![1.0]], &IsolationForestParameters::default()).is_err());
        let rows = gaussian_cloud(50, 1);
        let forest = IsolationForest::fit(&rows, &IsolationForestParameters::default()).unwrap();
        assert!(forest.score(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!(average_path_length(256) > average_path_length(16));
    }
}

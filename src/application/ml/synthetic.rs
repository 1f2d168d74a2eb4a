//! Synthetic training data for the risk model.
//!
//! Marginals: lognormal for magnitudes, beta for scores, gamma for volatility,
//! exponential for slippage and age. The target is the fixed weighted sum in
//! [`reference_risk`] plus Gaussian noise; that weighting is the risk ontology
//! the regressor learns and must not be retuned without labeled outcomes.

use crate::domain::errors::RiskEngineError;
use crate::domain::ml::feature_registry::FeatureVector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Beta, Distribution, Exp, Gamma, LogNormal, Normal};

pub const DEFAULT_SAMPLES: usize = 1000;
pub const TARGET_NOISE_STD: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct LabeledDataset {
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl LabeledDataset {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Noise-free synthetic risk of a feature vector.
pub fn reference_risk(f: &FeatureVector) -> f64 {
    0.30 * (1.0 - f.audit_score())
        + 0.20 * (1.0 - f.governance_score())
        + 0.10 * (1.0 - f.team_score())
        + 0.15 * f.volatility()
        + 1.0 * f.slippage()
        + 0.10 * f.impermanent_loss_risk()
        + 0.05 * f.smart_contract_complexity()
}

fn dist_err(e: impl std::fmt::Display) -> RiskEngineError {
    RiskEngineError::Training {
        reason: format!("invalid sampling distribution: {}", e),
    }
}

struct Marginals {
    tvl: LogNormal<f64>,
    apy: Normal<f64>,
    volume: LogNormal<f64>,
    liquidity: LogNormal<f64>,
    age: Exp<f64>,
    audit: Beta<f64>,
    governance: Beta<f64>,
    team: Beta<f64>,
    volatility: Gamma<f64>,
    slippage: Exp<f64>,
    impermanent_loss: Beta<f64>,
    complexity: Beta<f64>,
    noise: Normal<f64>,
}

impl Marginals {
    fn new() -> Result<Self, RiskEngineError> {
        Ok(Self {
            tvl: LogNormal::new(15.0, 2.0).map_err(dist_err)?,
            apy: Normal::new(8.0, 4.0).map_err(dist_err)?,
            volume: LogNormal::new(14.0, 1.5).map_err(dist_err)?,
            liquidity: LogNormal::new(13.0, 1.0).map_err(dist_err)?,
            // rand_distr's Exp takes the rate, i.e. 1 / mean
            age: Exp::new(1.0 / 200.0).map_err(dist_err)?,
            audit: Beta::new(2.0, 1.0).map_err(dist_err)?,
            governance: Beta::new(1.5, 1.5).map_err(dist_err)?,
            team: Beta::new(2.0, 1.2).map_err(dist_err)?,
            volatility: Gamma::new(2.0, 0.1).map_err(dist_err)?,
            slippage: Exp::new(1.0 / 0.02).map_err(dist_err)?,
            impermanent_loss: Beta::new(1.0, 3.0).map_err(dist_err)?,
            complexity: Beta::new(1.0, 2.0).map_err(dist_err)?,
            noise: Normal::new(0.0, TARGET_NOISE_STD).map_err(dist_err)?,
        })
    }

    fn sample_row(&self, rng: &mut StdRng) -> [f64; 12] {
        [
            self.tvl.sample(rng),
            self.apy.sample(rng),
            self.volume.sample(rng),
            self.liquidity.sample(rng),
            self.age.sample(rng),
            self.audit.sample(rng),
            self.governance.sample(rng),
            self.team.sample(rng),
            self.volatility.sample(rng),
            self.slippage.sample(rng),
            self.impermanent_loss.sample(rng),
            self.complexity.sample(rng),
        ]
    }
}

/// Draws `n` clipped feature rows and their noisy synthetic risk targets.
pub fn generate(n: usize, seed: u64) -> Result<LabeledDataset, RiskEngineError> {
    let marginals = Marginals::new()?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut features = Vec::with_capacity(n);
    let mut targets = Vec::with_capacity(n);
    for _ in 0..n {
        let fv = FeatureVector::from_values(&marginals.sample_row(&mut rng))?;
        let noise = marginals.noise.sample(&mut rng);
        targets.push((reference_risk(&fv) + noise).clamp(0.0, 1.0));
        features.push(fv.to_vec());
    }

    Ok(LabeledDataset { features, targets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::{FEATURE_BOUNDS, FEATURE_COUNT};

    #[test]
    fn test_generate_shape_and_ranges() {
        let data = generate(500, 42).unwrap();
        assert_eq!(data.len(), 500);
        assert_eq!(data.features.len(), 500);

        for row in &data.features {
            assert_eq!(row.len(), FEATURE_COUNT);
            for (v, (lo, hi)) in row.iter().zip(FEATURE_BOUNDS.iter()) {
                assert!(*v >= *lo && *v <= *hi);
            }
        }
        assert!(data.targets.iter().all(|t| (0.0..=1.0).contains(t)));
    }

    #[test]
    fn test_generate_is_seeded() {
        let a = generate(50, 7).unwrap();
        let b = generate(50, 7).unwrap();
        let c = generate(50, 8).unwrap();
        assert_eq!(a.targets, b.targets);
        assert_ne!(a.targets, c.targets);
    }

    #[test]
    fn test_reference_risk_weights() {
        let safest = FeatureVector::from_values(&[
            1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0,
        ])
        .unwrap();
        assert!(reference_risk(&safest).abs() < 1e-12);

        let riskiest = FeatureVector::from_values(&[
            1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.1, 1.0, 1.0,
        ])
        .unwrap();
        // 0.3 + 0.2 + 0.1 + 0.15 + 0.1 + 0.1 + 0.05
        assert!((reference_risk(&riskiest) - 1.0).abs() < 1e-12);
    }
}

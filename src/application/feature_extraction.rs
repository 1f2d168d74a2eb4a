use crate::domain::errors::RiskEngineError;
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::ports::FeatureExtractor;
use crate::domain::strategy::{StrategyType, classify_type};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

// Noise per feature group, indexed like FEATURE_NAMES.
const SCORE_NOISE_STD: f64 = 0.05;
const MARKET_NOISE_STD: f64 = 0.02;
const MAGNITUDE_RELATIVE_STD: f64 = 0.1;

#[derive(Clone, Copy)]
enum NoiseKind {
    /// Multiplicative, `x * (1 + N(0, 0.1))`
    Relative,
    /// Additive `N(0, 0.05)` for audit/governance/team scores
    Score,
    /// Additive `N(0, 0.02)` for volatility, slippage, IL and complexity
    Market,
}

const NOISE_KINDS: [NoiseKind; 12] = [
    NoiseKind::Relative,
    NoiseKind::Relative,
    NoiseKind::Relative,
    NoiseKind::Relative,
    NoiseKind::Relative,
    NoiseKind::Score,
    NoiseKind::Score,
    NoiseKind::Score,
    NoiseKind::Market,
    NoiseKind::Market,
    NoiseKind::Market,
    NoiseKind::Market,
];

/// Type-appropriate default features, before noise.
pub fn base_features(kind: StrategyType) -> [f64; 12] {
    match kind {
        StrategyType::Lending => [
            1_000_000.0, 5.5, 100_000.0, 500_000.0, 180.0, 0.85, 0.75, 0.8, 0.15, 0.005, 0.1, 0.4,
        ],
        StrategyType::Dex => [
            2_000_000.0, 12.0, 500_000.0, 800_000.0, 120.0, 0.7, 0.65, 0.75, 0.35, 0.02, 0.6, 0.7,
        ],
        StrategyType::Staking => [
            1_500_000.0, 7.5, 150_000.0, 400_000.0, 240.0, 0.8, 0.7, 0.75, 0.2, 0.008, 0.15, 0.45,
        ],
        StrategyType::Lottery => [
            500_000.0, 3.0, 50_000.0, 250_000.0, 60.0, 0.9, 0.8, 0.85, 0.1, 0.001, 0.05, 0.3,
        ],
        StrategyType::Unknown => [
            500_000.0, 6.0, 100_000.0, 300_000.0, 90.0, 0.6, 0.6, 0.6, 0.3, 0.015, 0.4, 0.5,
        ],
    }
}

/// Stand-in data source: per-type defaults perturbed by seeded Gaussian noise,
/// re-clamped to each feature's valid range.
pub struct SyntheticFeatureExtractor {
    rng: Mutex<StdRng>,
    relative: Normal<f64>,
    score: Normal<f64>,
    market: Normal<f64>,
}

impl SyntheticFeatureExtractor {
    pub fn new(seed: u64) -> Result<Self, RiskEngineError> {
        let normal = |std: f64| {
            Normal::new(0.0, std).map_err(|e| RiskEngineError::ExtractorUnavailable {
                reason: e.to_string(),
            })
        };
        Ok(Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            relative: normal(MAGNITUDE_RELATIVE_STD)?,
            score: normal(SCORE_NOISE_STD)?,
            market: normal(MARKET_NOISE_STD)?,
        })
    }
}

impl FeatureExtractor for SyntheticFeatureExtractor {
    fn extract(&self, identifier: &str) -> Result<FeatureVector, RiskEngineError> {
        let kind = classify_type(identifier);
        let mut values = base_features(kind);

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| RiskEngineError::ExtractorUnavailable {
                reason: "feature noise generator lock poisoned".to_string(),
            })?;
        for (value, noise) in values.iter_mut().zip(NOISE_KINDS) {
            match noise {
                NoiseKind::Relative => *value *= 1.0 + self.relative.sample(&mut *rng),
                NoiseKind::Score => *value += self.score.sample(&mut *rng),
                NoiseKind::Market => *value += self.market.sample(&mut *rng),
            }
        }
        drop(rng);

        debug!("Extracted synthetic {} features for {}", kind, identifier);
        FeatureVector::from_values(&values)
    }
}

/// Serves known feature vectors (e.g. loaded from an on-chain snapshot file)
/// and delegates every other identifier to a fallback extractor.
pub struct RegistryFeatureExtractor<F: FeatureExtractor> {
    known: HashMap<String, FeatureVector>,
    fallback: F,
}

impl<F: FeatureExtractor> RegistryFeatureExtractor<F> {
    /// Keys are matched case-insensitively, as contract addresses are.
    pub fn new(known: HashMap<String, FeatureVector>, fallback: F) -> Self {
        let known = known
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { known, fallback }
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl<F: FeatureExtractor> FeatureExtractor for RegistryFeatureExtractor<F> {
    fn extract(&self, identifier: &str) -> Result<FeatureVector, RiskEngineError> {
        match self.known.get(&identifier.to_lowercase()) {
            Some(features) => Ok(*features),
            None => self.fallback.extract(identifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::MAX_SLIPPAGE;

    #[test]
    fn test_extract_stays_near_type_defaults() {
        let extractor = SyntheticFeatureExtractor::new(42).unwrap();
        let fv = extractor.extract("0x888e307EC9DeF2e038d545251f7b7F6c944b96d5").unwrap();

        // DEX defaults
        assert!((fv.audit_score() - 0.7).abs() < 0.3);
        assert!((fv.impermanent_loss_risk() - 0.6).abs() < 0.15);
        assert!(fv.tvl() > 0.0);
        assert!(fv.slippage() <= MAX_SLIPPAGE);
    }

    #[test]
    fn test_extract_is_seeded() {
        let a = SyntheticFeatureExtractor::new(7).unwrap();
        let b = SyntheticFeatureExtractor::new(7).unwrap();
        assert_eq!(a.extract("lottery").unwrap(), b.extract("lottery").unwrap());
    }

    #[test]
    fn test_successive_calls_vary() {
        let extractor = SyntheticFeatureExtractor::new(7).unwrap();
        let first = extractor.extract("superlend").unwrap();
        let second = extractor.extract("superlend").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_lottery_slippage_clamped_at_zero() {
        // Base slippage 0.001 with sigma 0.02 goes negative often; it must clamp.
        let extractor = SyntheticFeatureExtractor::new(1).unwrap();
        for _ in 0..200 {
            let fv = extractor.extract("lottery-pool").unwrap();
            assert!(fv.slippage() >= 0.0);
            assert!((0.0..=1.0).contains(&fv.audit_score()));
        }
    }

    #[test]
    fn test_registry_prefers_known_features() {
        let known_fv = FeatureVector::from_values(&base_features(StrategyType::Lending)).unwrap();
        let mut known = HashMap::new();
        known.insert("0xABC".to_string(), known_fv);

        let extractor = RegistryFeatureExtractor::new(known, SyntheticFeatureExtractor::new(3).unwrap());
        assert_eq!(extractor.extract("0xabc").unwrap(), known_fv);
        assert!(extractor.extract("0xdef").is_ok());
        assert_eq!(extractor.len(), 1);
    }
}

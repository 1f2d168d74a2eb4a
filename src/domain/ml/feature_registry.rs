use crate::domain::errors::RiskEngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered list of feature names.
/// This order MUST match the column order the persisted models were fitted on.
/// Any change here is a breaking change for model artifacts.
pub const FEATURE_NAMES: &[&str] = &[
    "tvl",
    "apy",
    "volume_24h",
    "liquidity_depth",
    "age_days",
    "audit_score",
    "governance_score",
    "team_score",
    "volatility",
    "slippage",
    "impermanent_loss_risk",
    "smart_contract_complexity",
];

pub const FEATURE_COUNT: usize = 12;

pub const MAX_APY: f64 = 50.0;
pub const MAX_SLIPPAGE: f64 = 0.1;

/// Valid `[min, max]` range of each feature, indexed like `FEATURE_NAMES`.
/// Magnitude fields are only bounded below.
pub const FEATURE_BOUNDS: [(f64, f64); FEATURE_COUNT] = [
    (0.0, f64::INFINITY),
    (0.0, MAX_APY),
    (0.0, f64::INFINITY),
    (0.0, f64::INFINITY),
    (0.0, f64::INFINITY),
    (0.0, 1.0),
    (0.0, 1.0),
    (0.0, 1.0),
    (0.0, 1.0),
    (0.0, MAX_SLIPPAGE),
    (0.0, 1.0),
    (0.0, 1.0),
];

/// Numeric description of a strategy, the only input of the risk model.
///
/// Fields are private: every vector comes through `from_values` or
/// `from_named` (serde included), so each value is finite and inside
/// `FEATURE_BOUNDS`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HashMap<String, f64>")]
pub struct FeatureVector {
    tvl: f64,
    apy: f64,
    volume_24h: f64,
    liquidity_depth: f64,
    age_days: f64,
    audit_score: f64,
    governance_score: f64,
    team_score: f64,
    volatility: f64,
    slippage: f64,
    impermanent_loss_risk: f64,
    smart_contract_complexity: f64,
}

impl TryFrom<HashMap<String, f64>> for FeatureVector {
    type Error = RiskEngineError;

    fn try_from(record: HashMap<String, f64>) -> Result<Self, Self::Error> {
        Self::from_named(&record)
    }
}

impl FeatureVector {
    /// Builds a vector from values in canonical order, rejecting non-finite
    /// input and clamping everything else into range.
    pub fn from_values(values: &[f64]) -> Result<Self, RiskEngineError> {
        if values.len() != FEATURE_COUNT {
            let name = FEATURE_NAMES
                .get(values.len())
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("<{} extra values>", values.len() - FEATURE_COUNT));
            return Err(RiskEngineError::MissingFeature { name });
        }
        for (name, value) in FEATURE_NAMES.iter().zip(values) {
            if !value.is_finite() {
                return Err(RiskEngineError::InvalidFeature {
                    name: name.to_string(),
                    value: *value,
                });
            }
        }
        Ok(Self::from_array_unchecked(values))
    }

    /// Builds a vector from a name -> value record (e.g. a JSON object or a CSV row).
    pub fn from_named(record: &HashMap<String, f64>) -> Result<Self, RiskEngineError> {
        let values = FEATURE_NAMES
            .iter()
            .map(|name| {
                record
                    .get(*name)
                    .copied()
                    .ok_or_else(|| RiskEngineError::MissingFeature {
                        name: name.to_string(),
                    })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        Self::from_values(&values)
    }

    fn from_array_unchecked(v: &[f64]) -> Self {
        let c = |i: usize| {
            let (lo, hi) = FEATURE_BOUNDS[i];
            v[i].clamp(lo, hi)
        };
        Self {
            tvl: c(0),
            apy: c(1),
            volume_24h: c(2),
            liquidity_depth: c(3),
            age_days: c(4),
            audit_score: c(5),
            governance_score: c(6),
            team_score: c(7),
            volatility: c(8),
            slippage: c(9),
            impermanent_loss_risk: c(10),
            smart_contract_complexity: c(11),
        }
    }

    pub fn tvl(&self) -> f64 {
        self.tvl
    }

    pub fn apy(&self) -> f64 {
        self.apy
    }

    pub fn volume_24h(&self) -> f64 {
        self.volume_24h
    }

    pub fn liquidity_depth(&self) -> f64 {
        self.liquidity_depth
    }

    pub fn age_days(&self) -> f64 {
        self.age_days
    }

    pub fn audit_score(&self) -> f64 {
        self.audit_score
    }

    pub fn governance_score(&self) -> f64 {
        self.governance_score
    }

    pub fn team_score(&self) -> f64 {
        self.team_score
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn slippage(&self) -> f64 {
        self.slippage
    }

    pub fn impermanent_loss_risk(&self) -> f64 {
        self.impermanent_loss_risk
    }

    pub fn smart_contract_complexity(&self) -> f64 {
        self.smart_contract_complexity
    }

    /// Values in canonical `FEATURE_NAMES` order.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.tvl,
            self.apy,
            self.volume_24h,
            self.liquidity_depth,
            self.age_days,
            self.audit_score,
            self.governance_score,
            self.team_score,
            self.volatility,
            self.slippage,
            self.impermanent_loss_risk,
            self.smart_contract_complexity,
        ]
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.to_vec()[i])
    }

    /// Copy with one feature replaced, validated like the constructors.
    pub fn with(&self, name: &str, value: f64) -> Result<Self, RiskEngineError> {
        let index = FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| RiskEngineError::MissingFeature {
                name: name.to_string(),
            })?;
        let mut values = self.to_vec();
        values[index] = value;
        Self::from_values(&values)
    }

    /// Values ordered by an arbitrary column list (a model's persisted order).
    pub fn ordered(&self, columns: &[String]) -> Result<Vec<f64>, RiskEngineError> {
        columns
            .iter()
            .map(|col| {
                self.get(col).ok_or_else(|| RiskEngineError::MissingFeature {
                    name: col.clone(),
                })
            })
            .collect()
    }
}

/// Canonical column list as owned strings, the form stored in model artifacts.
pub fn canonical_columns() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of yield strategy behind a vault allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyType {
    Lending,
    Dex,
    Staking,
    Lottery,
    Unknown,
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyType::Lending => write!(f, "lending"),
            StrategyType::Dex => write!(f, "dex"),
            StrategyType::Staking => write!(f, "staking"),
            StrategyType::Lottery => write!(f, "lottery"),
            StrategyType::Unknown => write!(f, "unknown"),
        }
    }
}

// Checked in order; the first list with a matching keyword wins.
const TYPE_KEYWORDS: &[(StrategyType, &[&str])] = &[
    (StrategyType::Lending, &["superlend", "1864ada", "lend", "aave"]),
    (StrategyType::Dex, &["pancake", "888e307", "swap", "dex"]),
    (StrategyType::Staking, &["stak", "validator"]),
    (StrategyType::Lottery, &["lottery", "3dc0390", "prize", "vrf"]),
];

impl StrategyType {
    /// Infers the strategy type from its identifier (usually a contract address
    /// or a registry name). Pure: the same string always yields the same type.
    pub fn classify(identifier: &str) -> Self {
        let lower = identifier.to_lowercase();
        TYPE_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(kind, _)| *kind)
            .unwrap_or(StrategyType::Unknown)
    }

    pub fn profile(&self) -> StrategyProfile {
        match self {
            StrategyType::Lending => StrategyProfile::new(0.2, 0.3, 0.4),
            StrategyType::Dex => StrategyProfile::new(0.4, 0.7, 0.6),
            StrategyType::Staking => StrategyProfile::new(0.3, 0.4, 0.3),
            StrategyType::Lottery => StrategyProfile::new(0.1, 0.2, 0.2),
            StrategyType::Unknown => StrategyProfile::new(0.35, 0.5, 0.5),
        }
    }

    /// Multiplier applied to a strategy's allocation score for the given market regime.
    ///
    /// Under stress, low-sensitivity types (lottery, lending) get a x1.2 boost and
    /// DEX strategies a x0.8 penalty. Calm markets leave every score untouched.
    pub fn regime_multiplier(&self, stressed: bool) -> f64 {
        if !stressed {
            return 1.0;
        }
        match self {
            StrategyType::Dex => 0.8,
            other if other.profile().is_defensive() => 1.2,
            _ => 1.0,
        }
    }
}

/// Free function form used by the services.
pub fn classify_type(identifier: &str) -> StrategyType {
    StrategyType::classify(identifier)
}

/// Market sensitivity coefficients of a strategy type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyProfile {
    pub base_risk: f64,
    pub volatility_sensitivity: f64,
    pub liquidity_sensitivity: f64,
}

impl StrategyProfile {
    const DEFENSIVE_SENSITIVITY: f64 = 0.3;

    pub const fn new(base_risk: f64, volatility_sensitivity: f64, liquidity_sensitivity: f64) -> Self {
        Self {
            base_risk,
            volatility_sensitivity,
            liquidity_sensitivity,
        }
    }

    pub fn is_defensive(&self) -> bool {
        self.volatility_sensitivity <= Self::DEFENSIVE_SENSITIVITY
    }
}

//! Confidence and stake tiers.
//!
//! Classification folds expected value and fair probability into one
//! scalar, `quality = ev_weight * ev + probability`, and thresholds it.
//! A non-positive expected value never earns a stake, whatever the
//! quality score says.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// How much the tip deserves to be trusted.
///
/// Ordered from weakest to strongest so tiers compare with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceTier {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceTier {
    /// Label shown by the Portuguese front end.
    pub fn label_pt(self) -> &'static str {
        match self {
            Self::VeryLow => "MUITO BAIXA",
            Self::Low => "BAIXA",
            Self::Medium => "MÉDIA",
            Self::High => "ALTA",
            Self::VeryHigh => "MUITO ALTA",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VeryLow => write!(f, "VERY_LOW"),
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::VeryHigh => write!(f, "VERY_HIGH"),
        }
    }
}

/// Discretized bet-sizing recommendation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StakeTier {
    /// Do not recommend a stake.
    #[default]
    None,
    Low,
    Medium,
    MediumHigh,
    High,
}

impl StakeTier {
    /// Percent-of-bankroll band `(low, high)` for this tier.
    pub fn bankroll_range(self) -> (Decimal, Decimal) {
        match self {
            Self::None => (Decimal::ZERO, Decimal::ZERO),
            Self::Low => (dec!(1), dec!(2)),
            Self::Medium => (dec!(2), dec!(3)),
            Self::MediumHigh => (dec!(3), dec!(4)),
            Self::High => (dec!(4), dec!(5)),
        }
    }

    /// Upper band as a bankroll fraction (0.05 for `High`).
    pub fn max_fraction(self) -> Decimal {
        self.bankroll_range().1 / Decimal::ONE_HUNDRED
    }

    /// EV-only ladder used by the legacy tip feed (stored as `value_band`).
    ///
    /// This is the only path that yields `MediumHigh`.
    pub fn from_expected_value(expected_value: f64) -> Self {
        if expected_value > 0.20 {
            Self::High
        } else if expected_value > 0.15 {
            Self::MediumHigh
        } else if expected_value > 0.10 {
            Self::Medium
        } else if expected_value > 0.05 {
            Self::Low
        } else {
            Self::None
        }
    }

    pub fn is_recommended(self) -> bool {
        self != Self::None
    }

    /// Label shown by the Portuguese front end.
    pub fn label_pt(self) -> &'static str {
        match self {
            Self::None => "SEM APOSTA",
            Self::Low => "BAIXO (1-2%)",
            Self::Medium => "MÉDIO (2-3%)",
            Self::MediumHigh => "MÉDIO-ALTO (3-4%)",
            Self::High => "ALTO (4-5%)",
        }
    }
}

impl std::fmt::Display for StakeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::MediumHigh => write!(f, "MEDIUM_HIGH"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Result of classifying one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub confidence: ConfidenceTier,
    pub stake: StakeTier,
    /// The combined score the tiers were cut from.
    pub quality: f64,
}

/// Thresholds for the quality score.
///
/// The defaults are a placeholder policy, not a calibrated model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierPolicy {
    /// Weight applied to expected value in the quality score.
    pub ev_weight: f64,
    /// quality > very_high → VERY_HIGH / HIGH stake.
    pub very_high: f64,
    /// quality > high → HIGH / HIGH stake.
    pub high: f64,
    /// quality > medium → MEDIUM / MEDIUM stake.
    pub medium: f64,
    /// quality > low → LOW / LOW stake; anything else is VERY_LOW / NONE.
    pub low: f64,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            ev_weight: 2.0,
            very_high: 1.8,
            high: 1.6,
            medium: 1.4,
            low: 1.2,
        }
    }
}

impl TierPolicy {
    /// True when thresholds are finite and strictly descending.
    pub fn is_well_formed(&self) -> bool {
        let cuts = [self.very_high, self.high, self.medium, self.low];
        self.ev_weight.is_finite()
            && self.ev_weight > 0.0
            && cuts.iter().all(|c| c.is_finite())
            && cuts.windows(2).all(|w| w[0] > w[1])
    }

    pub fn quality(&self, expected_value: f64, fair_probability: f64) -> f64 {
        self.ev_weight * expected_value + fair_probability
    }

    pub fn classify(&self, expected_value: f64, fair_probability: f64) -> Classification {
        let quality = self.quality(expected_value, fair_probability);

        // Non-positive EV (or NaN) never justifies a stake.
        if !(expected_value > 0.0) {
            return Classification {
                confidence: ConfidenceTier::VeryLow,
                stake: StakeTier::None,
                quality,
            };
        }

        let (confidence, stake) = if quality > self.very_high {
            (ConfidenceTier::VeryHigh, StakeTier::High)
        } else if quality > self.high {
            (ConfidenceTier::High, StakeTier::High)
        } else if quality > self.medium {
            (ConfidenceTier::Medium, StakeTier::Medium)
        } else if quality > self.low {
            (ConfidenceTier::Low, StakeTier::Low)
        } else {
            (ConfidenceTier::VeryLow, StakeTier::None)
        };

        Classification {
            confidence,
            stake,
            quality,
        }
    }
}

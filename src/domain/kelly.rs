//! Kelly Criterion stake sizing for decimal odds.
//!
//! Implements fractional Kelly for bankroll management. Quarter-Kelly
//! (0.25x) by default, and the result is always capped by the stake
//! tier's bankroll band so the Kelly size can refine but never exceed
//! what the tier recommends.
//!
//! Exposes both `KellyCriterion` (Decimal API) and `KellySizer` (f64 API).

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use super::tiers::StakeTier;

/// Kelly Criterion calculator for decimal odds (Decimal API).
#[derive(Debug, Clone)]
pub struct KellyCriterion {
    /// Kelly fraction multiplier (0.25 = quarter-Kelly)
    fraction: Decimal,
    /// Maximum stake as fraction of bankroll
    max_stake_fraction: Decimal,
}

impl KellyCriterion {
    pub fn new(fraction: Decimal, max_stake_fraction: Decimal) -> Self {
        Self {
            fraction,
            max_stake_fraction,
        }
    }

    /// Fraction of bankroll to stake at `decimal_odd` given `probability`.
    ///
    /// Kelly formula for decimal odds:
    ///   f* = (p * o - 1) / (o - 1)
    /// i.e. expected value divided by net odds. Zero when the edge is
    /// non-positive or the odd is not above 1.0.
    pub fn optimal_fraction(&self, probability: Decimal, decimal_odd: Decimal) -> Decimal {
        if decimal_odd <= Decimal::ONE || probability <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let net_odds = decimal_odd - Decimal::ONE;
        let full_kelly = (probability * decimal_odd - Decimal::ONE) / net_odds;

        if full_kelly <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        (full_kelly * self.fraction).min(self.max_stake_fraction)
    }

    /// Same as `optimal_fraction`, additionally capped by the tier band.
    pub fn fraction_for_tier(
        &self,
        probability: Decimal,
        decimal_odd: Decimal,
        tier: StakeTier,
    ) -> Decimal {
        if !tier.is_recommended() {
            return Decimal::ZERO;
        }
        self.optimal_fraction(probability, decimal_odd)
            .min(tier.max_fraction())
    }
}

impl Default for KellyCriterion {
    /// Default: quarter-Kelly capped at 5% of bankroll (top of the HIGH band).
    fn default() -> Self {
        Self {
            fraction: dec!(0.25),
            max_stake_fraction: dec!(0.05),
        }
    }
}

// ────────────────────────────────────────────
// KellySizer - f64 boundary API for usecases
// ────────────────────────────────────────────

/// Lightweight f64 wrapper around KellyCriterion for use at the ports boundary.
///
/// Accepts and returns `f64` so usecases/adapters never import `Decimal`.
#[derive(Debug, Clone)]
pub struct KellySizer {
    inner: KellyCriterion,
}

impl KellySizer {
    /// Create a sizer with the given Kelly fraction and bankroll cap.
    pub fn new(fraction: f64, max_stake_fraction: f64) -> Self {
        let frac = Decimal::from_f64(fraction).unwrap_or(dec!(0.25));
        let cap = Decimal::from_f64(max_stake_fraction).unwrap_or(dec!(0.05));
        Self {
            inner: KellyCriterion::new(frac, cap),
        }
    }

    /// Bankroll fraction (0.0 – cap) for a classified outcome.
    pub fn stake_fraction(&self, probability: f64, decimal_odd: f64, tier: StakeTier) -> f64 {
        let (Some(prob), Some(odd)) = (Decimal::from_f64(probability), Decimal::from_f64(decimal_odd))
        else {
            return 0.0;
        };

        self.inner
            .fraction_for_tier(prob, odd, tier)
            .to_f64()
            .unwrap_or(0.0)
    }
}

//! Published tip domain type.
//!
//! A tip is one classified outcome that earned a stake recommendation,
//! carrying enough context (event, market, sizing) to be persisted or
//! combined into an accumulator.

use serde::{Deserialize, Serialize};

use super::engine::ValuedOutcome;
use super::odds::EventOutcomeSet;
use super::tiers::{ConfidenceTier, StakeTier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub event_id: String,
    pub market: String,
    pub label: String,
    pub quoted_odd: f64,
    pub fair_probability: f64,
    pub expected_value: f64,
    pub confidence: ConfidenceTier,
    pub stake: StakeTier,
    /// Suggested bankroll fraction (Kelly, capped by the stake band).
    pub stake_fraction: f64,
    /// Probability came from a model override rather than the market.
    pub model_adjusted: bool,
    /// House offering `quoted_odd`, when known.
    #[serde(default)]
    pub bookmaker: Option<String>,
}

impl Tip {
    pub fn new(set: &EventOutcomeSet, valued: &ValuedOutcome, stake_fraction: f64) -> Self {
        Self {
            event_id: set.event_id().to_string(),
            market: set.market().to_string(),
            label: valued.outcome.label.clone(),
            quoted_odd: valued.outcome.quoted_odd,
            fair_probability: valued.outcome.fair_probability,
            expected_value: valued.outcome.expected_value,
            confidence: valued.classification.confidence,
            stake: valued.classification.stake,
            stake_fraction,
            model_adjusted: set.is_adjusted(),
            bookmaker: None,
        }
    }

    pub fn with_bookmaker(mut self, bookmaker: Option<&str>) -> Self {
        self.bookmaker = bookmaker.map(str::to_string);
        self
    }
}

/// Sort tips by expected value, best first.
pub fn rank_by_value(tips: &mut [Tip]) {
    tips.sort_by(|a, b| b.expected_value.total_cmp(&a.expected_value));
}

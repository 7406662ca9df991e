//! Domain layer - Core valuation logic and models.
//!
//! This module contains the pure math of the tips engine: de-vigging,
//! model overrides, tier classification, stake sizing, accumulators and
//! surebets. No I/O and no logging here (hexagonal architecture inner ring).

pub mod accumulator;
pub mod engine;
pub mod error;
pub mod kelly;
pub mod odds;
pub mod quotes;
pub mod strength;
pub mod surebet;
pub mod tiers;
pub mod tip;

// Re-export core types for convenience
pub use accumulator::{Accumulator, AccumulatorLeg, AccumulatorRule};
pub use engine::{OddsValuationEngine, PROBABILITY_TOLERANCE, ValuedOutcome};
pub use error::{AdjustmentError, InvalidOddsError};
pub use kelly::{KellyCriterion, KellySizer};
pub use odds::{EventId, EventOutcomeSet, MarketQuotes, Outcome, OutcomeQuote};
pub use quotes::{BookmakerQuote, MarketBook, QuoteSelection, SelectedQuote, select_books};
pub use strength::{MatchProbabilities, StrengthModel, TeamStrength};
pub use surebet::{Surebet, SurebetLeg, detect_surebets};
pub use tiers::{Classification, ConfidenceTier, StakeTier, TierPolicy};
pub use tip::Tip;

//! Outcome and outcome-set types.
//!
//! Exposes two shapes:
//! - Raw input (`OutcomeQuote`, `MarketQuotes`) as it arrives from a
//!   provider or over JSON, not yet validated.
//! - Valued output (`Outcome`, `EventOutcomeSet`) produced only by the
//!   valuation engine. A valued set is never patched in place; a refresh
//!   or a model override always yields a new set.

use serde::{Deserialize, Serialize};

/// Lightweight event identifier (fixture id, or caller-chosen key).
pub type EventId = String;

/// One bookmaker-quoted outcome before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeQuote {
    /// Outcome label, unique within its market (e.g. "Home", "Mais de 2.5").
    pub label: String,
    /// Decimal odd as published.
    pub quoted_odd: f64,
}

impl OutcomeQuote {
    pub fn new(label: impl Into<String>, quoted_odd: f64) -> Self {
        Self {
            label: label.into(),
            quoted_odd,
        }
    }
}

/// All representative quotes for one market of one event.
///
/// Callers pick a single quote per outcome (best price, or one bookmaker)
/// before handing this to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuotes {
    /// Event the market belongs to.
    pub event_id: EventId,
    /// Market name (e.g. "Resultado Final").
    pub market: String,
    /// One quote per outcome, in display order.
    pub quotes: Vec<OutcomeQuote>,
}

impl MarketQuotes {
    pub fn new(
        event_id: impl Into<EventId>,
        market: impl Into<String>,
        quotes: Vec<OutcomeQuote>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            market: market.into(),
            quotes,
        }
    }
}

/// A valued outcome: quoted odd plus every derived probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Outcome label.
    pub label: String,
    /// Decimal odd (> 1.0).
    pub quoted_odd: f64,
    /// Implied probability `1 / quoted_odd`, margin included.
    pub raw_probability: f64,
    /// De-vigged (or model-adjusted) probability.
    pub fair_probability: f64,
    /// `quoted_odd * fair_probability - 1`.
    pub expected_value: f64,
}

impl Outcome {
    /// Probability gained (or lost) versus the bookmaker's implied price.
    pub fn edge(&self) -> f64 {
        self.fair_probability - self.raw_probability
    }
}

/// Expected value per unit staked at `odd` when the true chance is `probability`.
#[inline]
pub fn expected_value(odd: f64, probability: f64) -> f64 {
    odd * probability - 1.0
}

/// The full, mutually exclusive outcome set of one market, valued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventOutcomeSet {
    event_id: EventId,
    market: String,
    overround: f64,
    adjusted: bool,
    outcomes: Vec<Outcome>,
}

impl EventOutcomeSet {
    pub(super) fn from_parts(
        event_id: EventId,
        market: String,
        overround: f64,
        adjusted: bool,
        outcomes: Vec<Outcome>,
    ) -> Self {
        Self {
            event_id,
            market,
            overround,
            adjusted,
            outcomes,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    /// Sum of raw implied probabilities (1.0 + bookmaker margin).
    pub fn overround(&self) -> f64 {
        self.overround
    }

    /// Bookmaker margin as a fraction (`overround - 1`).
    pub fn margin(&self) -> f64 {
        self.overround - 1.0
    }

    /// Whether a model override replaced the pure market probabilities.
    pub fn is_adjusted(&self) -> bool {
        self.adjusted
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn outcome(&self, label: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.label == label)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Always false for sets built by the engine.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// A single-outcome set normalizes trivially and carries no signal.
    pub fn is_valuable(&self) -> bool {
        self.outcomes.len() >= 2
    }

    /// Sum of fair probabilities (1.0 within floating-point tolerance).
    pub fn fair_probability_sum(&self) -> f64 {
        self.outcomes.iter().map(|o| o.fair_probability).sum()
    }
}

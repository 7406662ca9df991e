//! Surebet (cross-bookmaker arbitrage) detection.
//!
//! Taking the best price for every outcome of a market across houses, if
//! the implied probabilities sum below 1.0 then staking each outcome in
//! proportion to its implied probability locks in a profit whatever the
//! result.

use serde::{Deserialize, Serialize};

use super::quotes::{BookmakerQuote, MarketBook, QuoteSelection, select_books};

/// One leg of a surebet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurebetLeg {
    pub label: String,
    pub bookmaker: String,
    pub odd: f64,
    /// Share of the total stake to place on this leg.
    pub stake_share: f64,
}

/// A market whose best prices sum to less than 100% implied probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surebet {
    pub event_id: String,
    pub market: String,
    pub legs: Vec<SurebetLeg>,
    /// Σ 1/odd over the legs (< 1.0).
    pub implied_total: f64,
    /// Guaranteed return on total stake, in percent.
    pub profit_percent: f64,
}

/// Check a single market book for an arbitrage.
///
/// Needs at least two outcomes, all with finite odds above 1.0.
pub fn detect_surebet(event_id: &str, book: &MarketBook) -> Option<Surebet> {
    if book.entries.len() < 2 {
        return None;
    }
    if book.entries.iter().any(|e| !(e.odd.is_finite() && e.odd > 1.0)) {
        return None;
    }

    let implied_total: f64 = book.entries.iter().map(|e| 1.0 / e.odd).sum();
    if implied_total >= 1.0 {
        return None;
    }

    let legs = book
        .entries
        .iter()
        .map(|e| SurebetLeg {
            label: e.label.clone(),
            bookmaker: e.bookmaker.clone(),
            odd: e.odd,
            stake_share: (1.0 / e.odd) / implied_total,
        })
        .collect();

    Some(Surebet {
        event_id: event_id.to_string(),
        market: book.market.clone(),
        legs,
        implied_total,
        profit_percent: (1.0 / implied_total - 1.0) * 100.0,
    })
}

/// Scan every market of an event using best prices across bookmakers.
pub fn detect_surebets(event_id: &str, quotes: &[BookmakerQuote]) -> Vec<Surebet> {
    select_books(quotes, &QuoteSelection::Best)
        .iter()
        .filter_map(|book| detect_surebet(event_id, book))
        .collect()
}

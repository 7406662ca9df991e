//! Portuguese market and label names.
//!
//! The front end shows Portuguese names. Over/Under lines become separate
//! markets ("Total de Gols 2.5") so that each market holds one mutually
//! exclusive pair.

use crate::domain::strength::{BOTH_SCORE_MARKET, MATCH_WINNER_MARKET, NO_LABEL, YES_LABEL};

/// Translate a provider bet name. Unknown names pass through.
pub fn market_name(bet: &str) -> &str {
    match bet {
        "Match Winner" => MATCH_WINNER_MARKET,
        "Goals Over/Under" => "Total de Gols",
        "Both Teams Score" => BOTH_SCORE_MARKET,
        "Double Chance" => "Dupla Chance",
        "Exact Score" | "Correct Score" => "Placar Exato",
        "Asian Handicap" => "Handicap Asiático",
        other => other,
    }
}

/// Translate an outcome label.
pub fn outcome_label(value: &str) -> String {
    if let Some(line) = value.strip_prefix("Over ") {
        return format!("Mais de {line}");
    }
    if let Some(line) = value.strip_prefix("Under ") {
        return format!("Menos de {line}");
    }
    match value {
        "Yes" => YES_LABEL.to_string(),
        "No" => NO_LABEL.to_string(),
        other => other.to_string(),
    }
}

/// Line of an Over/Under label ("Over 2.5" → "2.5").
fn total_line(value: &str) -> Option<&str> {
    value
        .strip_prefix("Over ")
        .or_else(|| value.strip_prefix("Under "))
        .map(str::trim)
}

/// Localised `(market, label)` for one provider quote.
pub fn localize(bet: &str, value: &str) -> (String, String) {
    let market = market_name(bet);
    let market = match total_line(value) {
        Some(line) => format!("{market} {line}"),
        None => market.to_string(),
    };
    (market, outcome_label(value))
}

/// Normalized bookmaker key ("Bet 365" → "bet365").
pub fn bookmaker_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

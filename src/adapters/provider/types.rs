//! API-Football Response Types
//!
//! Serialization types for the subset of the API-Football v3 payloads
//! the engine reads. Every payload is wrapped in `{"response": ...}`;
//! odds and averages arrive as strings.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Standard `{"response": ...}` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
  pub response: T,
  /// Errors reported in-band (an object or an empty list).
  #[serde(default)]
  pub errors: serde_json::Value,
}

impl<T> Envelope<T> {
  /// True when the provider reported in-band errors.
  pub fn has_errors(&self) -> bool {
    match &self.errors {
      serde_json::Value::Object(map) => !map.is_empty(),
      serde_json::Value::Array(list) => !list.is_empty(),
      _ => false,
    }
  }
}

// ── /fixtures ──────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureItem {
  pub fixture: FixtureInfo,
  pub league: LeagueInfo,
  pub teams: Teams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureInfo {
  pub id: u64,
  pub date: DateTime<Utc>,
  pub status: FixtureStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureStatus {
  /// Short status code ("NS" = not started).
  pub short: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueInfo {
  pub id: u32,
  pub name: String,
  pub season: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Teams {
  pub home: TeamInfo,
  pub away: TeamInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamInfo {
  pub id: u64,
  pub name: String,
}

// ── /odds ──────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct OddsItem {
  #[serde(default)]
  pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Bookmaker {
  pub name: String,
  #[serde(default)]
  pub bets: Vec<Bet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Bet {
  pub name: String,
  #[serde(default)]
  pub values: Vec<BetValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BetValue {
  /// Outcome label ("Home", "Over 2.5", ...). Some markets send numbers.
  pub value: StringOrNumber,
  /// Decimal odd as text.
  pub odd: StringOrNumber,
}

// ── /teams/statistics ──────────────────────

/// Statistics payload; the provider answers `[]` when it has none.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatisticsPayload {
  Stats(TeamStatistics),
  Missing(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamStatistics {
  /// Recent results, e.g. "WWDLW".
  #[serde(default)]
  pub form: Option<String>,
  pub goals: GoalStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoalStats {
  #[serde(rename = "for")]
  pub scored: GoalSide,
  pub against: GoalSide,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoalSide {
  pub average: GoalAverage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoalAverage {
  pub total: Option<StringOrNumber>,
}

/// A value the provider sends either as a JSON string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StringOrNumber {
  Text(String),
  Number(f64),
}

impl StringOrNumber {
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Text(text) => text.trim().parse().ok(),
      Self::Number(n) => Some(*n),
    }
  }

  pub fn to_label(&self) -> String {
    match self {
      Self::Text(text) => text.trim().to_string(),
      Self::Number(n) => n.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_odds_payload() {
    let json = r#"{
      "errors": [],
      "response": [{
        "bookmakers": [{
          "id": 8, "name": "Bet365",
          "bets": [{
            "id": 1, "name": "Match Winner",
            "values": [
              {"value": "Home", "odd": "1.80"},
              {"value": "Draw", "odd": "3.40"}
            ]
          }]
        }]
      }]
    }"#;
    let envelope: Envelope<Vec<OddsItem>> = serde_json::from_str(json).unwrap();
    assert!(!envelope.has_errors());
    let value = &envelope.response[0].bookmakers[0].bets[0].values[0];
    assert_eq!(value.value.to_label(), "Home");
    assert_eq!(value.odd.as_f64(), Some(1.80));
  }

  #[test]
  fn test_statistics_missing_is_tolerated() {
    let envelope: Envelope<StatisticsPayload> =
      serde_json::from_str(r#"{"errors": {"token": "bad"}, "response": []}"#).unwrap();
    assert!(envelope.has_errors());
    assert!(matches!(envelope.response, StatisticsPayload::Missing(_)));
  }

  #[test]
  fn test_parse_fixture() {
    let json = r#"{
      "fixture": {"id": 1035, "date": "2024-06-01T19:00:00+00:00", "status": {"short": "NS"}},
      "league": {"id": 71, "name": "Serie A", "season": 2024, "round": "Regular Season - 8"},
      "teams": {
        "home": {"id": 127, "name": "Flamengo", "logo": "x"},
        "away": {"id": 121, "name": "Palmeiras", "logo": "y"}
      }
    }"#;
    let item: FixtureItem = serde_json::from_str(json).unwrap();
    assert_eq!(item.fixture.id, 1035);
    assert_eq!(item.league.id, 71);
    assert_eq!(item.teams.away.name, "Palmeiras");
  }
}

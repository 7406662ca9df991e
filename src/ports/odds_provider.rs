//! Odds Provider Port - Fixtures, Odds and Team Statistics
//!
//! Defines the trait for pulling the day's fixtures, their bookmaker odds
//! and the team statistics feeding the strength model from a sports data
//! provider (e.g., API-Football).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::quotes::BookmakerQuote;
use crate::domain::strength::TeamStrength;

/// A team as referenced by a fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
  /// Provider team id.
  pub id: u64,
  /// Display name.
  pub name: String,
}

/// One scheduled match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
  /// Provider fixture id.
  pub id: u64,
  /// Provider league id.
  pub league_id: u32,
  /// League display name.
  pub league_name: String,
  /// Season the fixture belongs to.
  pub season: i32,
  /// Kick-off time.
  pub kickoff: DateTime<Utc>,
  pub home: TeamRef,
  pub away: TeamRef,
}

impl Fixture {
  /// Event key used by the valuation engine and the tip store.
  pub fn event_id(&self) -> String {
    self.id.to_string()
  }

  /// "Home x Away", as shown to users.
  pub fn title(&self) -> String {
    format!("{} x {}", self.home.name, self.away.name)
  }
}

/// Trait for sports data providers.
///
/// Implementors own transport concerns (rate limits, retries, timeouts);
/// callers only see fixtures and quotes.
#[async_trait]
pub trait OddsProvider: Send + Sync + 'static {
  /// Fixtures kicking off on `date` in the followed leagues.
  async fn fixtures_on(&self, date: NaiveDate) -> anyhow::Result<Vec<Fixture>>;

  /// Every bookmaker quote published for a fixture.
  ///
  /// Market names and labels come back already localised.
  async fn odds_for(&self, fixture_id: u64) -> anyhow::Result<Vec<BookmakerQuote>>;

  /// Season strength of a team, or `None` when the provider has no
  /// statistics for it.
  async fn team_strength(
    &self,
    team_id: u64,
    league_id: u32,
    season: i32,
  ) -> anyhow::Result<Option<TeamStrength>>;

  /// Check if the provider is reachable and authorised.
  async fn is_healthy(&self) -> bool;
}

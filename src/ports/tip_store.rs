//! Tip Store Port - Published Tip Persistence Interface
//!
//! Defines the record shape served to the front end and the trait for
//! storing tips, accumulators and surebets. Per-event tips are replaced
//! wholesale on every refresh; every published tip is also kept in an
//! append-only daily history.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::accumulator::Accumulator;
use crate::domain::surebet::Surebet;
use crate::domain::tiers::{ConfidenceTier, StakeTier};
use crate::domain::tip::Tip;

/// A published tip as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipRecord {
  /// Unique record id.
  pub id: Uuid,
  /// Event (fixture) id.
  pub event_id: String,
  /// "Home x Away".
  pub title: String,
  /// League display name.
  pub league: String,
  /// Kick-off time.
  pub kickoff: DateTime<Utc>,
  /// Market name.
  pub market: String,
  /// Outcome label.
  pub label: String,
  /// Quoted odd, 2 dp.
  pub odd: f64,
  /// Fair probability, 4 dp.
  pub probability: f64,
  /// Expected value, 4 dp.
  pub expected_value: f64,
  pub confidence: ConfidenceTier,
  /// Front-end confidence label ("ALTA", ...).
  pub confidence_label: String,
  pub stake: StakeTier,
  /// Front-end stake label ("ALTO (4-5%)", ...).
  pub stake_label: String,
  /// Stake band from expected value alone, as the legacy feed showed it.
  #[serde(default)]
  pub value_band: StakeTier,
  #[serde(default)]
  pub value_band_label: String,
  /// Suggested bankroll fraction, 4 dp.
  pub stake_fraction: f64,
  /// Probability came from the strength model.
  pub model_adjusted: bool,
  /// House offering the odd.
  #[serde(default)]
  pub bookmaker: Option<String>,
  /// Deep link into the house's site, when a base URL is configured.
  #[serde(default)]
  pub bet_link: Option<String>,
  /// When the tip was published.
  pub created_at: DateTime<Utc>,
}

/// Fixture context attached to a record.
#[derive(Debug, Clone, Copy)]
pub struct TipContext<'a> {
  pub title: &'a str,
  pub league: &'a str,
  pub kickoff: DateTime<Utc>,
  /// Base URL per bookmaker key.
  pub bookmaker_links: &'a HashMap<String, String>,
}

impl TipRecord {
  /// Build a record from a tip, rounding values for display.
  pub fn from_tip(tip: &Tip, context: TipContext<'_>, created_at: DateTime<Utc>) -> Self {
    let value_band = StakeTier::from_expected_value(tip.expected_value);
    let bet_link = tip
      .bookmaker
      .as_deref()
      .and_then(|house| {
        context
          .bookmaker_links
          .iter()
          .find(|(key, _)| key.eq_ignore_ascii_case(house))
      })
      .map(|(_, base)| bet_link(base, context.title, &tip.market, &tip.label));

    Self {
      id: Uuid::new_v4(),
      event_id: tip.event_id.clone(),
      title: context.title.to_string(),
      league: context.league.to_string(),
      kickoff: context.kickoff,
      market: tip.market.clone(),
      label: tip.label.clone(),
      odd: round_dp(tip.quoted_odd, 2),
      probability: round_dp(tip.fair_probability, 4),
      expected_value: round_dp(tip.expected_value, 4),
      confidence: tip.confidence,
      confidence_label: tip.confidence.label_pt().to_string(),
      stake: tip.stake,
      stake_label: tip.stake.label_pt().to_string(),
      value_band,
      value_band_label: value_band.label_pt().to_string(),
      stake_fraction: round_dp(tip.stake_fraction, 4),
      model_adjusted: tip.model_adjusted,
      bookmaker: tip.bookmaker.clone(),
      bet_link,
      created_at,
    }
  }
}

/// `{base}/match/{event}/{bet}` with spaces turned into separators.
pub fn bet_link(base_url: &str, title: &str, market: &str, label: &str) -> String {
  let event = title.replace(' ', "_");
  let bet = format!("{market} {label}").replace(' ', "-").replace('.', "");
  format!("{}/match/{event}/{bet}", base_url.trim_end_matches('/'))
}

/// Round through `Decimal` so stored values print cleanly.
///
/// Non-finite input is returned unchanged.
pub fn round_dp(value: f64, dp: u32) -> f64 {
  Decimal::from_f64(value)
    .and_then(|d| d.round_dp(dp).to_f64())
    .unwrap_or(value)
}

/// Trait for tip persistence providers.
#[async_trait]
pub trait TipStore: Send + Sync + 'static {
  /// Replace every stored tip of an event and append them to history.
  ///
  /// An empty slice clears the event.
  async fn replace_event_tips(&self, event_id: &str, tips: &[TipRecord]) -> anyhow::Result<()>;

  /// Current tips of an event (empty if none).
  async fn load_event_tips(&self, event_id: &str) -> anyhow::Result<Vec<TipRecord>>;

  /// Every tip published on `date`, in publication order.
  async fn load_history(&self, date: NaiveDate) -> anyhow::Result<Vec<TipRecord>>;

  /// Overwrite the current accumulators.
  async fn save_accumulators(&self, accumulators: &[Accumulator]) -> anyhow::Result<()>;

  /// Current accumulators (empty if none).
  async fn load_accumulators(&self) -> anyhow::Result<Vec<Accumulator>>;

  /// Overwrite the current surebets.
  async fn save_surebets(&self, surebets: &[Surebet]) -> anyhow::Result<()>;

  /// Current surebets (empty if none).
  async fn load_surebets(&self) -> anyhow::Result<Vec<Surebet>>;

  /// Check if the store is writable.
  async fn is_healthy(&self) -> bool;
}

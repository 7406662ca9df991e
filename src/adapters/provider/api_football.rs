//! API-Football Adapter - OddsProvider over the v3 REST API
//!
//! Fixtures are filtered to the followed leagues and to matches that
//! have not started. Odds are flattened into per-bookmaker quotes with
//! localised market names; quotes whose odd does not parse are dropped
//! with a warning.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use super::client::ProviderClient;
use super::localize::{bookmaker_key, localize};
use super::types::{Envelope, FixtureItem, OddsItem, StatisticsPayload, TeamStatistics};
use crate::adapters::metrics::MetricsRegistry;
use crate::domain::quotes::BookmakerQuote;
use crate::domain::strength::TeamStrength;
use crate::ports::odds_provider::{Fixture, OddsProvider, TeamRef};

/// Fixture status for matches that have not kicked off.
const NOT_STARTED: &str = "NS";

/// API-Football implementation of [`OddsProvider`].
pub struct ApiFootballProvider {
    client: ProviderClient,
    leagues: HashSet<u32>,
    /// Untranslated bet names to keep (e.g. "Match Winner").
    markets: HashSet<String>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl ApiFootballProvider {
    pub fn new(client: ProviderClient, leagues: &[u32], markets: &[String]) -> Self {
        Self {
            client,
            leagues: leagues.iter().copied().collect(),
            markets: markets.iter().cloned().collect(),
            metrics: None,
        }
    }

    /// Publish provider health to the gauge.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn keep_fixture(&self, item: &FixtureItem) -> bool {
        self.leagues.contains(&item.league.id) && item.fixture.status.short == NOT_STARTED
    }

    fn flatten_odds(&self, fixture_id: u64, items: Vec<OddsItem>) -> Vec<BookmakerQuote> {
        let mut quotes = Vec::new();
        for bookmaker in items.into_iter().flat_map(|item| item.bookmakers) {
            let house = bookmaker_key(&bookmaker.name);
            for bet in bookmaker.bets {
                if !self.markets.contains(&bet.name) {
                    continue;
                }
                for value in bet.values {
                    let raw_label = value.value.to_label();
                    let Some(odd) = value.odd.as_f64() else {
                        warn!(
                            fixture_id,
                            bookmaker = %house,
                            bet = %bet.name,
                            label = %raw_label,
                            "Skipping unparsable odd"
                        );
                        continue;
                    };
                    let (market, label) = localize(&bet.name, &raw_label);
                    quotes.push(BookmakerQuote::new(house.clone(), market, label, odd));
                }
            }
        }
        quotes
    }
}

/// Season averages to model strength; absent averages fall back to neutral.
fn strength_from_statistics(stats: &TeamStatistics) -> TeamStrength {
    let neutral = TeamStrength::default();
    let attack = stats
        .goals
        .scored
        .average
        .total
        .as_ref()
        .and_then(|v| v.as_f64())
        .unwrap_or(neutral.attack);
    let defense = stats
        .goals
        .against
        .average
        .total
        .as_ref()
        .and_then(|v| v.as_f64())
        .unwrap_or(neutral.defense);
    TeamStrength::from_form_string(attack, defense, stats.form.as_deref().unwrap_or(""))
}

#[async_trait]
impl OddsProvider for ApiFootballProvider {
    #[instrument(skip(self))]
    async fn fixtures_on(&self, date: NaiveDate) -> Result<Vec<Fixture>> {
        let envelope: Envelope<Vec<FixtureItem>> = self
            .client
            .get_json("fixtures", "/fixtures", &[("date", date.format("%Y-%m-%d").to_string())])
            .await?;
        anyhow::ensure!(
            !envelope.has_errors(),
            "Provider rejected fixtures request: {}",
            envelope.errors
        );

        let total = envelope.response.len();
        let fixtures: Vec<Fixture> = envelope
            .response
            .into_iter()
            .filter(|item| self.keep_fixture(item))
            .map(|item| Fixture {
                id: item.fixture.id,
                league_id: item.league.id,
                league_name: item.league.name,
                season: item.league.season,
                kickoff: item.fixture.date,
                home: TeamRef {
                    id: item.teams.home.id,
                    name: item.teams.home.name,
                },
                away: TeamRef {
                    id: item.teams.away.id,
                    name: item.teams.away.name,
                },
            })
            .collect();

        info!(total, followed = fixtures.len(), "Fixtures fetched");
        Ok(fixtures)
    }

    #[instrument(skip(self))]
    async fn odds_for(&self, fixture_id: u64) -> Result<Vec<BookmakerQuote>> {
        let envelope: Envelope<Vec<OddsItem>> = self
            .client
            .get_json("odds", "/odds", &[("fixture", fixture_id.to_string())])
            .await?;
        anyhow::ensure!(
            !envelope.has_errors(),
            "Provider rejected odds request: {}",
            envelope.errors
        );

        let quotes = self.flatten_odds(fixture_id, envelope.response);
        debug!(fixture_id, quotes = quotes.len(), "Odds fetched");
        Ok(quotes)
    }

    #[instrument(skip(self))]
    async fn team_strength(
        &self,
        team_id: u64,
        league_id: u32,
        season: i32,
    ) -> Result<Option<TeamStrength>> {
        let envelope: Envelope<StatisticsPayload> = self
            .client
            .get_json(
                "team_statistics",
                "/teams/statistics",
                &[
                    ("team", team_id.to_string()),
                    ("season", season.to_string()),
                    ("league", league_id.to_string()),
                ],
            )
            .await?;

        match envelope.response {
            StatisticsPayload::Stats(stats) => Ok(Some(strength_from_statistics(&stats))),
            StatisticsPayload::Missing(_) => {
                debug!(team_id, league_id, "No statistics for team");
                Ok(None)
            }
        }
    }

    async fn is_healthy(&self) -> bool {
        let healthy = self
            .client
            .get_json::<serde_json::Value>("status", "/status", &[])
            .await
            .is_ok();
        if let Some(metrics) = &self.metrics {
            metrics.provider_healthy.set(if healthy { 1.0 } else { 0.0 });
        }
        healthy
    }
}

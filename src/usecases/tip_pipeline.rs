//! Tip Pipeline - Daily Valuation Run
//!
//! The main use case that:
//! 1. Fetches the day's fixtures via OddsProvider
//! 2. Fans out odds requests (bounded concurrency)
//! 3. Groups bookmaker quotes into markets and detects surebets
//! 4. De-vigs every market, skipping invalid ones
//! 5. Overrides match-winner and goals probabilities with the strength model
//! 6. Classifies outcomes and sizes stakes via fractional Kelly
//! 7. Persists tips per event, then the accumulator and surebets
//!
//! A failure on one fixture or one market never aborts the run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::StreamExt;
use futures_util::stream;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::config::AppConfig;
use crate::domain::accumulator::AccumulatorRule;
use crate::domain::engine::OddsValuationEngine;
use crate::domain::kelly::KellySizer;
use crate::domain::odds::EventOutcomeSet;
use crate::domain::quotes::{BookmakerQuote, QuoteSelection, select_books};
use crate::domain::strength::{StrengthModel, TeamStrength, is_model_market};
use crate::domain::surebet::{Surebet, detect_surebets};
use crate::domain::tip::{Tip, rank_by_value};
use crate::ports::odds_provider::{Fixture, OddsProvider};
use crate::ports::tip_store::{TipContext, TipRecord, TipStore};

/// Everything a run needs that can change on config reload.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
  pub engine: OddsValuationEngine,
  pub sizer: KellySizer,
  pub selection: QuoteSelection,
  /// Tips must beat this expected value.
  pub min_expected_value: f64,
  /// `None` disables model overrides.
  pub model: Option<StrengthModel>,
  /// Team statistics season; `None` uses the fixture's.
  pub stats_season: Option<i32>,
  /// Site base URL per bookmaker key.
  pub bookmaker_links: HashMap<String, String>,
  /// `None` disables the daily accumulator.
  pub accumulator: Option<AccumulatorRule>,
  /// Fixtures processed concurrently.
  pub fan_out: usize,
  /// Value but never persist.
  pub dry_run: bool,
}

impl PipelineSettings {
  pub fn from_config(config: &AppConfig) -> Self {
    Self {
      engine: OddsValuationEngine::new(config.valuation.tiers),
      sizer: KellySizer::new(
        config.valuation.kelly_fraction,
        config.valuation.max_stake_fraction,
      ),
      selection: config.provider.selection.clone(),
      min_expected_value: config.valuation.min_expected_value,
      model: config
        .model
        .enabled
        .then(|| StrengthModel::new(config.model.draw_factor)),
      stats_season: config.provider.season,
      bookmaker_links: config.provider.bookmaker_links.clone(),
      accumulator: config.accumulator.enabled.then(|| AccumulatorRule {
        legs: config.accumulator.legs,
        max_leg_odd: config.accumulator.max_leg_odd,
        min_confidence: config.accumulator.min_confidence,
      }),
      fan_out: config.schedule.fan_out.max(1),
      dry_run: config.service.dry_run,
    }
  }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
  pub date: Option<NaiveDate>,
  /// Fixtures returned by the provider.
  pub events_seen: usize,
  /// Fixtures whose odds could not be fetched or stored.
  pub events_failed: usize,
  pub markets_valued: usize,
  pub markets_rejected: usize,
  pub tips_published: usize,
  pub surebets: usize,
  pub accumulator_built: bool,
}

/// Result of valuing one fixture's quotes. Pure data, nothing persisted.
#[derive(Debug, Clone, Default)]
pub struct EventValuation {
  pub tips: Vec<Tip>,
  pub surebets: Vec<Surebet>,
  pub markets_valued: usize,
  /// Rejection reason per skipped market.
  pub rejected: Vec<&'static str>,
}

/// Value every market of one event.
///
/// `strengths` carries home/away team strength when the model should run.
pub fn value_event(
  settings: &PipelineSettings,
  event_id: &str,
  quotes: &[BookmakerQuote],
  strengths: Option<(TeamStrength, TeamStrength)>,
) -> EventValuation {
  let mut valuation = EventValuation {
    surebets: detect_surebets(event_id, quotes),
    ..EventValuation::default()
  };
  let prediction = settings
    .model
    .as_ref()
    .zip(strengths)
    .map(|(model, (home, away))| model.predict(home, away));

  for book in select_books(quotes, &settings.selection) {
    let market = book.to_market_quotes(event_id);
    let set = match settings.engine.normalize(&market) {
      Ok(set) => set,
      Err(e) => {
        warn!(event_id, market = %market.market, error = %e, "Skipping market with invalid odds");
        valuation.rejected.push("invalid_odds");
        continue;
      }
    };

    if !set.is_valuable() {
      debug!(event_id, market = %market.market, "Skipping single-outcome market");
      valuation.rejected.push("single_outcome");
      continue;
    }

    let set = match prediction.and_then(|p| p.overrides_for(set.market())) {
      Some(overrides) => adjust_with_model(settings, set, &overrides),
      None => set,
    };

    valuation.markets_valued += 1;

    for valued in settings.engine.evaluate(&set) {
      let classification = valued.classification;
      if !classification.stake.is_recommended()
        || valued.outcome.expected_value <= settings.min_expected_value
      {
        continue;
      }
      let stake_fraction = settings.sizer.stake_fraction(
        valued.outcome.fair_probability,
        valued.outcome.quoted_odd,
        classification.stake,
      );
      let tip = Tip::new(&set, &valued, stake_fraction)
        .with_bookmaker(book.bookmaker_for(&valued.outcome.label));
      valuation.tips.push(tip);
    }
  }

  rank_by_value(&mut valuation.tips);
  valuation
}

/// Apply model overrides; on error keep the market-only set.
fn adjust_with_model(
  settings: &PipelineSettings,
  set: EventOutcomeSet,
  overrides: &HashMap<String, f64>,
) -> EventOutcomeSet {
  match settings.engine.apply_model_adjustment(&set, overrides) {
    Ok(adjusted) => adjusted,
    Err(e) => {
      warn!(
        event_id = set.event_id(),
        market = set.market(),
        error = %e,
        "Model override rejected, keeping market probabilities"
      );
      set
    }
  }
}

/// Orchestrates provider, engine and store for a whole day.
pub struct TipPipeline<P: OddsProvider, S: TipStore> {
  provider: Arc<P>,
  store: Arc<S>,
  metrics: Arc<MetricsRegistry>,
  settings: RwLock<Arc<PipelineSettings>>,
  /// Serializes runs (scheduler and manual trigger).
  run_lock: Mutex<()>,
}

impl<P: OddsProvider, S: TipStore> TipPipeline<P, S> {
  pub fn new(
    provider: Arc<P>,
    store: Arc<S>,
    metrics: Arc<MetricsRegistry>,
    settings: PipelineSettings,
  ) -> Self {
    Self {
      provider,
      store,
      metrics,
      settings: RwLock::new(Arc::new(settings)),
      run_lock: Mutex::new(()),
    }
  }

  /// Current settings snapshot.
  pub async fn settings(&self) -> Arc<PipelineSettings> {
    Arc::clone(&*self.settings.read().await)
  }

  /// Swap settings; takes effect on the next run.
  pub async fn update_settings(&self, settings: PipelineSettings) {
    *self.settings.write().await = Arc::new(settings);
    info!("Pipeline settings updated");
  }

  pub fn provider(&self) -> &Arc<P> {
    &self.provider
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  /// Run the pipeline for fixtures on `date`.
  ///
  /// Fails only when fixtures cannot be listed or the daily extras
  /// cannot be saved; per-fixture errors are counted in the report.
  #[instrument(skip(self), name = "tip_pipeline")]
  pub async fn run(&self, date: NaiveDate) -> Result<RunReport> {
    let _guard = self.run_lock.lock().await;
    let started = Instant::now();
    let result = self.run_inner(date).await;

    self
      .metrics
      .run_duration_seconds
      .observe(started.elapsed().as_secs_f64());
    let outcome = if result.is_ok() { "ok" } else { "error" };
    self.metrics.pipeline_runs.with_label_values(&[outcome]).inc();

    result
  }

  async fn run_inner(&self, date: NaiveDate) -> Result<RunReport> {
    let settings = self.settings().await;
    let fixtures = self.provider.fixtures_on(date).await?;

    let mut report = RunReport {
      date: Some(date),
      events_seen: fixtures.len(),
      ..RunReport::default()
    };

    info!(
      fixtures = fixtures.len(),
      fan_out = settings.fan_out,
      dry_run = settings.dry_run,
      "Starting valuation run"
    );

    let now = Utc::now();
    let results: Vec<(u64, Result<EventValuation>)> = stream::iter(fixtures.into_iter())
      .map(|fixture: Fixture| {
        let settings = Arc::clone(&settings);
        async move {
          let result = self.process_fixture(&fixture, &settings, now).await;
          (fixture.id, result)
        }
      })
      .buffer_unordered(settings.fan_out)
      .collect()
      .await;

    let mut all_tips = Vec::new();
    let mut all_surebets = Vec::new();

    for (fixture_id, result) in results {
      match result {
        Ok(valuation) => {
          report.markets_valued += valuation.markets_valued;
          report.markets_rejected += valuation.rejected.len();
          report.tips_published += valuation.tips.len();
          all_tips.extend(valuation.tips);
          all_surebets.extend(valuation.surebets);
        }
        Err(e) => {
          warn!(fixture_id, error = %e, "Fixture skipped");
          report.events_failed += 1;
        }
      }
    }

    report.surebets = all_surebets.len();
    self.metrics.surebets_found.inc_by(all_surebets.len() as u64);

    let accumulators: Vec<_> = settings
      .accumulator
      .as_ref()
      .and_then(|rule| rule.build(&all_tips))
      .into_iter()
      .collect();
    report.accumulator_built = !accumulators.is_empty();
    if report.accumulator_built {
      self.metrics.accumulators_built.inc();
    }

    if !settings.dry_run {
      self.store.save_accumulators(&accumulators).await?;
      self.store.save_surebets(&all_surebets).await?;
    }

    info!(
      events = report.events_seen,
      failed = report.events_failed,
      markets = report.markets_valued,
      rejected = report.markets_rejected,
      tips = report.tips_published,
      surebets = report.surebets,
      accumulator = report.accumulator_built,
      "Valuation run complete"
    );

    Ok(report)
  }

  /// Fetch, value and persist one fixture.
  async fn process_fixture(
    &self,
    fixture: &Fixture,
    settings: &PipelineSettings,
    now: DateTime<Utc>,
  ) -> Result<EventValuation> {
    let event_id = fixture.event_id();
    let quotes = self.provider.odds_for(fixture.id).await?;

    let wants_model =
      settings.model.is_some() && quotes.iter().any(|q| is_model_market(&q.market));
    let strengths = if wants_model {
      let season = settings.stats_season.unwrap_or(fixture.season);
      self.fetch_strengths(fixture, season).await
    } else {
      None
    };

    let valuation = value_event(settings, &event_id, &quotes, strengths);

    self.metrics.markets_valued.inc_by(valuation.markets_valued as u64);
    for reason in &valuation.rejected {
      self.metrics.markets_rejected.with_label_values(&[*reason]).inc();
    }
    for tip in &valuation.tips {
      self
        .metrics
        .tips_published
        .with_label_values(&[&tip.confidence.to_string()])
        .inc();
    }

    if !settings.dry_run {
      let title = fixture.title();
      let context = TipContext {
        title: &title,
        league: &fixture.league_name,
        kickoff: fixture.kickoff,
        bookmaker_links: &settings.bookmaker_links,
      };
      let records: Vec<TipRecord> = valuation
        .tips
        .iter()
        .map(|tip| TipRecord::from_tip(tip, context, now))
        .collect();
      self.store.replace_event_tips(&event_id, &records).await?;
    }

    debug!(
      event_id,
      markets = valuation.markets_valued,
      tips = valuation.tips.len(),
      "Fixture valued"
    );
    Ok(valuation)
  }

  /// Team strengths for the model. A team without statistics counts as
  /// neutral; when neither team has any the model is skipped.
  async fn fetch_strengths(
    &self,
    fixture: &Fixture,
    season: i32,
  ) -> Option<(TeamStrength, TeamStrength)> {
    let (home, away) = tokio::join!(
      self
        .provider
        .team_strength(fixture.home.id, fixture.league_id, season),
      self
        .provider
        .team_strength(fixture.away.id, fixture.league_id, season),
    );

    let home = home.unwrap_or_else(|e| {
      warn!(team_id = fixture.home.id, error = %e, "Team statistics unavailable");
      None
    });
    let away = away.unwrap_or_else(|e| {
      warn!(team_id = fixture.away.id, error = %e, "Team statistics unavailable");
      None
    });

    match (home, away) {
      (None, None) => None,
      (home, away) => Some((home.unwrap_or_default(), away.unwrap_or_default())),
    }
  }
}

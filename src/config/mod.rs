//! Configuration Module - TOML-based Engine Configuration
//!
//! Loads and validates configuration from `config.toml`. Secrets never
//! live in the file: the provider API key is read from the environment
//! variable named in `[provider]`. Tier thresholds, stake sizing and
//! model parameters are externalized here so they can be tuned and hot
//! reloaded without a rebuild.

pub mod hot_reload;
pub mod loader;

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::quotes::QuoteSelection;
use crate::domain::tiers::{ConfidenceTier, TierPolicy};

/// Top-level engine configuration.
///
/// Loaded from `config.toml` at startup. Every section except
/// `[service]` may be omitted and falls back to its defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity and run mode.
  pub service: ServiceConfig,
  /// Sports data provider access.
  #[serde(default)]
  pub provider: ProviderConfig,
  /// Tier policy and stake sizing.
  #[serde(default)]
  pub valuation: ValuationConfig,
  /// Strength model used for match-winner overrides.
  #[serde(default)]
  pub model: ModelConfig,
  /// Daily accumulator rules.
  #[serde(default)]
  pub accumulator: AccumulatorConfig,
  /// Pipeline scheduling.
  #[serde(default)]
  pub schedule: ScheduleConfig,
  /// HTTP API server.
  #[serde(default)]
  pub api: ApiConfig,
  /// Metrics and monitoring.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Persistence configuration.
  #[serde(default)]
  pub persistence: PersistenceConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Value markets but never persist tips.
  #[serde(default)]
  pub dry_run: bool,
}

/// Sports data provider configuration (API-Football).
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
  /// REST API base URL.
  #[serde(default = "default_provider_url")]
  pub base_url: String,
  /// Environment variable holding the API key.
  #[serde(default = "default_api_key_env")]
  pub api_key_env: String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// Maximum in-flight requests.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
  /// Maximum retries on transient errors.
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff).
  #[serde(default = "default_retry_delay")]
  pub retry_base_delay_ms: u64,
  /// Request budget per minute.
  #[serde(default = "default_requests_per_minute")]
  pub requests_per_minute: u32,
  /// Followed league ids.
  #[serde(default = "default_leagues")]
  pub leagues: Vec<u32>,
  /// Season for team statistics. Unset uses each fixture's league season.
  #[serde(default)]
  pub season: Option<i32>,
  /// Provider bet names to value (untranslated, e.g. "Match Winner").
  #[serde(default = "default_markets")]
  pub markets: Vec<String>,
  /// Representative price per outcome.
  #[serde(default)]
  pub selection: QuoteSelection,
  /// Site base URL per bookmaker key, used to build bet links.
  #[serde(default = "default_bookmaker_links")]
  pub bookmaker_links: HashMap<String, String>,
}

/// Valuation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ValuationConfig {
  /// Quality-score thresholds.
  #[serde(default)]
  pub tiers: TierPolicy,
  /// Minimum expected value for a tip to be published.
  #[serde(default = "default_min_ev")]
  pub min_expected_value: f64,
  /// Kelly fraction multiplier (0.25 = quarter-Kelly).
  #[serde(default = "default_kelly_fraction")]
  pub kelly_fraction: f64,
  /// Hard cap on any single stake as fraction of bankroll.
  #[serde(default = "default_max_stake_fraction")]
  pub max_stake_fraction: f64,
}

/// Strength model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
  /// Override match-winner probabilities with the model.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Damping applied when deriving the draw share.
  #[serde(default = "default_draw_factor")]
  pub draw_factor: f64,
}

/// Accumulator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccumulatorConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Number of legs.
  #[serde(default = "default_legs")]
  pub legs: usize,
  /// Legs must be priced below this odd.
  #[serde(default = "default_max_leg_odd")]
  pub max_leg_odd: f64,
  /// Weakest confidence a leg may have.
  #[serde(default = "default_min_confidence")]
  pub min_confidence: ConfidenceTier,
}

/// Scheduling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
  /// Seconds between pipeline runs.
  #[serde(default = "default_interval")]
  pub interval_seconds: u64,
  /// Run once immediately at startup.
  #[serde(default = "default_true")]
  pub run_on_start: bool,
  /// Fixtures whose odds are fetched concurrently.
  #[serde(default = "default_fan_out")]
  pub fan_out: usize,
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// API server bind address.
  #[serde(default = "default_api_addr")]
  pub bind_address: String,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory for tips, history and daily extras.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for ProviderConfig {
  fn default() -> Self {
    Self {
      base_url: default_provider_url(),
      api_key_env: default_api_key_env(),
      timeout_seconds: default_timeout(),
      max_concurrent: default_max_concurrent(),
      max_retries: default_max_retries(),
      retry_base_delay_ms: default_retry_delay(),
      requests_per_minute: default_requests_per_minute(),
      leagues: default_leagues(),
      season: None,
      markets: default_markets(),
      selection: QuoteSelection::default(),
      bookmaker_links: default_bookmaker_links(),
    }
  }
}

impl Default for ValuationConfig {
  fn default() -> Self {
    Self {
      tiers: TierPolicy::default(),
      min_expected_value: default_min_ev(),
      kelly_fraction: default_kelly_fraction(),
      max_stake_fraction: default_max_stake_fraction(),
    }
  }
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      draw_factor: default_draw_factor(),
    }
  }
}

impl Default for AccumulatorConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      legs: default_legs(),
      max_leg_odd: default_max_leg_odd(),
      min_confidence: default_min_confidence(),
    }
  }
}

impl Default for ScheduleConfig {
  fn default() -> Self {
    Self {
      interval_seconds: default_interval(),
      run_on_start: true,
      fan_out: default_fan_out(),
    }
  }
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      bind_address: default_api_addr(),
    }
  }
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_addr(),
    }
  }
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_provider_url() -> String {
  "https://v3.football.api-sports.io".to_string()
}

fn default_api_key_env() -> String {
  "API_FOOTBALL_KEY".to_string()
}

fn default_timeout() -> u64 {
  30
}

fn default_max_concurrent() -> usize {
  4
}

fn default_max_retries() -> u32 {
  3
}

fn default_retry_delay() -> u64 {
  500
}

fn default_requests_per_minute() -> u32 {
  30
}

fn default_leagues() -> Vec<u32> {
  // Brasileirão A/B, Libertadores, Sul-Americana, then the European top
  // five, Liga Portugal, Champions League and Europa League
  vec![71, 72, 6, 9, 39, 140, 135, 61, 78, 94, 2, 3]
}

fn default_bookmaker_links() -> HashMap<String, String> {
  HashMap::from([
    ("betano".to_string(), "https://betano.com".to_string()),
    ("bet365".to_string(), "https://bet365.com".to_string()),
    ("sportingbet".to_string(), "https://sportingbet.com".to_string()),
  ])
}

fn default_markets() -> Vec<String> {
  vec![
    "Match Winner".to_string(),
    "Goals Over/Under".to_string(),
    "Both Teams Score".to_string(),
  ]
}

fn default_min_ev() -> f64 {
  0.0
}

fn default_kelly_fraction() -> f64 {
  0.25
}

fn default_max_stake_fraction() -> f64 {
  0.05
}

fn default_draw_factor() -> f64 {
  0.65
}

fn default_legs() -> usize {
  3
}

fn default_max_leg_odd() -> f64 {
  2.0
}

fn default_min_confidence() -> ConfidenceTier {
  ConfidenceTier::High
}

fn default_interval() -> u64 {
  3_600
}

fn default_fan_out() -> usize {
  4
}

fn default_api_addr() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_data_dir() -> String {
  "data".to_string()
}

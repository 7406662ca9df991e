//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "LANZACA_CONFIG";

/// Config file used when `LANZACA_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Resolve the config file path from the environment.
pub fn config_path() -> String {
  std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    leagues = config.provider.leagues.len(),
    markets = config.provider.markets.len(),
    kelly = config.valuation.kelly_fraction,
    model = config.model.enabled,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Positive numeric values where required
/// - Valid probability and fraction ranges
/// - Strictly descending tier thresholds
/// - Non-empty league and market lists
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(!config.service.name.is_empty(), "service.name must not be empty");

  // Provider validation
  let provider = &config.provider;
  anyhow::ensure!(!provider.base_url.is_empty(), "Provider base_url must not be empty");
  anyhow::ensure!(
    !provider.api_key_env.is_empty(),
    "Provider api_key_env must name an environment variable"
  );
  anyhow::ensure!(provider.timeout_seconds > 0, "Provider timeout_seconds must be positive");
  anyhow::ensure!(
    provider.max_concurrent > 0,
    "Provider max_concurrent must be positive"
  );
  anyhow::ensure!(
    provider.requests_per_minute > 0,
    "Provider requests_per_minute must be positive"
  );
  anyhow::ensure!(
    !provider.leagues.is_empty(),
    "At least one league must be configured"
  );
  anyhow::ensure!(
    !provider.markets.is_empty(),
    "At least one market must be configured"
  );

  // Valuation validation
  let valuation = &config.valuation;
  anyhow::ensure!(
    valuation.tiers.is_well_formed(),
    "Tier thresholds must be finite and strictly descending (very_high > high > medium > low), \
     with a positive ev_weight"
  );
  anyhow::ensure!(
    valuation.min_expected_value.is_finite() && valuation.min_expected_value >= 0.0,
    "min_expected_value must be a non-negative number, got {}",
    valuation.min_expected_value
  );
  anyhow::ensure!(
    valuation.kelly_fraction > 0.0 && valuation.kelly_fraction <= 1.0,
    "Kelly fraction must be in (0, 1], got {}",
    valuation.kelly_fraction
  );
  anyhow::ensure!(
    valuation.max_stake_fraction > 0.0 && valuation.max_stake_fraction <= 1.0,
    "max_stake_fraction must be in (0, 1], got {}",
    valuation.max_stake_fraction
  );

  // Model validation
  anyhow::ensure!(
    config.model.draw_factor > 0.0 && config.model.draw_factor < 2.0,
    "draw_factor must be in (0, 2), got {}",
    config.model.draw_factor
  );

  // Accumulator validation
  anyhow::ensure!(
    config.accumulator.legs >= 2,
    "Accumulator needs at least 2 legs, got {}",
    config.accumulator.legs
  );
  anyhow::ensure!(
    config.accumulator.max_leg_odd > 1.0,
    "Accumulator max_leg_odd must be above 1.0, got {}",
    config.accumulator.max_leg_odd
  );

  // Schedule validation
  anyhow::ensure!(
    config.schedule.interval_seconds >= 60,
    "Schedule interval_seconds must be at least 60, got {}",
    config.schedule.interval_seconds
  );
  anyhow::ensure!(config.schedule.fan_out > 0, "Schedule fan_out must be positive");

  anyhow::ensure!(
    !config.api.bind_address.is_empty(),
    "API bind_address must not be empty"
  );
  anyhow::ensure!(
    !config.persistence.data_dir.is_empty(),
    "Persistence data_dir must not be empty"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::quotes::QuoteSelection;
  use crate::domain::tiers::ConfidenceTier;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = parse_config("[service]\nname = \"lanzaca\"\n").unwrap();
    assert_eq!(config.provider.base_url, "https://v3.football.api-sports.io");
    assert_eq!(config.provider.api_key_env, "API_FOOTBALL_KEY");
    assert_eq!(config.provider.leagues.len(), 12);
    assert_eq!(config.provider.selection, QuoteSelection::Best);
    assert_eq!(config.provider.season, None);
    assert_eq!(config.provider.bookmaker_links["betano"], "https://betano.com");
    assert_eq!(config.valuation.tiers.very_high, 1.8);
    assert_eq!(config.accumulator.legs, 3);
    assert_eq!(config.accumulator.min_confidence, ConfidenceTier::High);
    assert!((config.model.draw_factor - 0.65).abs() < f64::EPSILON);
    assert!(!config.service.dry_run);
  }

  #[test]
  fn test_overrides_parse() {
    let toml = r#"
[service]
name = "lanzaca"
dry_run = true

[provider]
leagues = [71]
season = 2023
selection = { bookmaker = "bet365" }

[provider.bookmaker_links]
bet365 = "https://www.bet365.com"

[valuation.tiers]
very_high = 2.0
high = 1.7

[accumulator]
min_confidence = "VERY_HIGH"
"#;
    let config = parse_config(toml).unwrap();
    assert!(config.service.dry_run);
    assert_eq!(config.provider.leagues, vec![71]);
    assert_eq!(config.provider.selection, QuoteSelection::Bookmaker("bet365".to_string()));
    assert_eq!(config.provider.season, Some(2023));
    assert_eq!(config.provider.bookmaker_links.len(), 1);
    assert_eq!(config.valuation.tiers.very_high, 2.0);
    assert_eq!(config.valuation.tiers.medium, 1.4);
    assert_eq!(config.accumulator.min_confidence, ConfidenceTier::VeryHigh);
  }

  #[test]
  fn test_rejects_unordered_tiers() {
    let toml = "[service]\nname = \"x\"\n[valuation.tiers]\nhigh = 1.9\n";
    let err = parse_config(toml).unwrap_err();
    assert!(err.to_string().contains("Tier thresholds"));
  }

  #[test]
  fn test_rejects_bad_kelly_fraction() {
    let toml = "[service]\nname = \"x\"\n[valuation]\nkelly_fraction = 1.5\n";
    assert!(parse_config(toml).is_err());
  }

  #[test]
  fn test_rejects_single_leg_accumulator() {
    let toml = "[service]\nname = \"x\"\n[accumulator]\nlegs = 1\n";
    assert!(parse_config(toml).is_err());
  }
}

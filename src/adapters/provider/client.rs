//! Provider HTTP Client - Rate-limited REST API Client
//!
//! Wraps reqwest with a concurrency cap, a per-minute request budget
//! (governor token bucket) and exponential-backoff retries for the
//! API-Football REST API.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::config::ProviderConfig;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-apisports-key";

/// Configuration for the provider HTTP client.
#[derive(Debug, Clone)]
pub struct ProviderClientConfig {
  /// Base URL for the REST API.
  pub base_url: String,
  /// API key sent on every request.
  pub api_key: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum concurrent requests.
  pub max_concurrent: usize,
  /// Maximum retries on transient errors.
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff).
  pub retry_base_delay: Duration,
  /// Request budget per minute.
  pub requests_per_minute: u32,
}

impl ProviderClientConfig {
  /// Build from `[provider]`, reading the API key from its env var.
  pub fn from_config(config: &ProviderConfig) -> Result<Self> {
    let api_key = std::env::var(&config.api_key_env)
      .with_context(|| format!("Missing provider API key in ${}", config.api_key_env))?;
    anyhow::ensure!(!api_key.trim().is_empty(), "${} is empty", config.api_key_env);

    Ok(Self {
      base_url: config.base_url.trim_end_matches('/').to_string(),
      api_key,
      timeout: Duration::from_secs(config.timeout_seconds),
      max_concurrent: config.max_concurrent,
      max_retries: config.max_retries,
      retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
      requests_per_minute: config.requests_per_minute,
    })
  }
}

/// Rate-limited HTTP client for the sports data provider.
pub struct ProviderClient {
  http: Client,
  config: ProviderClientConfig,
  /// Concurrency limiter.
  semaphore: Arc<Semaphore>,
  /// Request budget.
  limiter: DirectLimiter,
  metrics: Option<Arc<MetricsRegistry>>,
}

impl ProviderClient {
  /// Create a new provider client.
  pub fn new(config: ProviderClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(config.max_concurrent)
      .build()
      .context("Failed to build HTTP client")?;

    let per_minute = NonZeroU32::new(config.requests_per_minute)
      .context("requests_per_minute must be positive")?;
    let limiter = RateLimiter::direct(Quota::per_minute(per_minute));

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

    Ok(Self {
      http,
      config,
      semaphore,
      limiter,
      metrics: None,
    })
  }

  /// Record request latency and failures.
  pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  /// GET `path` with query parameters and decode the JSON body.
  ///
  /// `endpoint` is a short label used in logs and metrics.
  pub async fn get_json<T: DeserializeOwned>(
    &self,
    endpoint: &'static str,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<T> {
    let started = Instant::now();
    let result = self.execute_with_retry(endpoint, path, query).await;

    if let Some(metrics) = &self.metrics {
      metrics
        .provider_latency_seconds
        .with_label_values(&[endpoint])
        .observe(started.elapsed().as_secs_f64());
      if result.is_err() {
        metrics.provider_errors.with_label_values(&[endpoint]).inc();
      }
    }

    let body = result?;
    serde_json::from_str(&body).with_context(|| format!("Failed to decode {endpoint} response"))
  }

  /// Execute request with rate limiting and retries, returning the body.
  async fn execute_with_retry(
    &self,
    endpoint: &'static str,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<String> {
    let _permit = self
      .semaphore
      .acquire()
      .await
      .context("Semaphore closed")?;

    let url = format!("{}{}", self.config.base_url, path);
    let mut last_error = None;

    for attempt in 0..=self.config.max_retries {
      if attempt > 0 {
        let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
        debug!(endpoint, attempt, delay_ms = delay.as_millis(), "Retrying request");
        sleep(delay).await;
      }

      self.limiter.until_ready().await;

      let request = self
        .http
        .get(&url)
        .header(API_KEY_HEADER, &self.config.api_key)
        .query(query);

      match request.send().await {
        Ok(response) => match response.status() {
          StatusCode::OK => {
            return response
              .text()
              .await
              .with_context(|| format!("Failed to read {endpoint} body"));
          }
          StatusCode::TOO_MANY_REQUESTS => {
            warn!(endpoint, attempt, "Rate limited by provider, backing off");
            last_error = Some(anyhow::anyhow!("Rate limited"));
          }
          status if status.is_server_error() => {
            warn!(endpoint, status = %status, attempt, "Server error, retrying");
            last_error = Some(anyhow::anyhow!("Server error: {status}"));
          }
          status => {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Provider error {status} on {endpoint}: {body}"));
          }
        },
        Err(e) => {
          warn!(endpoint, error = %e, attempt, "Request failed");
          last_error = Some(e.into());
        }
      }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Max retries exceeded")))
  }
}

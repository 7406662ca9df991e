//! Sports Data Provider Adapter (API-Football)
//!
//! Implements the `OddsProvider` port over the API-Football v3 REST API.
//!
//! Sub-modules:
//! - `client`: HTTP client with rate limiting and retries
//! - `api_football`: fixtures, odds and team statistics
//! - `localize`: Portuguese market and outcome names
//! - `types`: API response type definitions

pub mod api_football;
pub mod client;
pub mod localize;
pub mod types;

pub use api_football::ApiFootballProvider;
pub use client::{ProviderClient, ProviderClientConfig};

//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `OddsProvider`: Fixtures, bookmaker odds and team statistics
//! - `TipStore`: Published tips, accumulators and surebets

pub mod odds_provider;
pub mod tip_store;

pub use odds_provider::{Fixture, OddsProvider, TeamRef};
pub use tip_store::{TipContext, TipRecord, TipStore};

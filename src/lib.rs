//! Lanzaca Engine - Library Root
//!
//! Football odds valuation: de-vigging, model adjustment, tier
//! classification and the daily tip pipeline. Re-exports all modules
//! for the binary, integration tests and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;

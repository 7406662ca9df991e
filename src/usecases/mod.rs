//! Use Cases Layer - Application Workflows
//!
//! Orchestrates the valuation domain with the provider and store ports.
//!
//! Use cases:
//! - `TipPipeline`: one run over the day's fixtures (valuation, tips,
//!   surebets, accumulator)
//! - `Scheduler`: periodic runs and settings hot-swap

pub mod scheduler;
pub mod tip_pipeline;

pub use scheduler::Scheduler;
pub use tip_pipeline::{EventValuation, PipelineSettings, RunReport, TipPipeline};

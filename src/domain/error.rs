//! Domain validation errors.
//!
//! `normalize` can only fail with [`InvalidOddsError`]; the model
//! override stage can only fail with [`AdjustmentError`]. Classification
//! is infallible.

use thiserror::Error;

/// Raised when a bookmaker outcome set cannot be de-vigged.
///
/// Non-recoverable inside the engine: the caller must repair or drop the
/// upstream data. There is no partial success for a single set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidOddsError {
    /// The outcome set had no outcomes at all.
    #[error("outcome set is empty")]
    Empty,

    /// A decimal odd at or below 1.0 (or not a finite number).
    #[error("outcome {label:?} has quoted odd {odd}, expected a finite value > 1.0")]
    OddNotAboveOne {
        /// Label of the offending outcome.
        label: String,
        /// The odd as received.
        odd: f64,
    },

    /// Two outcomes in the same set share a label.
    #[error("outcome label {label:?} appears more than once")]
    DuplicateLabel {
        /// The repeated label.
        label: String,
    },
}

/// Raised when a model override cannot be applied to an outcome set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdjustmentError {
    /// The override names an outcome the set does not contain.
    #[error("no outcome labelled {label:?} in this set")]
    UnknownOutcome {
        /// Label given by the caller.
        label: String,
    },

    /// The override probability is outside [0, 1] or not finite.
    #[error("model probability {probability} for {label:?} is outside [0, 1]")]
    ProbabilityOutOfRange {
        /// Label given by the caller.
        label: String,
        /// Probability given by the caller.
        probability: f64,
    },

    /// Overrides leave no probability mass (or negative mass) for the rest.
    #[error("model probabilities sum to {total}, cannot renormalize the set")]
    OverridesExceedUnity {
        /// Sum of the override probabilities.
        total: f64,
    },
}

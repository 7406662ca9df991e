//! Odds valuation engine: de-vigging, model overrides, classification.
//!
//! Pure and synchronous. Holds nothing but an immutable tier policy, so a
//! single engine can be shared across threads and tasks without locking.
//!
//! Pipeline for one market:
//! 1. `normalize`: raw implied probabilities, overround removal, EV
//! 2. `apply_model_adjustment` (optional): replace some fair probabilities
//!    with a model's estimate and rescale the rest
//! 3. `classify`: confidence and stake tier per outcome

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::error::{AdjustmentError, InvalidOddsError};
use super::odds::{EventOutcomeSet, MarketQuotes, Outcome, OutcomeQuote, expected_value};
use super::tiers::{Classification, TierPolicy};

/// Tolerance used when checking that probabilities sum to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// An outcome together with its tier classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuedOutcome {
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Converts bookmaker odds into fair probabilities, EV and tiers.
#[derive(Debug, Clone, Default)]
pub struct OddsValuationEngine {
    policy: TierPolicy,
}

impl OddsValuationEngine {
    pub fn new(policy: TierPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    /// De-vig one market.
    ///
    /// Each outcome gets `raw = 1 / odd`, `fair = raw / overround` and
    /// `ev = odd * fair - 1`. Fair probabilities sum to one within
    /// [`PROBABILITY_TOLERANCE`]. An overround below 1.0 (synthetic data)
    /// is accepted since the rescaling is still well defined.
    ///
    /// # Errors
    /// [`InvalidOddsError`] if the set is empty, an odd is not a finite
    /// value above 1.0, or a label repeats. Nothing is returned on error.
    pub fn normalize(&self, quotes: &MarketQuotes) -> Result<EventOutcomeSet, InvalidOddsError> {
        validate_quotes(&quotes.quotes)?;

        let raw: Vec<f64> = quotes.quotes.iter().map(|q| 1.0 / q.quoted_odd).collect();
        let overround: f64 = raw.iter().sum();

        let outcomes = quotes
            .quotes
            .iter()
            .zip(&raw)
            .map(|(quote, &raw_probability)| {
                let fair_probability = raw_probability / overround;
                Outcome {
                    label: quote.label.clone(),
                    quoted_odd: quote.quoted_odd,
                    raw_probability,
                    fair_probability,
                    expected_value: expected_value(quote.quoted_odd, fair_probability),
                }
            })
            .collect();

        Ok(EventOutcomeSet::from_parts(
            quotes.event_id.clone(),
            quotes.market.clone(),
            overround,
            false,
            outcomes,
        ))
    }

    /// Replace fair probabilities with model estimates.
    ///
    /// Overridden outcomes take the model value; the others are rescaled
    /// proportionally so the set still sums to one. When every outcome is
    /// overridden the overrides are rescaled by their own total. Expected
    /// values are recomputed for the whole set; raw probabilities and the
    /// overround are carried over.
    ///
    /// # Errors
    /// [`AdjustmentError`] for unknown labels, probabilities outside
    /// `[0, 1]`, or overrides that leave no room for the remaining outcomes.
    pub fn apply_model_adjustment(
        &self,
        set: &EventOutcomeSet,
        overrides: &HashMap<String, f64>,
    ) -> Result<EventOutcomeSet, AdjustmentError> {
        if overrides.is_empty() {
            return Ok(set.clone());
        }

        for (label, &probability) in overrides {
            if set.outcome(label).is_none() {
                return Err(AdjustmentError::UnknownOutcome {
                    label: label.clone(),
                });
            }
            if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
                return Err(AdjustmentError::ProbabilityOutOfRange {
                    label: label.clone(),
                    probability,
                });
            }
        }

        // Summed in outcome order so the result is reproducible.
        let override_total: f64 = set
            .outcomes()
            .iter()
            .filter_map(|o| overrides.get(&o.label))
            .sum();
        let remaining_total: f64 = set
            .outcomes()
            .iter()
            .filter(|o| !overrides.contains_key(&o.label))
            .map(|o| o.fair_probability)
            .sum();
        let all_overridden = set.outcomes().iter().all(|o| overrides.contains_key(&o.label));

        let (override_scale, remaining_scale) = if all_overridden {
            if override_total <= 0.0 {
                return Err(AdjustmentError::OverridesExceedUnity {
                    total: override_total,
                });
            }
            (1.0 / override_total, 0.0)
        } else {
            if override_total > 1.0 + PROBABILITY_TOLERANCE {
                return Err(AdjustmentError::OverridesExceedUnity {
                    total: override_total,
                });
            }
            let free_mass = (1.0 - override_total).max(0.0);
            if remaining_total <= 0.0 {
                if free_mass > PROBABILITY_TOLERANCE {
                    return Err(AdjustmentError::OverridesExceedUnity {
                        total: override_total,
                    });
                }
                (1.0, 0.0)
            } else {
                (1.0, free_mass / remaining_total)
            }
        };

        let outcomes = set
            .outcomes()
            .iter()
            .map(|o| {
                let fair_probability = overrides
                    .get(&o.label)
                    .map_or(o.fair_probability * remaining_scale, |p| p * override_scale);
                Outcome {
                    label: o.label.clone(),
                    quoted_odd: o.quoted_odd,
                    raw_probability: o.raw_probability,
                    fair_probability,
                    expected_value: expected_value(o.quoted_odd, fair_probability),
                }
            })
            .collect();

        Ok(EventOutcomeSet::from_parts(
            set.event_id().to_string(),
            set.market().to_string(),
            set.overround(),
            true,
            outcomes,
        ))
    }

    /// Confidence and stake tier for one valued outcome. Never fails.
    pub fn classify(&self, outcome: &Outcome) -> Classification {
        self.policy
            .classify(outcome.expected_value, outcome.fair_probability)
    }

    /// Classify every outcome of a set, preserving order.
    pub fn evaluate(&self, set: &EventOutcomeSet) -> Vec<ValuedOutcome> {
        set.outcomes()
            .iter()
            .map(|outcome| ValuedOutcome {
                outcome: outcome.clone(),
                classification: self.classify(outcome),
            })
            .collect()
    }
}

fn validate_quotes(quotes: &[OutcomeQuote]) -> Result<(), InvalidOddsError> {
    if quotes.is_empty() {
        return Err(InvalidOddsError::Empty);
    }

    let mut seen = HashSet::with_capacity(quotes.len());
    for quote in quotes {
        // Also rejects NaN.
        if !(quote.quoted_odd.is_finite() && quote.quoted_odd > 1.0) {
            return Err(InvalidOddsError::OddNotAboveOne {
                label: quote.label.clone(),
                odd: quote.quoted_odd,
            });
        }
        if !seen.insert(quote.label.as_str()) {
            return Err(InvalidOddsError::DuplicateLabel {
                label: quote.label.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tiers::StakeTier;

    fn three_way() -> MarketQuotes {
        MarketQuotes::new(
            "1035037",
            "Resultado Final",
            vec![
                OutcomeQuote::new("Home", 1.80),
                OutcomeQuote::new("Draw", 3.40),
                OutcomeQuote::new("Away", 4.20),
            ],
        )
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_three_way_market() {
        let engine = OddsValuationEngine::default();
        let set = engine.normalize(&three_way()).unwrap();

        assert!(close(set.overround(), 1.0878, 1e-4), "overround {}", set.overround());
        let raw: Vec<f64> = set.outcomes().iter().map(|o| o.raw_probability).collect();
        let fair: Vec<f64> = set.outcomes().iter().map(|o| o.fair_probability).collect();
        let ev: Vec<f64> = set.outcomes().iter().map(|o| o.expected_value).collect();

        for (got, want) in raw.iter().zip([0.5556, 0.2941, 0.2381]) {
            assert!(close(*got, want, 1e-4), "raw {got} vs {want}");
        }
        for (got, want) in fair.iter().zip([0.5107, 0.2704, 0.2189]) {
            assert!(close(*got, want, 1e-4), "fair {got} vs {want}");
        }
        for (got, want) in ev.iter().zip([-0.0808, -0.0807, -0.0807]) {
            assert!(close(*got, want, 2e-4), "ev {got} vs {want}");
        }
        assert!(close(set.fair_probability_sum(), 1.0, PROBABILITY_TOLERANCE));
        assert!(!set.is_adjusted());
    }

    #[test]
    fn test_even_book_maps_unchanged() {
        let engine = OddsValuationEngine::default();
        let quotes = MarketQuotes::new(
            "e1",
            "Ambas Marcam",
            vec![OutcomeQuote::new("Sim", 2.0), OutcomeQuote::new("Não", 2.0)],
        );
        let set = engine.normalize(&quotes).unwrap();
        assert_eq!(set.overround(), 1.0);
        for o in set.outcomes() {
            assert_eq!(o.fair_probability, 0.5);
            assert_eq!(o.raw_probability, o.fair_probability);
        }
    }

    #[test]
    fn test_rejects_degenerate_odds() {
        let engine = OddsValuationEngine::default();

        let empty = MarketQuotes::new("e", "m", vec![]);
        assert_eq!(engine.normalize(&empty), Err(InvalidOddsError::Empty));

        for odd in [1.0, 0.5, f64::NAN, f64::INFINITY, -3.0] {
            let quotes = MarketQuotes::new("e", "m", vec![OutcomeQuote::new("A", odd)]);
            assert!(
                matches!(
                    engine.normalize(&quotes),
                    Err(InvalidOddsError::OddNotAboveOne { .. })
                ),
                "odd {odd} must be rejected"
            );
        }
    }

    #[test]
    fn test_one_bad_odd_rejects_whole_set() {
        let engine = OddsValuationEngine::default();
        let quotes = MarketQuotes::new(
            "e",
            "m",
            vec![OutcomeQuote::new("A", 1.9), OutcomeQuote::new("B", 1.0)],
        );
        let err = engine.normalize(&quotes).unwrap_err();
        assert_eq!(
            err,
            InvalidOddsError::OddNotAboveOne {
                label: "B".to_string(),
                odd: 1.0
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_labels() {
        let engine = OddsValuationEngine::default();
        let quotes = MarketQuotes::new(
            "e",
            "m",
            vec![OutcomeQuote::new("A", 1.9), OutcomeQuote::new("A", 2.1)],
        );
        assert!(matches!(
            engine.normalize(&quotes),
            Err(InvalidOddsError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_underround_still_normalizes() {
        let engine = OddsValuationEngine::default();
        let quotes = MarketQuotes::new(
            "e",
            "m",
            vec![OutcomeQuote::new("A", 2.5), OutcomeQuote::new("B", 2.5)],
        );
        let set = engine.normalize(&quotes).unwrap();
        assert!(set.overround() < 1.0);
        assert!(close(set.fair_probability_sum(), 1.0, PROBABILITY_TOLERANCE));
        assert!(set.margin() < 0.0);
    }

    #[test]
    fn test_single_outcome_is_not_valuable() {
        let engine = OddsValuationEngine::default();
        let quotes = MarketQuotes::new("e", "m", vec![OutcomeQuote::new("A", 1.5)]);
        let set = engine.normalize(&quotes).unwrap();
        assert!(!set.is_valuable());
        assert!(close(set.outcomes()[0].fair_probability, 1.0, PROBABILITY_TOLERANCE));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let engine = OddsValuationEngine::default();
        let first = engine.normalize(&three_way()).unwrap();
        let second = engine.normalize(&three_way()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_model_override_lifts_home() {
        let engine = OddsValuationEngine::default();
        let set = engine.normalize(&three_way()).unwrap();
        let overrides = HashMap::from([("Home".to_string(), 0.60)]);

        let adjusted = engine.apply_model_adjustment(&set, &overrides).unwrap();
        let home = adjusted.outcome("Home").unwrap();
        let draw = adjusted.outcome("Draw").unwrap();
        let away = adjusted.outcome("Away").unwrap();

        assert_eq!(home.fair_probability, 0.60);
        assert!(close(home.expected_value, 0.08, 1e-12));
        assert!(close(adjusted.fair_probability_sum(), 1.0, PROBABILITY_TOLERANCE));

        // Draw and away keep their relative proportion.
        let before = set.outcome("Draw").unwrap().fair_probability
            / set.outcome("Away").unwrap().fair_probability;
        let after = draw.fair_probability / away.fair_probability;
        assert!(close(before, after, 1e-12));

        // Raw data is untouched.
        assert_eq!(adjusted.overround(), set.overround());
        assert_eq!(home.raw_probability, set.outcome("Home").unwrap().raw_probability);
        assert!(adjusted.is_adjusted());

        // Positive EV alone is not enough: quality = 0.16 + 0.60 stays below 1.2.
        assert_eq!(engine.classify(home).stake, StakeTier::None);
        assert!(draw.expected_value < 0.0);
        assert_eq!(engine.classify(draw).stake, StakeTier::None);
    }

    #[test]
    fn test_override_every_outcome_rescales_overrides() {
        let engine = OddsValuationEngine::default();
        let set = engine.normalize(&three_way()).unwrap();
        let overrides = HashMap::from([
            ("Home".to_string(), 0.5),
            ("Draw".to_string(), 0.3),
            ("Away".to_string(), 0.4),
        ]);
        let adjusted = engine.apply_model_adjustment(&set, &overrides).unwrap();
        assert!(close(adjusted.fair_probability_sum(), 1.0, PROBABILITY_TOLERANCE));
        assert!(close(adjusted.outcome("Home").unwrap().fair_probability, 0.5 / 1.2, 1e-12));
    }

    #[test]
    fn test_override_total_is_order_independent() {
        // 0.1 + 0.2 + 0.3 rounds differently depending on grouping.
        let engine = OddsValuationEngine::default();
        let set = engine.normalize(&three_way()).unwrap();
        let expected = 0.1 / ((0.1 + 0.2) + 0.3);
        for _ in 0..32 {
            let overrides = HashMap::from([
                ("Away".to_string(), 0.3),
                ("Home".to_string(), 0.1),
                ("Draw".to_string(), 0.2),
            ]);
            let adjusted = engine.apply_model_adjustment(&set, &overrides).unwrap();
            assert_eq!(adjusted.outcome("Home").unwrap().fair_probability, expected);
        }
    }

    #[test]
    fn test_adjustment_errors() {
        let engine = OddsValuationEngine::default();
        let set = engine.normalize(&three_way()).unwrap();

        let unknown = HashMap::from([("Visitante".to_string(), 0.3)]);
        assert!(matches!(
            engine.apply_model_adjustment(&set, &unknown),
            Err(AdjustmentError::UnknownOutcome { .. })
        ));

        let out_of_range = HashMap::from([("Home".to_string(), 1.2)]);
        assert!(matches!(
            engine.apply_model_adjustment(&set, &out_of_range),
            Err(AdjustmentError::ProbabilityOutOfRange { .. })
        ));

        let too_much = HashMap::from([("Home".to_string(), 0.7), ("Draw".to_string(), 0.5)]);
        assert!(matches!(
            engine.apply_model_adjustment(&set, &too_much),
            Err(AdjustmentError::OverridesExceedUnity { .. })
        ));
    }

    #[test]
    fn test_empty_override_is_noop() {
        let engine = OddsValuationEngine::default();
        let set = engine.normalize(&three_way()).unwrap();
        let same = engine.apply_model_adjustment(&set, &HashMap::new()).unwrap();
        assert_eq!(set, same);
    }

    #[test]
    fn test_pure_market_never_recommends() {
        let engine = OddsValuationEngine::default();
        let set = engine.normalize(&three_way()).unwrap();
        assert!(
            engine
                .evaluate(&set)
                .iter()
                .all(|v| !v.classification.stake.is_recommended())
        );
    }
}

//! Accumulator ("múltipla") builder.
//!
//! Combines the strongest short-priced tips of the day into one multiple
//! bet. Legs come from different events so their probabilities can be
//! multiplied as independent.

use serde::{Deserialize, Serialize};

use super::odds::expected_value;
use super::tiers::ConfidenceTier;
use super::tip::{Tip, rank_by_value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorLeg {
    pub event_id: String,
    pub market: String,
    pub label: String,
    pub odd: f64,
    pub fair_probability: f64,
    #[serde(default)]
    pub bookmaker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accumulator {
    pub legs: Vec<AccumulatorLeg>,
    /// Product of leg odds.
    pub combined_odd: f64,
    /// Product of leg fair probabilities.
    pub combined_probability: f64,
    pub expected_value: f64,
    /// Weakest confidence among the legs.
    pub confidence: ConfidenceTier,
}

/// Which tips qualify as legs and how many to combine.
#[derive(Debug, Clone)]
pub struct AccumulatorRule {
    pub legs: usize,
    /// Legs must be priced strictly below this odd.
    pub max_leg_odd: f64,
    pub min_confidence: ConfidenceTier,
}

impl Default for AccumulatorRule {
    fn default() -> Self {
        Self {
            legs: 3,
            max_leg_odd: 2.0,
            min_confidence: ConfidenceTier::High,
        }
    }
}

impl AccumulatorRule {
    /// Build the accumulator of the day, or `None` if too few legs qualify.
    ///
    /// Eligible tips are ranked by EV and at most one leg is taken per event.
    pub fn build(&self, tips: &[Tip]) -> Option<Accumulator> {
        if self.legs < 2 {
            return None;
        }

        let mut eligible: Vec<Tip> = tips
            .iter()
            .filter(|t| {
                t.stake.is_recommended()
                    && t.confidence >= self.min_confidence
                    && t.quoted_odd < self.max_leg_odd
            })
            .cloned()
            .collect();
        rank_by_value(&mut eligible);

        let mut legs: Vec<AccumulatorLeg> = Vec::with_capacity(self.legs);
        let mut confidence = ConfidenceTier::VeryHigh;
        for tip in eligible {
            if legs.len() == self.legs {
                break;
            }
            if legs.iter().any(|l| l.event_id == tip.event_id) {
                continue;
            }
            confidence = confidence.min(tip.confidence);
            legs.push(AccumulatorLeg {
                event_id: tip.event_id,
                market: tip.market,
                label: tip.label,
                odd: tip.quoted_odd,
                fair_probability: tip.fair_probability,
                bookmaker: tip.bookmaker,
            });
        }

        if legs.len() < self.legs {
            return None;
        }

        let combined_odd: f64 = legs.iter().map(|l| l.odd).product();
        let combined_probability: f64 = legs.iter().map(|l| l.fair_probability).product();

        Some(Accumulator {
            legs,
            combined_odd,
            combined_probability,
            expected_value: expected_value(combined_odd, combined_probability),
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tiers::StakeTier;

    fn tip(event: &str, odd: f64, prob: f64, confidence: ConfidenceTier) -> Tip {
        Tip {
            event_id: event.to_string(),
            market: "Resultado Final".to_string(),
            label: "Home".to_string(),
            quoted_odd: odd,
            fair_probability: prob,
            expected_value: odd * prob - 1.0,
            confidence,
            stake: StakeTier::High,
            stake_fraction: 0.04,
            model_adjusted: true,
            bookmaker: Some("betano".to_string()),
        }
    }

    #[test]
    fn test_builds_three_leg_multiple() {
        let tips = vec![
            tip("1", 1.85, 0.80, ConfidenceTier::VeryHigh),
            tip("2", 1.70, 0.85, ConfidenceTier::High),
            tip("3", 1.90, 0.75, ConfidenceTier::High),
            tip("4", 2.40, 0.90, ConfidenceTier::VeryHigh), // too long a price
        ];
        let acc = AccumulatorRule::default().build(&tips).unwrap();
        assert_eq!(acc.legs.len(), 3);
        assert!((acc.combined_odd - 1.85 * 1.70 * 1.90).abs() < 1e-12);
        assert!((acc.combined_probability - 0.80 * 0.85 * 0.75).abs() < 1e-12);
        assert_eq!(acc.confidence, ConfidenceTier::High);
        assert!(acc.legs.iter().all(|l| l.event_id != "4"));
        assert_eq!(acc.legs[0].bookmaker.as_deref(), Some("betano"));
    }

    #[test]
    fn test_one_leg_per_event() {
        let tips = vec![
            tip("1", 1.85, 0.80, ConfidenceTier::VeryHigh),
            tip("1", 1.60, 0.90, ConfidenceTier::VeryHigh),
            tip("2", 1.70, 0.85, ConfidenceTier::High),
        ];
        assert!(AccumulatorRule::default().build(&tips).is_none());
    }

    #[test]
    fn test_low_confidence_excluded() {
        let tips = vec![
            tip("1", 1.85, 0.80, ConfidenceTier::Medium),
            tip("2", 1.70, 0.85, ConfidenceTier::High),
            tip("3", 1.90, 0.75, ConfidenceTier::High),
        ];
        assert!(AccumulatorRule::default().build(&tips).is_none());
    }
}

//! Property-Based Tests - Domain Layer Invariants
//!
//! Uses `proptest` to verify that the valuation engine, sizing and
//! accumulator maths hold across random inputs.

use std::collections::HashMap;

use proptest::prelude::*;

use lanzaca_engine::domain::accumulator::AccumulatorRule;
use lanzaca_engine::domain::engine::{OddsValuationEngine, PROBABILITY_TOLERANCE};
use lanzaca_engine::domain::kelly::KellySizer;
use lanzaca_engine::domain::odds::{MarketQuotes, Outcome, OutcomeQuote};
use lanzaca_engine::domain::tiers::{ConfidenceTier, StakeTier, TierPolicy};
use lanzaca_engine::domain::tip::Tip;

fn market(odds: &[f64]) -> MarketQuotes {
    MarketQuotes::new(
        "evt",
        "Resultado Final",
        odds.iter()
            .enumerate()
            .map(|(i, odd)| OutcomeQuote::new(format!("o{i}"), *odd))
            .collect(),
    )
}

fn odds_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.01f64..50.0, 2..8)
}

// ── Normalization Properties ────────────────────────────────

proptest! {
    /// Fair probabilities always sum to one.
    #[test]
    fn fair_probabilities_sum_to_one(odds in odds_strategy()) {
        let set = OddsValuationEngine::default().normalize(&market(&odds)).unwrap();
        let total = set.fair_probability_sum();
        prop_assert!(
            (total - 1.0).abs() < PROBABILITY_TOLERANCE,
            "fair probabilities sum to {total}"
        );
    }

    /// Fair probability sits below raw when the book has margin, above when underround.
    #[test]
    fn margin_removal_direction(odds in odds_strategy()) {
        let set = OddsValuationEngine::default().normalize(&market(&odds)).unwrap();
        let overround = set.overround();
        for outcome in set.outcomes() {
            if overround > 1.0 {
                prop_assert!(outcome.fair_probability <= outcome.raw_probability);
            } else {
                prop_assert!(outcome.fair_probability >= outcome.raw_probability);
            }
        }
        prop_assert!((set.margin() - (overround - 1.0)).abs() < 1e-12);
    }

    /// Two calls on the same input are bitwise identical and keep input order.
    #[test]
    fn normalize_is_deterministic(odds in odds_strategy()) {
        let engine = OddsValuationEngine::default();
        let quotes = market(&odds);
        let first = engine.normalize(&quotes).unwrap();
        let second = engine.normalize(&quotes).unwrap();
        prop_assert_eq!(&first, &second);

        let labels: Vec<&str> = first.outcomes().iter().map(|o| o.label.as_str()).collect();
        let expected: Vec<String> = (0..odds.len()).map(|i| format!("o{i}")).collect();
        prop_assert_eq!(labels, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    /// A single odd at or below 1.0 rejects the whole set.
    #[test]
    fn any_degenerate_odd_rejects(
        mut odds in odds_strategy(),
        bad in 0.0f64..=1.0,
        position in any::<prop::sample::Index>(),
    ) {
        let i = position.index(odds.len());
        odds[i] = bad;
        prop_assert!(OddsValuationEngine::default().normalize(&market(&odds)).is_err());
    }
}

// ── Classification Properties ───────────────────────────────

proptest! {
    /// Non-positive EV never yields a stake.
    #[test]
    fn non_positive_ev_has_no_stake(
        ev in -1.0f64..=0.0,
        p in 0.0f64..=1.0,
    ) {
        let engine = OddsValuationEngine::default();
        let outcome = Outcome {
            label: "x".to_string(),
            quoted_odd: 2.0,
            raw_probability: 0.5,
            fair_probability: p,
            expected_value: ev,
        };
        prop_assert_eq!(engine.classify(&outcome).stake, StakeTier::None);
    }

    /// Higher quality never lowers the confidence tier.
    #[test]
    fn classification_is_monotonic(
        ev in 0.001f64..1.0,
        delta in 0.0f64..1.0,
        p in 0.0f64..=1.0,
    ) {
        let policy = TierPolicy::default();
        let low = policy.classify(ev, p);
        let high = policy.classify(ev + delta, p);
        prop_assert!(high.confidence >= low.confidence);
        prop_assert!(high.stake >= low.stake);
    }

    /// A market-only set never recommends a stake.
    #[test]
    fn pure_market_never_recommends(odds in odds_strategy()) {
        let engine = OddsValuationEngine::default();
        let set = engine.normalize(&market(&odds)).unwrap();
        if set.overround() >= 1.0 {
            for valued in engine.evaluate(&set) {
                prop_assert_eq!(valued.classification.stake, StakeTier::None);
            }
        }
    }
}

// ── Model Adjustment Properties ─────────────────────────────

proptest! {
    /// A partial override keeps the set summing to one.
    #[test]
    fn partial_override_sums_to_one(
        odds in prop::collection::vec(1.01f64..20.0, 3..6),
        p in 0.0f64..=1.0,
    ) {
        let engine = OddsValuationEngine::default();
        let set = engine.normalize(&market(&odds)).unwrap();
        let overrides = HashMap::from([("o0".to_string(), p)]);
        let adjusted = engine.apply_model_adjustment(&set, &overrides).unwrap();

        prop_assert!(adjusted.is_adjusted());
        prop_assert!((adjusted.fair_probability_sum() - 1.0).abs() < 1e-9);
        prop_assert_eq!(adjusted.outcomes()[0].fair_probability, p);
        prop_assert_eq!(adjusted.overround(), set.overround());
    }
}

// ── Kelly Sizing Properties ─────────────────────────────────

proptest! {
    /// Stake fraction is never negative and never above the cap or tier band.
    #[test]
    fn kelly_fraction_bounded(
        p in 0.0f64..=1.0,
        odd in 1.01f64..20.0,
        kelly in 0.05f64..=1.0,
        cap in 0.01f64..=0.2,
    ) {
        let sizer = KellySizer::new(kelly, cap);
        for tier in [StakeTier::Low, StakeTier::Medium, StakeTier::High] {
            let f = sizer.stake_fraction(p, odd, tier);
            prop_assert!(f >= 0.0, "negative stake {f}");
            prop_assert!(f <= cap + 1e-12, "stake {f} above cap {cap}");
            prop_assert!(f <= 0.05 + 1e-12, "stake {f} above HIGH band");
        }
        prop_assert_eq!(sizer.stake_fraction(p, odd, StakeTier::None), 0.0);
    }
}

// ── Accumulator Properties ──────────────────────────────────

fn tip(event: usize, odd: f64, p: f64) -> Tip {
    Tip {
        event_id: format!("evt-{event}"),
        market: "Resultado Final".to_string(),
        label: "Home".to_string(),
        quoted_odd: odd,
        fair_probability: p,
        expected_value: odd * p - 1.0,
        confidence: ConfidenceTier::VeryHigh,
        stake: StakeTier::High,
        stake_fraction: 0.05,
        model_adjusted: true,
        bookmaker: None,
    }
}

proptest! {
    /// Combined odd and probability are the products over the chosen legs.
    #[test]
    fn accumulator_is_product_of_legs(
        legs in prop::collection::vec((1.05f64..1.99, 0.5f64..0.99), 3..8),
    ) {
        let tips: Vec<Tip> = legs
            .iter()
            .enumerate()
            .map(|(i, (odd, p))| tip(i, *odd, *p))
            .collect();
        let acc = AccumulatorRule::default().build(&tips).unwrap();

        prop_assert_eq!(acc.legs.len(), 3);
        let odd: f64 = acc.legs.iter().map(|l| l.odd).product();
        let p: f64 = acc.legs.iter().map(|l| l.fair_probability).product();
        prop_assert!((acc.combined_odd - odd).abs() < 1e-12);
        prop_assert!((acc.combined_probability - p).abs() < 1e-12);
        prop_assert!((acc.expected_value - (odd * p - 1.0)).abs() < 1e-9);

        let mut events: Vec<&str> = acc.legs.iter().map(|l| l.event_id.as_str()).collect();
        events.sort_unstable();
        events.dedup();
        prop_assert_eq!(events.len(), 3);
    }
}

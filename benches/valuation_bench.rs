//! Valuation Benchmarks - Hot-Path Performance
//!
//! Benchmarks the domain functions that run for every market of every
//! fixture in a pipeline run.
//!
//! Run with: cargo bench --bench valuation_bench

use std::collections::HashMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use lanzaca_engine::domain::engine::OddsValuationEngine;
use lanzaca_engine::domain::kelly::KellySizer;
use lanzaca_engine::domain::odds::{MarketQuotes, OutcomeQuote};
use lanzaca_engine::domain::quotes::{BookmakerQuote, QuoteSelection, select_books};
use lanzaca_engine::domain::strength::{StrengthModel, TeamStrength};
use lanzaca_engine::domain::tiers::StakeTier;

fn three_way() -> MarketQuotes {
    MarketQuotes::new(
        "1001",
        "Resultado Final",
        vec![
            OutcomeQuote::new("Home", 1.80),
            OutcomeQuote::new("Draw", 3.40),
            OutcomeQuote::new("Away", 4.20),
        ],
    )
}

/// De-vig a three-way market.
fn bench_normalize(c: &mut Criterion) {
    let engine = OddsValuationEngine::default();
    let quotes = three_way();

    c.bench_function("normalize_three_way", |b| {
        b.iter(|| engine.normalize(black_box(&quotes)));
    });
}

/// Model override followed by classification of every outcome.
fn bench_adjust_and_classify(c: &mut Criterion) {
    let engine = OddsValuationEngine::default();
    let set = engine.normalize(&three_way()).unwrap();
    let overrides = HashMap::from([("Home".to_string(), 0.60)]);

    c.bench_function("adjust_and_evaluate", |b| {
        b.iter(|| {
            let adjusted = engine
                .apply_model_adjustment(black_box(&set), black_box(&overrides))
                .unwrap();
            engine.evaluate(&adjusted)
        });
    });
}

/// Best-price grouping over a realistic bookmaker spread.
fn bench_group_markets(c: &mut Criterion) {
    let books = ["bet365", "betano", "pinnacle", "1xbet", "betfair", "sportingbet"];
    let quotes: Vec<BookmakerQuote> = books
        .iter()
        .enumerate()
        .flat_map(|(i, book)| {
            let shift = i as f64 * 0.02;
            [
                BookmakerQuote::new(*book, "Resultado Final", "Home", 1.80 + shift),
                BookmakerQuote::new(*book, "Resultado Final", "Draw", 3.40 - shift),
                BookmakerQuote::new(*book, "Resultado Final", "Away", 4.20 + shift),
                BookmakerQuote::new(*book, "Total de Gols 2.5", "Mais de 2.5", 1.90 + shift),
                BookmakerQuote::new(*book, "Total de Gols 2.5", "Menos de 2.5", 1.95 - shift),
            ]
        })
        .collect();

    c.bench_function("group_markets_best_price", |b| {
        b.iter(|| {
            select_books(black_box(&quotes), &QuoteSelection::Best)
                .iter()
                .map(|book| book.to_market_quotes("1001"))
                .collect::<Vec<_>>()
        });
    });
}

/// Strength model prediction plus Kelly sizing.
fn bench_model_and_kelly(c: &mut Criterion) {
    let model = StrengthModel::default();
    let sizer = KellySizer::new(0.25, 0.05);
    let home = TeamStrength::from_form_string(1.8, 0.9, "WWDLW");
    let away = TeamStrength::from_form_string(1.2, 1.3, "LDWLD");

    c.bench_function("strength_predict_and_size", |b| {
        b.iter(|| {
            let p = model.predict(black_box(home), black_box(away));
            sizer.stake_fraction(p.home, black_box(2.10), StakeTier::High)
        });
    });
}

criterion_group!(
    benches,
    bench_normalize,
    bench_adjust_and_classify,
    bench_group_markets,
    bench_model_and_kelly,
);
criterion_main!(benches);

//! Bookmaker quote selection.
//!
//! A provider returns many quotes per outcome (one per bookmaker). The
//! valuation engine needs exactly one representative odd per outcome, so
//! this module groups raw quotes by market and picks either the best
//! price across all houses or a single house's price.

use serde::{Deserialize, Serialize};

use super::odds::{MarketQuotes, OutcomeQuote};

/// One bookmaker's price for one outcome of one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmakerQuote {
    /// Normalized bookmaker key (e.g. "bet365", "betano").
    pub bookmaker: String,
    /// Market name.
    pub market: String,
    /// Outcome label within the market.
    pub label: String,
    /// Decimal odd.
    pub odd: f64,
}

impl BookmakerQuote {
    pub fn new(
        bookmaker: impl Into<String>,
        market: impl Into<String>,
        label: impl Into<String>,
        odd: f64,
    ) -> Self {
        Self {
            bookmaker: bookmaker.into(),
            market: market.into(),
            label: label.into(),
            odd,
        }
    }
}

/// How to pick the representative odd for each outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSelection {
    /// Highest odd across all bookmakers.
    #[default]
    Best,
    /// Only quotes from this bookmaker (case-insensitive).
    Bookmaker(String),
}

/// The chosen quote for one outcome, remembering where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedQuote {
    pub label: String,
    pub bookmaker: String,
    pub odd: f64,
}

/// Selected quotes of one market, in first-seen label order.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketBook {
    pub market: String,
    pub entries: Vec<SelectedQuote>,
}

impl MarketBook {
    pub fn to_market_quotes(&self, event_id: &str) -> MarketQuotes {
        MarketQuotes::new(
            event_id,
            self.market.clone(),
            self.entries
                .iter()
                .map(|e| OutcomeQuote::new(e.label.clone(), e.odd))
                .collect(),
        )
    }

    /// Bookmaker whose price was selected for `label`.
    pub fn bookmaker_for(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.bookmaker.as_str())
    }
}

/// Group quotes per market and pick one quote per outcome.
///
/// Markets and labels keep first-seen order. Quotes are not validated
/// here: a bad odd surfaces when the market is normalized. With
/// `Bookmaker`, markets that house does not price are omitted.
pub fn select_books(quotes: &[BookmakerQuote], selection: &QuoteSelection) -> Vec<MarketBook> {
    let mut books: Vec<MarketBook> = Vec::new();

    for quote in quotes {
        if let QuoteSelection::Bookmaker(name) = selection {
            if !quote.bookmaker.eq_ignore_ascii_case(name) {
                continue;
            }
        }

        let book_idx = match books.iter().position(|b| b.market == quote.market) {
            Some(idx) => idx,
            None => {
                books.push(MarketBook {
                    market: quote.market.clone(),
                    entries: Vec::new(),
                });
                books.len() - 1
            }
        };
        let book = &mut books[book_idx];

        match book.entries.iter_mut().find(|e| e.label == quote.label) {
            // First quote wins ties; NaN never replaces a real price.
            Some(entry) if quote.odd > entry.odd || entry.odd.is_nan() => {
                entry.odd = quote.odd;
                entry.bookmaker = quote.bookmaker.clone();
            }
            Some(_) => {}
            None => book.entries.push(SelectedQuote {
                label: quote.label.clone(),
                bookmaker: quote.bookmaker.clone(),
                odd: quote.odd,
            }),
        }
    }

    books
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<BookmakerQuote> {
        vec![
            BookmakerQuote::new("betano", "Resultado Final", "Home", 2.05),
            BookmakerQuote::new("betano", "Resultado Final", "Draw", 3.30),
            BookmakerQuote::new("bet365", "Resultado Final", "Home", 2.10),
            BookmakerQuote::new("bet365", "Resultado Final", "Draw", 3.25),
            BookmakerQuote::new("bet365", "Ambas Marcam", "Sim", 1.70),
            BookmakerQuote::new("bet365", "Resultado Final", "Away", 3.60),
        ]
    }

    #[test]
    fn test_best_price_per_label() {
        let markets: Vec<MarketQuotes> = select_books(&sample(), &QuoteSelection::Best)
            .iter()
            .map(|book| book.to_market_quotes("99"))
            .collect();
        assert_eq!(markets.len(), 2);
        let result = &markets[0];
        assert_eq!(result.market, "Resultado Final");
        assert_eq!(result.event_id, "99");
        let odds: Vec<(&str, f64)> = result
            .quotes
            .iter()
            .map(|q| (q.label.as_str(), q.quoted_odd))
            .collect();
        assert_eq!(odds, vec![("Home", 2.10), ("Draw", 3.30), ("Away", 3.60)]);
    }

    #[test]
    fn test_single_bookmaker_selection() {
        let selection = QuoteSelection::Bookmaker("BETANO".to_string());
        let books = select_books(&sample(), &selection);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].entries.len(), 2);
        assert_eq!(books[0].entries[0].odd, 2.05);
        assert_eq!(books[0].bookmaker_for("Home"), Some("betano"));
    }

    #[test]
    fn test_book_remembers_source() {
        let books = select_books(&sample(), &QuoteSelection::Best);
        let home = &books[0].entries[0];
        assert_eq!(home.bookmaker, "bet365");
        let draw = &books[0].entries[1];
        assert_eq!(draw.bookmaker, "betano");
        assert_eq!(books[0].bookmaker_for("Draw"), Some("betano"));
        assert_eq!(books[0].bookmaker_for("Over"), None);
    }

    #[test]
    fn test_selection_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            selection: QuoteSelection,
        }
        let best: Wrapper = toml::from_str(r#"selection = "best""#).unwrap();
        assert_eq!(best.selection, QuoteSelection::Best);
        let house: Wrapper = toml::from_str(r#"selection = { bookmaker = "bet365" }"#).unwrap();
        assert_eq!(house.selection, QuoteSelection::Bookmaker("bet365".to_string()));
    }
}

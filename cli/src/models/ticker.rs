use serde::{Deserialize, Serialize};
use std::fmt;

/// Most tickers compared side by side in one table
pub const MAX_TICKERS: usize = 3;

/// Stock symbol, stored trimmed and uppercased
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Normalizes `symbol`. Returns `None` when nothing is left after trimming.
    pub fn new(symbol: &str) -> Option<Self> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            None
        } else {
            Some(Self(symbol.to_uppercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse comma-separated user input into at most [`MAX_TICKERS`] tickers.
///
/// Blank entries are skipped before truncation, so `"meta,,aapl"` yields two
/// tickers. Order and duplicates are kept as typed.
pub fn parse_ticker_list(input: &str) -> Vec<Ticker> {
    input
        .split(',')
        .filter_map(Ticker::new)
        .take(MAX_TICKERS)
        .collect()
}

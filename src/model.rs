//! Watchlist data model: user-owned metadata (category, rank) and
//! market-sourced quote fields.
//!
//! The symbol string is the primary key across store, provider and engine.
//! Market fields are kept in a separate `MarketData` group where every field
//! is individually optional — "never fetched" must stay distinguishable from
//! "fetched as zero".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-assigned heat label. Closed set; anything else is rejected or
/// normalized at the persistence-read boundary, never inside the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rank {
    Cold,
    Hot,
    VeryHot,
}

impl Rank {
    /// Parse a persisted or user-supplied label. Accepts the display form
    /// ("Very Hot") as well as the compact form ("VeryHot"), case-insensitive.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "cold" => Some(Rank::Cold),
            "hot" => Some(Rank::Hot),
            "very hot" | "veryhot" | "very_hot" => Some(Rank::VeryHot),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rank::Cold => "Cold",
            Rank::Hot => "Hot",
            Rank::VeryHot => "Very Hot",
        }
    }

    /// Display glyph used by list renderers.
    pub fn glyph(&self) -> &'static str {
        match self {
            Rank::Cold => "❄️",
            Rank::Hot => "🔥",
            Rank::VeryHot => "🔥🔥",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User-assigned bucket. A symbol belongs to exactly one category at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Active,
    Watching,
}

impl Category {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Category::Active),
            "watching" => Some(Category::Watching),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Active => "Active",
            Category::Watching => "Watching",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalize a ticker symbol: trim whitespace, uppercase. Returns `None`
/// for empty/whitespace-only input.
pub fn normalize_symbol(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_ascii_uppercase())
}

/// Market-sourced field group. Wholly replaced by a quote merge; user-owned
/// fields never live here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub short_name: Option<String>,
    pub regular_market_price: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub market_cap: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    /// When this field group was last replaced from a quote.
    pub as_of: Option<DateTime<Utc>>,
}

impl MarketData {
    pub fn from_quote(quote: &StockQuote) -> Self {
        Self {
            short_name: quote.short_name.clone(),
            regular_market_price: quote.regular_market_price,
            dividend_yield: quote.dividend_yield,
            trailing_pe: quote.trailing_pe,
            forward_pe: quote.forward_pe,
            market_cap: quote.market_cap,
            fifty_two_week_high: quote.fifty_two_week_high,
            fifty_two_week_low: quote.fifty_two_week_low,
            as_of: Some(Utc::now()),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.as_of.is_none()
    }
}

/// One quote record as returned by the provider. Field names follow the
/// upstream Yahoo payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: Option<f64>,
    #[serde(rename = "dividendYield")]
    pub dividend_yield: Option<f64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    #[serde(rename = "marketCap")]
    pub market_cap: Option<f64>,
    #[serde(rename = "fiftyTwoWeekHigh")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(rename = "fiftyTwoWeekLow")]
    pub fifty_two_week_low: Option<f64>,
}

impl StockQuote {
    /// Bare quote with every market field unset; handy in tests.
    pub fn bare(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            short_name: None,
            regular_market_price: None,
            dividend_yield: None,
            trailing_pe: None,
            forward_pe: None,
            market_cap: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
        }
    }
}

/// One tracked ticker: user-owned category/rank plus the latest known
/// market field group.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub category: Category,
    pub rank: Rank,
    pub market: MarketData,
}

impl StockRecord {
    /// A record freshly loaded from the store: market fields unset until the
    /// first successful refresh.
    pub fn unfetched(symbol: String, category: Category, rank: Rank) -> Self {
        Self {
            symbol,
            category,
            rank,
            market: MarketData::default(),
        }
    }

    /// Replace only the market-sourced field group. Category and rank are
    /// user-owned and never touched here.
    pub fn apply_quote(&mut self, quote: &StockQuote) {
        self.market = MarketData::from_quote(quote);
    }

    /// Rendered list-row label: rank glyph, symbol, and the company name
    /// when known.
    pub fn display_line(&self) -> String {
        match &self.market.short_name {
            Some(name) => format!("{} {} - {}", self.rank.glyph(), self.symbol, name),
            None => format!("{} {}", self.rank.glyph(), self.symbol),
        }
    }
}

// Serialized by hand so the payload carries the rendered row label next to
// the raw fields. Deserialization ignores it.
impl Serialize for StockRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("StockRecord", 5)?;
        s.serialize_field("symbol", &self.symbol)?;
        s.serialize_field("category", &self.category)?;
        s.serialize_field("rank", &self.rank)?;
        s.serialize_field("display", &self.display_line())?;
        s.serialize_field("market", &self.market)?;
        s.end()
    }
}

/// Persisted `(symbol, category, rank)` triple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub category: Category,
    pub rank: Rank,
}

impl WatchlistEntry {
    pub fn new(symbol: impl Into<String>, category: Category, rank: Rank) -> Self {
        Self {
            symbol: symbol.into(),
            category,
            rank,
        }
    }
}

/// Read-only projection handed to the display layer. Order within each list
/// is insertion order and is what the UI renders top-to-bottom.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchlistSnapshot {
    pub active: Vec<StockRecord>,
    pub watching: Vec<StockRecord>,
}

impl WatchlistSnapshot {
    pub fn len(&self) -> usize {
        self.active.len() + self.watching.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.watching.is_empty()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.active
            .iter()
            .chain(self.watching.iter())
            .map(|r| r.symbol.clone())
            .collect()
    }
}

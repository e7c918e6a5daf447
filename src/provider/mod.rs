pub mod traits;
pub mod yahoo;

pub use traits::QuoteProvider;
pub use yahoo::YahooQuoteProvider;

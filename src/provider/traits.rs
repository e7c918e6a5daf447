use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::StockQuote;

/// Quote-provider contract.
///
/// Given a batch of symbols (non-empty, deduplicated by the caller), a
/// provider returns either the quotes it knows about or a single error
/// covering the whole batch. Returning fewer quotes than requested is not
/// an error: unknown symbols are silently dropped upstream and the engine
/// must tolerate that.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<StockQuote>, ProviderError>;
}

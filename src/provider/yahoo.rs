use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::model::StockQuote;

use super::traits::QuoteProvider;

/// Yahoo Finance quote adapter (RapidAPI gateway).
///
/// Endpoint: `GET {base}/api/market/get-quote?symbols=A,B&region=US` with
/// `x-rapidapi-key` / `x-rapidapi-host` headers. The response envelope is
/// `{"quoteResponse": {"result": [...]}}`.
#[derive(Clone)]
pub struct YahooQuoteProvider {
    client: Client,
    base_url: String,
    api_key: String,
    api_host: String,
    region: String,
}

#[derive(Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResult,
}

#[derive(Deserialize)]
struct QuoteResult {
    result: Vec<StockQuote>,
}

impl YahooQuoteProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| ProviderError::Misconfigured {
                reason: "no api key: set provider.api_key or RAPIDAPI_KEY".to_string(),
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            api_host: config.api_host.clone(),
            region: config.region.clone(),
        })
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    fn name(&self) -> &'static str {
        "yahoo_rapidapi"
    }

    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<StockQuote>, ProviderError> {
        let url = format!("{}/api/market/get-quote", self.base_url);
        let joined = symbols.join(",");
        debug!(symbols = %joined, "fetching quotes");

        let resp = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .query(&[("symbols", joined.as_str()), ("region", self.region.as_str())])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: QuoteEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.quote_response.result)
    }
}

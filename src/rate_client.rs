use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RateConfig;

/// A single price observation for a trading pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateQuote {
    pub symbol: String,
    pub price: f64,
}

/// Anything that can tell us the current rate.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_quote(&self) -> Result<RateQuote>;

    async fn fetch_rate(&self) -> Result<f64> {
        Ok(self.fetch_quote().await?.price)
    }
}

/// Queries the Binance ticker endpoint for a single symbol.
/// Every call re-fetches, nothing is cached or retried.
#[derive(Debug)]
pub struct RateClient {
    http_client: Client,
    url: reqwest::Url,
    symbol: String,
}

impl RateClient {
    pub fn new<S: AsRef<str>>(base_url: S, symbol: impl Into<String>) -> Result<Self> {
        let url = reqwest::Url::parse(base_url.as_ref())
            .and_then(|url| url.join("api/v3/ticker/price"))
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let http_client = Client::builder().build().map_err(Error::Transport)?;

        Ok(RateClient {
            http_client,
            url,
            symbol: symbol.into(),
        })
    }

    pub fn from_config(config: &RateConfig) -> Result<Self> {
        Self::new(&config.base_url, config.symbol.clone())
    }
}

#[async_trait]
impl RateProvider for RateClient {
    #[tracing::instrument(name = "Fetching rate", skip(self), fields(symbol = %self.symbol))]
    async fn fetch_quote(&self) -> Result<RateQuote> {
        // The upstream answers errors with a 4xx AND a `{code, msg}` body,
        // so the body decides, not the status.
        let body = self
            .http_client
            .get(self.url.clone())
            .query(&[("symbol", self.symbol.as_str())])
            .send()
            .await?
            .text()
            .await?;
        debug!("response body: {body}");

        parse_quote(&body)
    }
}

/// Decodes a ticker response: an error envelope first, a price second.
pub fn parse_quote(body: &str) -> Result<RateQuote> {
    if let Ok(er) = serde_json::from_str::<ErrorResponse>(body) {
        if er.code != 0 {
            return Err(Error::Upstream(er.msg));
        }
    }

    let ticker: TickerResponse =
        serde_json::from_str(body).map_err(|e| Error::Format(e.to_string()))?;
    let price = ticker
        .price
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::Format(format!("price '{}': {e}", ticker.price)))?;
    if !price.is_finite() {
        return Err(Error::Format(format!("price '{}' is not a number", ticker.price)));
    }

    Ok(RateQuote {
        symbol: ticker.symbol,
        price,
    })
}

#[derive(Deserialize)]
struct TickerResponse {
    symbol: String,
    price: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    code: i64,
    msg: String,
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid rate api url: {0}")]
    UrlParsing(String),
    #[error("api call error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rate api error: {0}")]
    Upstream(String),
    #[error("failed to parse the rate api response: {0}")]
    Format(String),
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Deserialize;

use crate::config::HarvestConfig;
use crate::error::{Context, FetchError, Result};

use super::{decode_page, FetchResult, TradeSource};

/// One aggregate trade as served by the aggTrades endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggTrade {
    #[serde(rename = "a")]
    pub trade_id: i64,
    #[serde(rename = "p")]
    pub price: String,
    #[serde(rename = "q")]
    pub quantity: String,
    #[serde(rename = "f")]
    pub first_id: i64,
    #[serde(rename = "l")]
    pub last_id: i64,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "T")]
    pub timestamp: i64,
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
    #[serde(rename = "M")]
    pub is_best_match: bool,
}

/// aggTrades over HTTP: one bounded-timeout GET per page.
pub struct HttpTradeSource {
    client: Client,
    endpoint: String,
    page_size: u32,
}

impl HttpTradeSource {
    pub fn new(endpoint: impl Into<String>, page_size: u32, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to construct trade history HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            page_size,
        })
    }

    pub fn from_config(config: &HarvestConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.page_size,
            config.request_timeout,
        )
    }

    /// The exact request `fetch_page` sends for `symbol` starting at `from_id`.
    pub fn build_request(&self, symbol: &str, from_id: i64) -> reqwest::Result<Request> {
        self.client
            .get(&self.endpoint)
            .query(&[
                ("symbol", symbol.to_string()),
                ("limit", self.page_size.to_string()),
                ("fromId", from_id.to_string()),
            ])
            .build()
    }
}

#[async_trait]
impl TradeSource for HttpTradeSource {
    async fn fetch_page(&self, symbol: &str, from_id: i64) -> FetchResult<Vec<AggTrade>> {
        let request = self
            .build_request(symbol, from_id)
            .map_err(FetchError::Transport)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            // The status is the useful part; an unreadable error body is dropped.
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await.map_err(FetchError::Transport)?;
        decode_page(status, &body)
    }
}

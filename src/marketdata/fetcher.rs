use crate::config::FetchWindow;
use crate::marketdata::traits::MarketData;
use crate::model::{Candle, FetchError, PriceSeries};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart-API client.
pub struct YahooFetcher {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

impl YahooFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) DipSniper/0.1")
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to create HTTP client");
        Self { client }
    }

    fn build_url(&self, ticker: &str, window: &FetchWindow) -> String {
        format!(
            "{}/{}?range={}&interval={}&includePrePost=false",
            CHART_BASE_URL, ticker, window.range, window.interval
        )
    }

    /// Collapses the chart payload to a single close column: null bars are
    /// dropped, duplicate timestamps deduplicated.
    fn into_series(ticker: &str, payload: ChartResponse) -> Result<PriceSeries, FetchError> {
        let result = payload
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| {
                FetchError::Malformed(format!("no chart result: {:?}", payload.chart.error))
            })?;

        let timestamps = result.timestamp.unwrap_or_default();
        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .and_then(|q| q.close)
            .unwrap_or_default();

        let mut candles: Vec<Candle> = Vec::with_capacity(timestamps.len());
        for (ts, close) in timestamps.into_iter().zip(closes) {
            let Some(close) = close.filter(|c| c.is_finite()) else {
                continue;
            };
            let Some(ts) = DateTime::<Utc>::from_timestamp(ts, 0) else {
                continue;
            };
            candles.push(Candle { ts, close });
        }
        candles.dedup_by_key(|c| c.ts);

        if candles.is_empty() {
            return Err(FetchError::EmptyData);
        }
        Ok(PriceSeries {
            ticker: ticker.to_string(),
            candles,
        })
    }
}

#[async_trait::async_trait]
impl MarketData for YahooFetcher {
    async fn fetch(&self, ticker: &str, window: &FetchWindow) -> Result<PriceSeries, FetchError> {
        let url = self.build_url(ticker, window);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(FetchError::Http(format!("status {}", response.status())));
        }

        let payload: ChartResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        Self::into_series(ticker, payload)
    }
}

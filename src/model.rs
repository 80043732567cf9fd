// Core structs: Candle, PriceSeries, TickerResult, Position, Signal
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// One bar of the closing-price series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub ts: DateTime<Utc>,
    pub close: f64,
}

/// Ordered closing prices for one ticker, ascending by timestamp.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub ticker: String,
    pub candles: Vec<Candle>,
}

impl PriceSeries {
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }
}

/// Latest-bar snapshot for one ticker. Price and RSI carry 2 decimals,
/// band position 3.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerResult {
    pub ticker: String,
    pub price: f64,
    pub rsi: f64,
    pub bb_position: f64,
    pub as_of: String,
}

/// One row of the positions sheet. Field names follow the sheet headers.
#[derive(Debug, Clone, Deserialize)]
pub struct Position {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Price")]
    pub entry_price: f64,
    #[serde(rename = "Shares")]
    pub shares: f64,
    #[serde(rename = "Date")]
    pub entry_date: String,
    #[serde(rename = "Status")]
    pub status: String,
}

/// Which classification leg(s) fired for a signal row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerLeg {
    Rsi,
    Band,
    Both,
}

impl TriggerLeg {
    pub fn label(&self) -> &'static str {
        match self {
            TriggerLeg::Rsi => "RSI",
            TriggerLeg::Band => "BB",
            TriggerLeg::Both => "RSI+BB",
        }
    }
}

/// A classified BUY or SELL candidate.
#[derive(Debug, Clone)]
pub struct Signal {
    pub row: TickerResult,
    pub trigger: TriggerLeg,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("empty dataset")]
    EmptyData,
    #[error("malformed payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum PositionsError {
    #[error("http error: {0}")]
    Http(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("message build failed: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
}

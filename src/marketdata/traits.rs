use crate::config::FetchWindow;
use crate::model::{FetchError, PriceSeries};

/// Market-data collaborator: returns an ordered closing-price series for a
/// ticker over the requested window, or fails. Providers enforce their own
/// timeouts; a timeout is just another fetch failure to the caller.
#[async_trait::async_trait]
pub trait MarketData: Send + Sync {
    async fn fetch(&self, ticker: &str, window: &FetchWindow) -> Result<PriceSeries, FetchError>;
}

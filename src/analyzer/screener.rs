use crate::analyzer::indicators::{RsiSmoothing, bollinger_series, rsi_series};
use crate::config::{AppConfig, FetchWindow, MissingPolicy};
use crate::marketdata::MarketData;
use crate::model::{PriceSeries, TickerResult};
use crate::utils::{format_as_of, round_to};
use futures::future::join_all;
use rand::Rng;
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

/// Screens a universe of tickers: fetches each price series, runs the
/// indicator engine and extracts the latest-bar snapshot.
pub struct TickerAnalyzer {
    rsi_period: usize,
    bb_window: usize,
    smoothing: RsiSmoothing,
    policy: MissingPolicy,
    fetch: FetchWindow,
}

impl TickerAnalyzer {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            rsi_period: cfg.indicators.rsi_period,
            bb_window: cfg.indicators.bb_window,
            smoothing: cfg.indicators.rsi_smoothing,
            policy: cfg.missing_policy,
            fetch: cfg.fetch.clone(),
        }
    }

    /// Analyzes the whole universe concurrently. Rows come back in universe
    /// order, not completion order; a failed ticker produces no row and
    /// never aborts the batch.
    pub async fn analyze_universe(
        &self,
        market: &dyn MarketData,
        tickers: &[String],
    ) -> Vec<TickerResult> {
        let tasks: Vec<_> = tickers
            .iter()
            .map(|ticker| self.analyze_ticker(market, ticker))
            .collect();
        join_all(tasks).await.into_iter().flatten().collect()
    }

    async fn analyze_ticker(&self, market: &dyn MarketData, ticker: &str) -> Option<TickerResult> {
        // Spread the universe out a little instead of hitting the provider
        // in one burst.
        let jitter = rand::rng().random_range(0..400);
        sleep(Duration::from_millis(jitter)).await;

        let series = match market.fetch(ticker, &self.fetch).await {
            Ok(series) => series,
            Err(e) => {
                warn!("Fetch failed for {}: {}", ticker, e);
                return None;
            }
        };
        self.snapshot(&series)
    }

    /// Latest-bar snapshot of one price series, or `None` when the ticker
    /// must be skipped.
    pub fn snapshot(&self, series: &PriceSeries) -> Option<TickerResult> {
        let closes = series.closes();
        if closes.len() < 2 {
            debug!("{}: not enough closes ({})", series.ticker, closes.len());
            return None;
        }

        let last = closes.len() - 1;
        let rsi = rsi_series(&closes, self.rsi_period, self.smoothing)[last];
        let bb_position =
            bollinger_series(&closes, self.bb_window)[last].and_then(|b| b.position(closes[last]));

        let (rsi, bb_position) = match (rsi, bb_position) {
            (Some(rsi), Some(pos)) => (rsi, pos),
            _ if self.policy == MissingPolicy::Strict => {
                debug!("{}: indicators undefined at latest bar, skipping", series.ticker);
                return None;
            }
            (rsi, pos) => (rsi.unwrap_or(50.0), pos.unwrap_or(0.5)),
        };

        if !rsi.is_finite() || !bb_position.is_finite() {
            return None;
        }

        let latest = series.candles.last()?;
        Some(TickerResult {
            ticker: series.ticker.clone(),
            price: round_to(latest.close, 2),
            rsi: round_to(rsi, 2),
            bb_position: round_to(bb_position, 3),
            as_of: format_as_of(latest.ts, &self.fetch.interval),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Candle, FetchError};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn analyzer(policy: MissingPolicy) -> TickerAnalyzer {
        TickerAnalyzer {
            rsi_period: 14,
            bb_window: 20,
            smoothing: RsiSmoothing::Ewm,
            policy,
            fetch: FetchWindow {
                range: "60d".to_string(),
                interval: "1d".to_string(),
            },
        }
    }

    fn series(ticker: &str, closes: &[f64]) -> PriceSeries {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                ts: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                close,
            })
            .collect();
        PriceSeries {
            ticker: ticker.to_string(),
            candles,
        }
    }

    fn ramp(len: usize) -> Vec<f64> {
        (1..=len).map(|x| x as f64).collect()
    }

    struct StaticMarket {
        series: HashMap<String, PriceSeries>,
    }

    #[async_trait::async_trait]
    impl MarketData for StaticMarket {
        async fn fetch(
            &self,
            ticker: &str,
            _window: &FetchWindow,
        ) -> Result<PriceSeries, FetchError> {
            self.series.get(ticker).cloned().ok_or(FetchError::EmptyData)
        }
    }

    #[test]
    fn snapshot_rounds_and_stamps() {
        let result = analyzer(MissingPolicy::Lenient)
            .snapshot(&series("AAPL", &ramp(30)))
            .unwrap();
        assert_eq!(result.ticker, "AAPL");
        assert_eq!(result.price, 30.0);
        assert_eq!(result.rsi, 100.0);
        assert_eq!(result.as_of, "2025-01-30");
        // Three decimals on the band position.
        assert_eq!(result.bb_position, round_to(result.bb_position, 3));
    }

    #[test]
    fn snapshot_is_deterministic() {
        let frozen = series("MSFT", &ramp(40));
        let analyzer = analyzer(MissingPolicy::Lenient);
        assert_eq!(analyzer.snapshot(&frozen), analyzer.snapshot(&frozen));
    }

    #[test]
    fn too_short_series_is_skipped() {
        let analyzer = analyzer(MissingPolicy::Lenient);
        assert!(analyzer.snapshot(&series("AAPL", &[])).is_none());
        assert!(analyzer.snapshot(&series("AAPL", &[10.0])).is_none());
    }

    #[test]
    fn strict_policy_skips_undefined_indicators() {
        // Five flat closes: RSI undefined (no movement), band window unfilled.
        let flat = series("KO", &[10.0; 5]);
        assert!(analyzer(MissingPolicy::Strict).snapshot(&flat).is_none());
    }

    #[test]
    fn lenient_policy_substitutes_neutral_defaults() {
        let flat = series("KO", &[10.0; 5]);
        let result = analyzer(MissingPolicy::Lenient).snapshot(&flat).unwrap();
        assert_eq!(result.rsi, 50.0);
        assert_eq!(result.bb_position, 0.5);
    }

    #[tokio::test]
    async fn failed_tickers_are_skipped_not_fatal() {
        let mut known = HashMap::new();
        known.insert("AAPL".to_string(), series("AAPL", &ramp(30)));
        known.insert("MSFT".to_string(), series("MSFT", &ramp(30)));
        let market = StaticMarket { series: known };

        let universe = vec![
            "AAPL".to_string(),
            "GONE".to_string(),
            "MSFT".to_string(),
        ];
        let rows = analyzer(MissingPolicy::Lenient)
            .analyze_universe(&market, &universe)
            .await;

        // The missing ticker is dropped; the rest keep universe order.
        let names: Vec<&str> = rows.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(names, vec!["AAPL", "MSFT"]);
    }
}

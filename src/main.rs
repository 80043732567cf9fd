mod analyzer;
mod config;
mod marketdata;
mod model;
mod notifier;
mod positions;
mod utils;

use analyzer::TickerAnalyzer;
use analyzer::signals::classify;
use config::{AppConfig, load_config, smtp_credentials_from_env};
use marketdata::YahooFetcher;
use model::Signal;
use notifier::EmailNotifier;
use positions::{GoogleSheetSource, PositionsSource};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // .env first, so SMTP credentials are in place before anything reads them.
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    // Load configuration from file
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let credentials = match smtp_credentials_from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Credential error: {}", e);
            return;
        }
    };

    let market = YahooFetcher::new();
    let analyzer = TickerAnalyzer::new(&config);
    let positions_source = GoogleSheetSource::new(config.positions_sheet_url.clone());
    let notifier = match EmailNotifier::new(&config.email, credentials, config.order_budget) {
        Ok(n) => n,
        Err(e) => {
            error!("Notifier init error: {}", e);
            return;
        }
    };

    info!("🚀 DipSniper started! Universe: {} tickers", config.tickers.len());

    // Main processing loop
    loop {
        run_screen(&config, &market, &analyzer, &positions_source, &notifier).await;

        info!("Waiting for timer ({}s)...", config.check_interval_seconds);
        sleep(Duration::from_secs(config.check_interval_seconds)).await;
        info!("Timer triggered, restarting main loop...");
    }
}

/// One full screening run: ticker analysis and the held-positions fetch run
/// in parallel, then classification and the email report.
async fn run_screen(
    config: &AppConfig,
    market: &YahooFetcher,
    analyzer: &TickerAnalyzer,
    positions_source: &GoogleSheetSource,
    notifier: &EmailNotifier,
) {
    info!("Screening {} tickers...", config.tickers.len());

    let (rows, positions) = tokio::join!(
        analyzer.analyze_universe(market, &config.tickers),
        positions_source.fetch_open_positions(),
    );

    // A broken positions source degrades to "nothing held": the analysis
    // still runs, the ownership-dependent sell rule just finds no candidates.
    let positions = match positions {
        Ok(positions) => positions,
        Err(e) => {
            warn!("Positions fetch failed, assuming none held: {}", e);
            Vec::new()
        }
    };
    let held: HashSet<String> = positions.iter().map(|p| p.ticker.clone()).collect();

    info!(
        "Analyzed {} of {} tickers | {} open positions",
        rows.len(),
        config.tickers.len(),
        positions.len()
    );

    let (buy, sell) = classify(&rows, &held, &config.signals);
    info!("Signals: {} BUY, {} SELL", buy.len(), sell.len());
    log_signals("🟢 BUY", &buy);
    log_signals("🔴 SELL", &sell);

    if let Err(e) = notifier.send_report(&buy, &sell, &positions).await {
        error!("Report dispatch failed: {}", e);
    }
}

fn log_signals(label: &str, signals: &[Signal]) {
    for signal in signals.iter().take(5) {
        info!(
            "{} {} - ${} (RSI: {}, BB: {})",
            label, signal.row.ticker, signal.row.price, signal.row.rsi, signal.row.bb_position
        );
    }
}

use crate::analyzer::indicators::RsiSmoothing;
use crate::analyzer::signals::SellRule;
use crate::model::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;

/// Lookback window passed to the market-data provider, e.g. range "60d"
/// with interval "1d", or range "3d" with interval "1h".
#[derive(Debug, Clone, Deserialize)]
pub struct FetchWindow {
    pub range: String,
    pub interval: String,
}

/// What to do when RSI or band position is undefined at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Skip the ticker entirely.
    Strict,
    /// Substitute neutral defaults: RSI 50, band position 0.5.
    Lenient,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_bb_window")]
    pub bb_window: usize,
    #[serde(default)]
    pub rsi_smoothing: RsiSmoothing,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            bb_window: default_bb_window(),
            rsi_smoothing: RsiSmoothing::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    #[serde(default = "default_buy_rsi")]
    pub buy_rsi: f64,
    #[serde(default = "default_buy_bb")]
    pub buy_bb: f64,
    #[serde(default = "default_sell_rsi")]
    pub sell_rsi: f64,
    #[serde(default = "default_sell_bb")]
    pub sell_bb: f64,
    #[serde(default)]
    pub sell_rule: SellRule,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            buy_rsi: default_buy_rsi(),
            buy_bb: default_buy_bb(),
            sell_rsi: default_sell_rsi(),
            sell_bb: default_sell_bb(),
            sell_rule: SellRule::default(),
        }
    }
}

/// SMTP endpoint and addresses. Credentials never live here; they are
/// injected from the environment, see [`smtp_credentials_from_env`].
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct SmtpCredentials {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub tickers: Vec<String>,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    pub fetch: FetchWindow,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub signals: SignalConfig,
    #[serde(default = "default_missing_policy")]
    pub missing_policy: MissingPolicy,
    pub positions_sheet_url: String,
    #[serde(default = "default_order_budget")]
    pub order_budget: f64,
    pub email: EmailConfig,
}

fn default_rsi_period() -> usize {
    14
}

fn default_bb_window() -> usize {
    20
}

fn default_buy_rsi() -> f64 {
    30.0
}

fn default_buy_bb() -> f64 {
    0.1
}

fn default_sell_rsi() -> f64 {
    70.0
}

fn default_sell_bb() -> f64 {
    0.9
}

fn default_smtp_port() -> u16 {
    465
}

fn default_check_interval() -> u64 {
    3600
}

fn default_missing_policy() -> MissingPolicy {
    MissingPolicy::Lenient
}

fn default_order_budget() -> f64 {
    500.0
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn smtp_credentials_from_env() -> Result<SmtpCredentials, ConfigError> {
    let user = env::var("SMTP_USER").map_err(|_| ConfigError::MissingEnv("SMTP_USER"))?;
    let password =
        env::var("SMTP_PASSWORD").map_err(|_| ConfigError::MissingEnv("SMTP_PASSWORD"))?;
    Ok(SmtpCredentials { user, password })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let raw = r#"{
            "tickers": ["AAPL", "MSFT"],
            "check_interval_seconds": 900,
            "fetch": { "range": "3d", "interval": "1h" },
            "indicators": { "rsi_period": 14, "bb_window": 20, "rsi_smoothing": "wilder" },
            "signals": { "buy_rsi": 20.0, "buy_bb": 0.0, "sell_rsi": 80.0, "sell_bb": 1.0, "sell_rule": "all" },
            "missing_policy": "strict",
            "positions_sheet_url": "https://docs.google.com/spreadsheets/d/abc",
            "order_budget": 750.0,
            "email": { "smtp_host": "smtp.example.com", "smtp_port": 465, "from": "a@example.com", "to": "b@example.com" }
        }"#;
        let cfg: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.tickers.len(), 2);
        assert_eq!(cfg.check_interval_seconds, 900);
        assert_eq!(cfg.indicators.rsi_smoothing, RsiSmoothing::Wilder);
        assert_eq!(cfg.signals.sell_rule, SellRule::All);
        assert_eq!(cfg.missing_policy, MissingPolicy::Strict);
        assert_eq!(cfg.order_budget, 750.0);
    }

    #[test]
    fn defaults_fill_omitted_sections() {
        let raw = r#"{
            "tickers": ["AAPL"],
            "fetch": { "range": "60d", "interval": "1d" },
            "positions_sheet_url": "https://docs.google.com/spreadsheets/d/abc",
            "email": { "smtp_host": "smtp.example.com", "from": "a@example.com", "to": "b@example.com" }
        }"#;
        let cfg: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.check_interval_seconds, 3600);
        assert_eq!(cfg.indicators.rsi_period, 14);
        assert_eq!(cfg.indicators.bb_window, 20);
        assert_eq!(cfg.indicators.rsi_smoothing, RsiSmoothing::Ewm);
        assert_eq!(cfg.signals.buy_rsi, 30.0);
        assert_eq!(cfg.signals.sell_rule, SellRule::Any);
        assert_eq!(cfg.missing_policy, MissingPolicy::Lenient);
        assert_eq!(cfg.email.smtp_port, 465);
        assert_eq!(cfg.order_budget, 500.0);
    }
}

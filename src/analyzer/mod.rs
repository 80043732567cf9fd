// Analyzer module: indicator engine, per-ticker screening, signal rules.

pub mod indicators;
pub mod screener;
pub mod signals;

// Re-export the main analyzer implementation for ease of use.
pub use screener::TickerAnalyzer;

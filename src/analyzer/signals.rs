use crate::config::SignalConfig;
use crate::model::{Signal, TickerResult, TriggerLeg};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Combinator between the RSI leg and the band leg of the SELL rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SellRule {
    /// Either leg fires the signal.
    #[default]
    Any,
    /// Both legs must fire.
    All,
}

/// Partitions result rows into BUY and SELL candidates.
///
/// BUY: oversold rows not currently held, most oversold first.
/// SELL: overbought rows that are held, most overbought first.
/// A ticker can land in at most one of the two sets.
pub fn classify(
    rows: &[TickerResult],
    held: &HashSet<String>,
    cfg: &SignalConfig,
) -> (Vec<Signal>, Vec<Signal>) {
    let mut buy = Vec::new();
    let mut sell = Vec::new();

    for row in rows {
        if !held.contains(&row.ticker) {
            if row.rsi <= cfg.buy_rsi && row.bb_position < cfg.buy_bb {
                buy.push(Signal {
                    row: row.clone(),
                    trigger: TriggerLeg::Both,
                });
            }
            continue;
        }

        let rsi_leg = row.rsi >= cfg.sell_rsi;
        let band_leg = row.bb_position > cfg.sell_bb;
        let fired = match cfg.sell_rule {
            SellRule::Any => rsi_leg || band_leg,
            SellRule::All => rsi_leg && band_leg,
        };
        if fired {
            let trigger = if rsi_leg && band_leg {
                TriggerLeg::Both
            } else if rsi_leg {
                TriggerLeg::Rsi
            } else {
                TriggerLeg::Band
            };
            sell.push(Signal {
                row: row.clone(),
                trigger,
            });
        }
    }

    buy.sort_by(|a, b| by_rsi(a, b).then_with(|| a.row.ticker.cmp(&b.row.ticker)));
    sell.sort_by(|a, b| by_rsi(b, a).then_with(|| a.row.ticker.cmp(&b.row.ticker)));
    (buy, sell)
}

fn by_rsi(a: &Signal, b: &Signal) -> Ordering {
    a.row.rsi.partial_cmp(&b.row.rsi).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ticker: &str, rsi: f64, bb_position: f64) -> TickerResult {
        TickerResult {
            ticker: ticker.to_string(),
            price: 100.0,
            rsi,
            bb_position,
            as_of: "2025-01-30".to_string(),
        }
    }

    fn cfg(buy_rsi: f64, buy_bb: f64, sell_rsi: f64, sell_bb: f64, sell_rule: SellRule) -> SignalConfig {
        SignalConfig {
            buy_rsi,
            buy_bb,
            sell_rsi,
            sell_bb,
            sell_rule,
        }
    }

    fn held(tickers: &[&str]) -> HashSet<String> {
        tickers.iter().map(|t| t.to_string()).collect()
    }

    fn tickers(signals: &[Signal]) -> Vec<&str> {
        signals.iter().map(|s| s.row.ticker.as_str()).collect()
    }

    #[test]
    fn oversold_bought_overbought_sold() {
        let rows = vec![row("AAPL", 15.0, -0.05), row("MSFT", 85.0, 1.1)];
        let (buy, sell) = classify(
            &rows,
            &held(&["MSFT"]),
            &cfg(20.0, 0.0, 80.0, 1.0, SellRule::Any),
        );
        assert_eq!(tickers(&buy), vec!["AAPL"]);
        assert_eq!(tickers(&sell), vec!["MSFT"]);
        assert_eq!(sell[0].trigger, TriggerLeg::Both);
    }

    #[test]
    fn held_ticker_never_bought() {
        let rows = vec![row("AAPL", 15.0, -0.05)];
        let (buy, sell) = classify(
            &rows,
            &held(&["AAPL"]),
            &cfg(20.0, 0.0, 80.0, 1.0, SellRule::Any),
        );
        assert!(buy.is_empty());
        assert!(sell.is_empty());
    }

    #[test]
    fn unheld_ticker_never_sold() {
        let rows = vec![row("MSFT", 95.0, 1.5)];
        let (buy, sell) = classify(&rows, &held(&[]), &cfg(30.0, 0.1, 70.0, 0.9, SellRule::Any));
        assert!(buy.is_empty());
        assert!(sell.is_empty());
    }

    #[test]
    fn buy_needs_both_legs() {
        // Oversold RSI but price not below the band threshold.
        let rows = vec![row("KO", 25.0, 0.4)];
        let (buy, _) = classify(&rows, &held(&[]), &cfg(30.0, 0.1, 70.0, 0.9, SellRule::Any));
        assert!(buy.is_empty());
    }

    #[test]
    fn sell_rule_any_fires_on_single_leg() {
        let rows = vec![row("PG", 75.0, 0.95)];
        let thresholds = cfg(30.0, 0.1, 80.0, 0.9, SellRule::Any);
        let (_, sell) = classify(&rows, &held(&["PG"]), &thresholds);
        assert_eq!(tickers(&sell), vec!["PG"]);
        assert_eq!(sell[0].trigger, TriggerLeg::Band);
    }

    #[test]
    fn sell_rule_all_requires_both_legs() {
        let rows = vec![row("PG", 75.0, 0.95)];
        let thresholds = cfg(30.0, 0.1, 80.0, 0.9, SellRule::All);
        let (_, sell) = classify(&rows, &held(&["PG"]), &thresholds);
        assert!(sell.is_empty());
    }

    #[test]
    fn buy_sorted_ascending_sell_descending() {
        let rows = vec![
            row("B", 18.0, -0.2),
            row("A", 12.0, -0.1),
            row("C", 12.0, -0.3),
            row("Y", 82.0, 1.2),
            row("Z", 91.0, 1.3),
        ];
        let (buy, sell) = classify(
            &rows,
            &held(&["Y", "Z"]),
            &cfg(20.0, 0.0, 80.0, 1.0, SellRule::Any),
        );
        // Most oversold first, ticker breaks the tie.
        assert_eq!(tickers(&buy), vec!["A", "C", "B"]);
        assert_eq!(tickers(&sell), vec!["Z", "Y"]);
    }

    #[test]
    fn buy_and_sell_always_disjoint() {
        let rows = vec![
            row("AAPL", 10.0, -0.5),
            row("MSFT", 50.0, 0.5),
            row("KO", 90.0, 1.2),
            row("PG", 5.0, -0.9),
        ];
        let owned = held(&["KO", "PG"]);
        let (buy, sell) = classify(&rows, &owned, &cfg(30.0, 0.1, 70.0, 0.9, SellRule::Any));
        for bought in tickers(&buy) {
            assert!(!tickers(&sell).contains(&bought));
        }
    }

    #[test]
    fn empty_inputs_yield_empty_sets() {
        let (buy, sell) = classify(&[], &held(&[]), &cfg(30.0, 0.1, 70.0, 0.9, SellRule::Any));
        assert!(buy.is_empty());
        assert!(sell.is_empty());
    }
}

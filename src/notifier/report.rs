// HTML rendering for the signal report email.
use crate::model::{Position, Signal};
use chrono::{DateTime, Utc};

pub fn render_report(
    buy: &[Signal],
    sell: &[Signal],
    positions: &[Position],
    order_budget: f64,
    now: DateTime<Utc>,
) -> String {
    let mut body = format!(
        "<h2>📈 Screening Report - {}</h2>\n",
        now.format("%d/%m/%Y %H:%M")
    );
    body.push_str(&render_portfolio(positions));
    body.push_str(&render_buy(buy, order_budget));
    body.push_str(&render_sell(sell));
    body
}

fn render_portfolio(positions: &[Position]) -> String {
    let mut section = format!("<h3>💰 Current Portfolio ({} positions)</h3>\n", positions.len());
    if positions.is_empty() {
        section.push_str("<p>No open positions.</p>\n");
        return section;
    }

    section.push_str(
        "<table border='1'><tr><th>Ticker</th><th>Action</th><th>Price</th><th>Shares</th><th>Date</th></tr>",
    );
    for position in positions {
        section.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>${}</td><td>{}</td><td>{}</td></tr>",
            position.ticker,
            position.action,
            position.entry_price,
            position.shares,
            position.entry_date
        ));
    }
    section.push_str("</table>\n");
    section
}

fn render_buy(buy: &[Signal], order_budget: f64) -> String {
    let mut section = String::from("<h3>🟢 BUY SIGNALS</h3>\n");
    if buy.is_empty() {
        section.push_str("<p>No buy signals today.</p>\n");
        return section;
    }

    section.push_str(
        "<table border='1'><tr><th>Ticker</th><th>Price</th><th>RSI</th><th>BB Pos</th><th>Suggested Shares</th><th>As Of</th></tr>",
    );
    for signal in buy {
        section.push_str(&format!(
            "<tr><td>{}</td><td>${}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            signal.row.ticker,
            signal.row.price,
            signal.row.rsi,
            signal.row.bb_position,
            suggested_shares(order_budget, signal.row.price),
            signal.row.as_of
        ));
    }
    section.push_str("</table>\n");
    section
}

fn render_sell(sell: &[Signal]) -> String {
    let mut section = String::from("<h3>🔴 SELL SIGNALS</h3>\n");
    if sell.is_empty() {
        section.push_str("<p>No sell signals today.</p>\n");
        return section;
    }

    section.push_str(
        "<table border='1'><tr><th>Ticker</th><th>Price</th><th>RSI</th><th>BB Pos</th><th>Trigger</th><th>As Of</th></tr>",
    );
    for signal in sell {
        section.push_str(&format!(
            "<tr><td>{}</td><td>${}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            signal.row.ticker,
            signal.row.price,
            signal.row.rsi,
            signal.row.bb_position,
            signal.trigger.label(),
            signal.row.as_of
        ));
    }
    section.push_str("</table>\n");
    section
}

/// Whole shares the order budget affords at the signal price.
fn suggested_shares(order_budget: f64, price: f64) -> i64 {
    if price <= 0.0 {
        return 0;
    }
    (order_budget / price).floor() as i64
}

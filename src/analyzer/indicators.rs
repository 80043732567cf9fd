// Indicator engine: RSI and Bollinger Bands over an ordered closing-price
// series.
//
// Both calculations return one slot per input close, `None` where the value
// is undefined: window not yet filled, zero-width band, or no price movement
// at all. Callers decide what to do with the gaps; nothing here ever panics
// or divides by zero. Neither indicator looks ahead: the value at index i
// depends only on closes up to i.

use serde::Deserialize;

/// Smoothing method for the RSI average gain/loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RsiSmoothing {
    /// Exponential smoothing with alpha = 1/period, seeded with the first
    /// gain/loss pair. Defined from index 1.
    #[default]
    Ewm,
    /// Wilder's method: simple mean of the first `period` gains/losses as
    /// the seed, then avg = (avg * (period - 1) + x) / period. Defined from
    /// index `period`.
    Wilder,
}

pub fn rsi_series(closes: &[f64], period: usize, smoothing: RsiSmoothing) -> Vec<Option<f64>> {
    match smoothing {
        RsiSmoothing::Ewm => rsi_ewm(closes, period),
        RsiSmoothing::Wilder => rsi_wilder(closes, period),
    }
}

fn gain_loss(prev: f64, next: f64) -> (f64, f64) {
    let delta = next - prev;
    if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) }
}

/// RS = avg_gain / avg_loss, RSI = 100 - 100 / (1 + RS). With no losses RS
/// is infinite and RSI saturates at 100; with no movement at all the value
/// is undefined.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_gain == 0.0 && avg_loss == 0.0 {
        None
    } else if avg_loss == 0.0 {
        Some(100.0)
    } else {
        let rs = avg_gain / avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}

fn rsi_ewm(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < 2 {
        return out;
    }

    let alpha = 1.0 / period as f64;
    let (mut avg_gain, mut avg_loss) = gain_loss(closes[0], closes[1]);
    out[1] = rsi_value(avg_gain, avg_loss);

    for i in 2..closes.len() {
        let (gain, loss) = gain_loss(closes[i - 1], closes[i]);
        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
        out[i] = rsi_value(avg_gain, avg_loss);
    }

    out
}

fn rsi_wilder(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    // Needs `period` deltas before the first value.
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    let period_f = period as f64;
    let mut sum_gain = 0.0;
    let mut sum_loss = 0.0;
    for i in 1..=period {
        let (gain, loss) = gain_loss(closes[i - 1], closes[i]);
        sum_gain += gain;
        sum_loss += loss;
    }

    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;
    out[period] = rsi_value(avg_gain, avg_loss);

    for i in period + 1..closes.len() {
        let (gain, loss) = gain_loss(closes[i - 1], closes[i]);
        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;
        out[i] = rsi_value(avg_gain, avg_loss);
    }

    out
}

/// Bollinger Bands at one index: rolling SMA +/- 2 sample standard
/// deviations over the trailing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub sma: f64,
    pub upper: f64,
    pub lower: f64,
}

impl Bands {
    /// Position of a price inside the band: 0 at the lower band, 1 at the
    /// upper, unbounded outside. `None` when the band has zero width.
    pub fn position(&self, close: f64) -> Option<f64> {
        let width = self.upper - self.lower;
        if width == 0.0 {
            None
        } else {
            Some((close - self.lower) / width)
        }
    }
}

/// Minimum periods equals the window: indices before `window - 1` are
/// strictly `None`, never a noisy partial value.
pub fn bollinger_series(closes: &[f64], window: usize) -> Vec<Option<Bands>> {
    let mut out = vec![None; closes.len()];
    // Sample variance needs at least two observations.
    if window < 2 || closes.len() < window {
        return out;
    }

    for i in window - 1..closes.len() {
        let slice = &closes[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance =
            slice.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (window as f64 - 1.0);
        let sigma = variance.sqrt();
        out[i] = Some(Bands {
            sma: mean,
            upper: mean + 2.0 * sigma,
            lower: mean - 2.0 * sigma,
        });
    }

    out
}

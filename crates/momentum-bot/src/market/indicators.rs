//! Technical indicator series derived from daily bars
//!
//! A deterministic transform: the same bars always produce the same rows.
//! Indicator warm-up follows the `ta` crate's ramping behavior (values are
//! computed over however much history is available so far).

use ta::Next;
use ta::indicators::{
    AverageTrueRange, BollingerBands, ExponentialMovingAverage, RelativeStrengthIndex,
    SimpleMovingAverage,
};

use crate::market::snapshot::IndicatorRow;
use crate::market::yahoo::DailyBar;

const SMA_SHORT: usize = 50;
const SMA_LONG: usize = 200;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const RSI_PERIOD: usize = 14;
const BB_PERIOD: usize = 20;
const BB_STDDEV: f64 = 2.0;
const ATR_PERIOD: usize = 14;
const ROC_PERIOD: usize = 10;

/// Number of most-recent sessions carried into the snapshot
pub const INDICATOR_TAIL: usize = 30;

/// Compute the indicator series for a run of daily bars, oldest first
///
/// Returns the full series; callers usually keep only the tail via
/// [`indicator_tail`]. Empty input yields an empty series.
pub fn compute_indicators(bars: &[DailyBar]) -> Vec<IndicatorRow> {
    if bars.is_empty() {
        return Vec::new();
    }

    // Constructors only fail on a zero period; the periods here are
    // compile-time constants.
    let Ok(mut sma_short) = SimpleMovingAverage::new(SMA_SHORT) else {
        return Vec::new();
    };
    let Ok(mut sma_long) = SimpleMovingAverage::new(SMA_LONG) else {
        return Vec::new();
    };
    let Ok(mut ema_fast) = ExponentialMovingAverage::new(MACD_FAST) else {
        return Vec::new();
    };
    let Ok(mut ema_slow) = ExponentialMovingAverage::new(MACD_SLOW) else {
        return Vec::new();
    };
    let Ok(mut macd_signal) = ExponentialMovingAverage::new(MACD_SIGNAL) else {
        return Vec::new();
    };
    let Ok(mut rsi) = RelativeStrengthIndex::new(RSI_PERIOD) else {
        return Vec::new();
    };
    let Ok(mut bollinger) = BollingerBands::new(BB_PERIOD, BB_STDDEV) else {
        return Vec::new();
    };
    let Ok(mut atr) = AverageTrueRange::new(ATR_PERIOD) else {
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(bars.len());
    let mut obv = 0.0_f64;
    let mut prev_close: Option<f64> = None;

    for (i, bar) in bars.iter().enumerate() {
        let close = bar.close;

        let macd = ema_fast.next(close) - ema_slow.next(close);
        let bands = bollinger.next(close);

        // On-balance volume accumulates signed volume by close direction.
        if let Some(prev) = prev_close {
            if close > prev {
                obv += bar.volume as f64;
            } else if close < prev {
                obv -= bar.volume as f64;
            }
        }
        prev_close = Some(close);

        // True range needs high/low/close; fall back to close-only when the
        // bar fails range validation (e.g. zero-volume placeholder rows).
        let atr_value = match ta::DataItem::builder()
            .open(bar.open)
            .high(bar.high)
            .low(bar.low)
            .close(close)
            .volume(bar.volume as f64)
            .build()
        {
            Ok(item) => atr.next(&item),
            Err(_) => atr.next(close),
        };

        let roc_10 = i.checked_sub(ROC_PERIOD).and_then(|j| {
            let base = bars[j].close;
            (base != 0.0).then(|| (close / base - 1.0) * 100.0)
        });

        rows.push(IndicatorRow {
            timestamp: bar.timestamp,
            sma_50: sma_short.next(close),
            sma_200: sma_long.next(close),
            macd,
            macd_signal: macd_signal.next(macd),
            rsi: rsi.next(close),
            bb_upper: bands.upper,
            bb_middle: bands.average,
            bb_lower: bands.lower,
            atr: atr_value,
            obv,
            roc_10,
        });
    }

    rows
}

/// The most recent [`INDICATOR_TAIL`] rows of a series
pub fn indicator_tail(rows: Vec<IndicatorRow>) -> Vec<IndicatorRow> {
    let skip = rows.len().saturating_sub(INDICATOR_TAIL);
    rows.into_iter().skip(skip).collect()
}

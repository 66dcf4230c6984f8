use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, decimal_to_f64};
use crate::error::{ChartError, ChartResult};

/// One OHLCV sample for a time bucket.
///
/// Bars are immutable once built. The chart stores them in an ascending-time
/// array and uses the array index as the bar's horizontal position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bucket start as unix seconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Builds a validated bar from raw floating values.
    ///
    /// Invariants:
    /// - all prices and the volume are finite
    /// - `low <= high`
    /// - `open` and `close` are within `[low, high]`
    /// - `volume >= 0`
    pub fn new(
        timestamp: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> ChartResult<Self> {
        if !open.is_finite()
            || !high.is_finite()
            || !low.is_finite()
            || !close.is_finite()
            || !volume.is_finite()
        {
            return Err(ChartError::InvalidData(
                "ohlcv values must be finite".to_owned(),
            ));
        }

        if low > high {
            return Err(ChartError::InvalidData(
                "bar low must be <= high".to_owned(),
            ));
        }

        if open < low || open > high || close < low || close > high {
            return Err(ChartError::InvalidData(
                "bar open/close must be within low/high range".to_owned(),
            ));
        }

        if volume < 0.0 {
            return Err(ChartError::InvalidData(
                "bar volume must be >= 0".to_owned(),
            ));
        }

        Ok(Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Converts strongly-typed temporal/decimal input into a validated bar.
    pub fn from_decimal_time(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> ChartResult<Self> {
        Self::new(
            datetime_to_unix_seconds(time),
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
            decimal_to_f64(volume, "volume")?,
        )
    }

    /// Returns `true` when close price is greater than or equal to open price.
    #[must_use]
    pub fn is_bullish(self) -> bool {
        self.close >= self.open
    }
}

#[cfg(test)]
mod tests {
    use super::Bar;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    #[test]
    fn rejects_inverted_wick() {
        assert!(Bar::new(0, 10.0, 9.0, 11.0, 10.0, 1.0).is_err());
    }

    #[test]
    fn rejects_body_outside_wick() {
        assert!(Bar::new(0, 12.0, 11.0, 9.0, 10.0, 1.0).is_err());
        assert!(Bar::new(0, 10.0, 11.0, 9.0, 8.0, 1.0).is_err());
    }

    #[test]
    fn rejects_negative_or_non_finite_volume() {
        assert!(Bar::new(0, 10.0, 11.0, 9.0, 10.0, -1.0).is_err());
        assert!(Bar::new(0, 10.0, 11.0, 9.0, 10.0, f64::NAN).is_err());
    }

    #[test]
    fn decimal_input_maps_to_unix_seconds() {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().expect("time");
        let bar = Bar::from_decimal_time(
            time,
            Decimal::new(1005, 1),
            Decimal::new(110, 0),
            Decimal::new(90, 0),
            Decimal::new(105, 0),
            Decimal::new(1000, 0),
        )
        .expect("valid bar");
        assert_eq!(bar.timestamp, time.timestamp());
        assert!((bar.open - 100.5).abs() <= 1e-12);
        assert!(bar.is_bullish());
    }
}

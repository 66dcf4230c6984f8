use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub type PriceLabelFormatterFn = Arc<dyn Fn(f64) -> String + Send + Sync + 'static>;
pub type TimeLabelFormatterFn = Arc<dyn Fn(i64) -> String + Send + Sync + 'static>;

/// Display rules of the quote currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    /// Fraction digits shown on every price label. Also drives the y-axis width.
    pub decimals: u8,
    pub group_separator: Option<char>,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_owned(),
            decimals: 2,
            group_separator: Some(','),
        }
    }
}

/// Formats `value` as `-$1,234.56` with half-away-from-zero rounding.
#[must_use]
pub fn format_currency(value: f64, currency: &CurrencyFormat) -> String {
    let decimals = usize::from(currency.decimals);
    let Some(decimal) = Decimal::from_f64(value) else {
        return format!("{}{value:.decimals$}", currency.symbol);
    };
    let rounded = decimal.round_dp_with_strategy(
        u32::from(currency.decimals),
        RoundingStrategy::MidpointAwayFromZero,
    );
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.decimals$}", rounded.abs());
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + currency.symbol.len() + 4);
    if negative {
        out.push('-');
    }
    out.push_str(&currency.symbol);
    match currency.group_separator {
        Some(separator) => push_grouped(&mut out, integer, separator),
        None => out.push_str(integer),
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn push_grouped(out: &mut String, integer: &str, separator: char) {
    let len = integer.len();
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
}

/// Bucket size of the loaded bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandleResolution {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
}

impl CandleResolution {
    #[must_use]
    pub fn seconds(self) -> i64 {
        match self {
            Self::OneMinute => 60,
            Self::FiveMinutes => 300,
            Self::FifteenMinutes => 900,
            Self::OneHour => 3_600,
            Self::FourHours => 14_400,
            Self::OneDay => 86_400,
            Self::OneWeek => 604_800,
        }
    }

    #[must_use]
    pub fn is_intraday(self) -> bool {
        self.seconds() < 86_400
    }
}

/// Formats bar timestamps for the x-axis edge labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFormatter {
    resolution: CandleResolution,
}

impl TimeFormatter {
    #[must_use]
    pub fn new(resolution: CandleResolution) -> Self {
        Self { resolution }
    }

    #[must_use]
    pub fn resolution(self) -> CandleResolution {
        self.resolution
    }

    /// Standalone label carrying the full date context for the resolution.
    #[must_use]
    pub fn format(self, timestamp: i64) -> String {
        let Some(time) = DateTime::<Utc>::from_timestamp(timestamp, 0) else {
            return String::new();
        };
        let pattern = if self.resolution.is_intraday() {
            "%b %-d %H:%M"
        } else {
            "%b %-d"
        };
        time.format(pattern).to_string()
    }

    /// Labels for the first and last visible bars.
    ///
    /// Intraday labels drop the date when both bars fall on the same day;
    /// daily and weekly labels add the year when the span crosses one.
    #[must_use]
    pub fn format_span(self, start: i64, end: i64) -> (String, String) {
        let (Some(first), Some(last)) = (
            DateTime::<Utc>::from_timestamp(start, 0),
            DateTime::<Utc>::from_timestamp(end, 0),
        ) else {
            return (self.format(start), self.format(end));
        };

        let pattern = if self.resolution.is_intraday() {
            if first.date_naive() == last.date_naive() {
                "%H:%M"
            } else {
                "%b %-d %H:%M"
            }
        } else if first.year() == last.year() {
            "%b %-d"
        } else {
            "%b %-d, %Y"
        };
        (
            first.format(pattern).to_string(),
            last.format(pattern).to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands_and_pads_fraction() {
        let usd = CurrencyFormat::default();
        assert_eq!(format_currency(1_234_567.5, &usd), "$1,234,567.50");
        assert_eq!(format_currency(112.0, &usd), "$112.00");
        assert_eq!(format_currency(-1_234.5, &usd), "-$1,234.50");
        assert_eq!(format_currency(-0.001, &usd), "$0.00");
    }

    #[test]
    fn currency_without_grouping() {
        let eur = CurrencyFormat {
            symbol: "€".to_owned(),
            decimals: 3,
            group_separator: None,
        };
        assert_eq!(format_currency(4_321.0, &eur), "€4321.000");
    }

    #[test]
    fn intraday_same_day_span_drops_date() {
        let formatter = TimeFormatter::new(CandleResolution::FiveMinutes);
        // 2024-03-05 09:00 and 13:30 UTC
        let (left, right) = formatter.format_span(1_709_629_200, 1_709_645_400);
        assert_eq!(left, "09:00");
        assert_eq!(right, "13:30");
    }

    #[test]
    fn intraday_multi_day_span_keeps_date() {
        let formatter = TimeFormatter::new(CandleResolution::OneHour);
        let (left, right) = formatter.format_span(1_709_629_200, 1_709_629_200 + 86_400);
        assert_eq!(left, "Mar 5 09:00");
        assert_eq!(right, "Mar 6 09:00");
    }

    #[test]
    fn weekly_span_across_years_adds_year() {
        let formatter = TimeFormatter::new(CandleResolution::OneWeek);
        // 2023-12-25 and 2024-01-08
        let (left, right) = formatter.format_span(1_703_462_400, 1_704_672_000);
        assert_eq!(left, "Dec 25, 2023");
        assert_eq!(right, "Jan 8, 2024");
    }
}

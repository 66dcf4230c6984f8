use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::{Bar, PriceBounds, VisibleRange};

/// Character-width factor used to size the y-axis from a label's length.
const Y_AXIS_PX_PER_CHAR: f64 = 52.0 / 6.0;

/// Smoothed volume-axis maximum.
///
/// The scale may grow instantly but only shrinks by `decay_factor` per
/// recompute, so a single outlier scrolling out of view does not snap the
/// volume bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeScale {
    pub max_displayed_volume: f64,
}

impl VolumeScale {
    /// Scale with no history; the next recompute takes the raw maximum.
    pub const RESET: Self = Self {
        max_displayed_volume: 0.0,
    };

    #[must_use]
    pub fn next(self, raw_max: f64, decay_factor: f64) -> Self {
        Self {
            max_displayed_volume: (self.max_displayed_volume * decay_factor).max(raw_max),
        }
    }
}

impl Default for VolumeScale {
    fn default() -> Self {
        Self::RESET
    }
}

/// Merges visible bars' wicks with an optional extra (indicator) range, then
/// pads by `range * padding_ratio`.
///
/// An empty range yields [`PriceBounds::DEFAULT`]; a flat range with no
/// padding widens by half a unit on each side so `max > min` holds.
#[must_use]
pub fn compute_price_bounds(
    bars: &[Bar],
    range: Option<VisibleRange>,
    extra: Option<(f64, f64)>,
    padding_ratio: f64,
) -> PriceBounds {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    if let Some(range) = range {
        for bar in bars
            .iter()
            .take(range.end_index + 1)
            .skip(range.start_index)
        {
            min = min.min(bar.low);
            max = max.max(bar.high);
        }
    }

    if let Some((extra_min, extra_max)) = extra {
        min = min.min(extra_min);
        max = max.max(extra_max);
    }

    if !min.is_finite() || !max.is_finite() {
        return PriceBounds::DEFAULT;
    }

    let span = max - min;
    let span = if span == 0.0 { 1.0 } else { span };
    let padding = span * padding_ratio;
    if padding > 0.0 {
        PriceBounds::new(min - padding, max + padding)
    } else if max > min {
        PriceBounds::new(min, max)
    } else {
        PriceBounds::new(min - 0.5, max + 0.5)
    }
}

/// Raw maximum volume over the visible range (0 when empty).
#[must_use]
pub fn max_volume_in_range(bars: &[Bar], range: Option<VisibleRange>) -> f64 {
    let Some(range) = range else {
        return 0.0;
    };
    bars.iter()
        .take(range.end_index + 1)
        .skip(range.start_index)
        .map(|bar| OrderedFloat(bar.volume))
        .max()
        .map_or(0.0, |max| max.into_inner())
}

/// Y-axis panel width needed for the wider of the two bound labels.
#[must_use]
pub fn y_axis_width(bounds: PriceBounds, decimals: u8, padding_left: f64, padding_right: f64) -> f64 {
    let decimals = usize::from(decimals);
    let min_chars = format!("{:.decimals$}", bounds.min).len();
    let max_chars = format!("{:.decimals$}", bounds.max).len();
    padding_left + y_axis_label_width(min_chars.max(max_chars)) + padding_right
}

#[must_use]
pub fn y_axis_label_width(chars: usize) -> f64 {
    (chars as f64 * Y_AXIS_PX_PER_CHAR).ceil()
}

/// Rounds a raw interval to the nearest 1x, 2x, 5x or 10x power of ten.
#[must_use]
pub fn nice_interval(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 1.0;
    }

    let base = 10.0_f64.powf(value.log10().floor());
    let fraction = value / base;
    let nice = if fraction <= 1.5 {
        1.0
    } else if fraction <= 3.0 {
        2.0
    } else if fraction <= 7.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

/// Price <-> y mapping over the candle region (chart height minus volume strip).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceProjection {
    pub bounds: PriceBounds,
    pub candle_region_height: f64,
}

impl PriceProjection {
    #[must_use]
    pub fn new(bounds: PriceBounds, chart_height: f64, volume_height_factor: f64) -> Self {
        Self {
            bounds,
            candle_region_height: chart_height - chart_height * volume_height_factor,
        }
    }

    #[must_use]
    pub fn price_to_y(self, price: f64) -> f64 {
        let range = self.bounds.range();
        if range == 0.0 {
            return self.candle_region_height / 2.0;
        }
        self.candle_region_height - ((price - self.bounds.min) / range) * self.candle_region_height
    }

    #[must_use]
    pub fn y_to_price(self, y: f64) -> f64 {
        if self.candle_region_height == 0.0 {
            return self.bounds.min;
        }
        self.bounds.min
            + (self.bounds.range() * (self.candle_region_height - y)) / self.candle_region_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(low: f64, high: f64, volume: f64) -> Bar {
        Bar::new(0, low, high, low, high, volume).expect("bar")
    }

    #[test]
    fn empty_range_defaults_to_unit_bounds() {
        assert_eq!(compute_price_bounds(&[], None, None, 0.1), PriceBounds::DEFAULT);
    }

    #[test]
    fn bounds_are_padded_by_ratio() {
        let bars = [bar(90.0, 110.0, 1.0)];
        let bounds = compute_price_bounds(&bars, Some(VisibleRange::new(0, 0)), None, 0.1);
        assert!((bounds.min - 88.0).abs() <= 1e-12);
        assert!((bounds.max - 112.0).abs() <= 1e-12);
    }

    #[test]
    fn flat_range_pads_by_unit_span() {
        let bars = [bar(5.0, 5.0, 1.0)];
        let bounds = compute_price_bounds(&bars, Some(VisibleRange::new(0, 0)), None, 0.1);
        assert!(bounds.max > bounds.min);
        assert!((bounds.min - 4.9).abs() <= 1e-12);
    }

    #[test]
    fn flat_range_without_padding_keeps_positive_span() {
        let bars = [bar(5.0, 5.0, 1.0)];
        let bounds = compute_price_bounds(&bars, Some(VisibleRange::new(0, 0)), None, 0.0);
        assert_eq!(bounds, PriceBounds::new(4.5, 5.5));
    }

    #[test]
    fn indicator_range_extends_bounds() {
        let bars = [bar(90.0, 110.0, 1.0)];
        let bounds =
            compute_price_bounds(&bars, Some(VisibleRange::new(0, 0)), Some((80.0, 100.0)), 0.0);
        assert_eq!(bounds, PriceBounds::new(80.0, 110.0));
    }

    #[test]
    fn volume_scale_decays_gradually() {
        let scale = VolumeScale {
            max_displayed_volume: 1_000.0,
        };
        assert!((scale.next(10.0, 0.97).max_displayed_volume - 970.0).abs() <= 1e-9);
        assert_eq!(scale.next(2_000.0, 0.97).max_displayed_volume, 2_000.0);
    }

    #[test]
    fn max_volume_only_scans_range() {
        let bars = [bar(1.0, 2.0, 500.0), bar(1.0, 2.0, 10.0), bar(1.0, 2.0, 20.0)];
        assert_eq!(max_volume_in_range(&bars, Some(VisibleRange::new(1, 2))), 20.0);
        assert_eq!(max_volume_in_range(&bars, None), 0.0);
    }

    #[test]
    fn nice_interval_rounds_to_1_2_5_10() {
        assert_eq!(nice_interval(1.2), 1.0);
        assert_eq!(nice_interval(2.6), 2.0);
        assert_eq!(nice_interval(4.0), 5.0);
        assert_eq!(nice_interval(8.0), 10.0);
        assert!((nice_interval(0.025) - 0.02).abs() <= 1e-12);
    }

    #[test]
    fn y_axis_width_uses_longest_label() {
        let width = y_axis_width(PriceBounds::new(9.5, 1234.5), 2, 12.0, 8.0);
        // "1234.50" is 7 chars -> ceil(7 * 52 / 6) = 61
        assert_eq!(width, 12.0 + 61.0 + 8.0);
    }

    #[test]
    fn projection_round_trips() {
        let projection = PriceProjection::new(PriceBounds::new(100.0, 200.0), 400.0, 0.25);
        let y = projection.price_to_y(150.0);
        assert!((y - 150.0).abs() <= 1e-9);
        assert!((projection.y_to_price(y) - 150.0).abs() <= 1e-9);
    }
}

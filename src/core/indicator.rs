use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[cfg(feature = "parallel-indicators")]
use rayon::prelude::*;

use crate::core::{Bar, PriceProjection, Viewport, ViewportGeometry, VisibleRange};
use crate::render::{Color, PathPrimitive, PictureRecorder};

/// Corner radius applied where overlay path segments meet.
const PATH_CORNER_RADIUS: f64 = 6.0;

/// Registered overlay identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndicatorKey {
    #[serde(rename = "EMA9")]
    Ema9,
    #[serde(rename = "EMA20")]
    Ema20,
    #[serde(rename = "EMA50")]
    Ema50,
}

impl IndicatorKey {
    pub const ALL: [IndicatorKey; 3] = [IndicatorKey::Ema9, IndicatorKey::Ema20, IndicatorKey::Ema50];

    #[must_use]
    pub fn period(self) -> usize {
        match self {
            Self::Ema9 => 9,
            Self::Ema20 => 20,
            Self::Ema50 => 50,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ema9 => "EMA9",
            Self::Ema20 => "EMA20",
            Self::Ema50 => "EMA50",
        }
    }

    /// The overlay registered for this key with its stock color.
    #[must_use]
    pub fn default_indicator(self) -> Indicator {
        let color = match self {
            Self::Ema9 => Color::rgb(1.0, 1.0, 1.0),
            Self::Ema20 => Color::from_rgb8(0x42, 0xA5, 0xF5),
            Self::Ema50 => Color::from_rgb8(0xAB, 0x47, 0xBC),
        };
        Indicator::Ema {
            period: self.period(),
            color,
        }
    }
}

/// Toggle target: one overlay or every registered overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorSelector {
    One(IndicatorKey),
    All,
}

impl From<IndicatorKey> for IndicatorSelector {
    fn from(key: IndicatorKey) -> Self {
        Self::One(key)
    }
}

/// Overlay kind. Each variant computes its full series from the bar array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Indicator {
    /// Exponential moving average of closes, seeded with the first close.
    Ema { period: usize, color: Color },
    /// Simple moving average of closes; undefined before `period` bars.
    Sma { period: usize, color: Color },
}

impl Indicator {
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            Self::Ema { color, .. } | Self::Sma { color, .. } => color,
        }
    }

    #[must_use]
    pub fn period(self) -> usize {
        match self {
            Self::Ema { period, .. } | Self::Sma { period, .. } => period,
        }
    }

    /// Series aligned 1:1 with `bars`.
    #[must_use]
    pub fn compute(self, bars: &[Bar]) -> Vec<Option<f64>> {
        match self {
            Self::Ema { period, .. } => ema(bars, period),
            Self::Sma { period, .. } => sma(bars, period),
        }
    }
}

fn ema(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(bars.len());
    let mut prev: Option<f64> = None;
    for bar in bars {
        let value = match prev {
            None => bar.close,
            Some(prev) => bar.close * k + prev * (1.0 - k),
        };
        prev = Some(value);
        out.push(Some(value));
    }
    out
}

fn sma(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let period = period.max(1);
    let mut out = Vec::with_capacity(bars.len());
    let mut sum = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        sum += bar.close;
        if i >= period {
            sum -= bars[i - period].close;
        }
        out.push((i + 1 >= period).then(|| sum / period as f64));
    }
    out
}

/// Viewport facts needed to stroke overlay series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorDrawParams {
    pub range: VisibleRange,
    pub geometry: ViewportGeometry,
    pub viewport: Viewport,
    pub projection: PriceProjection,
    pub stroke_width: f64,
}

/// One registered overlay and its last computed series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorEntry {
    pub indicator: Indicator,
    pub series: Vec<Option<f64>>,
}

/// Registry of overlays plus the active (drawn) subset.
///
/// Series are recomputed from scratch whenever the bar array changes. Only
/// active overlays take part in bounds and drawing.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    entries: IndexMap<IndicatorKey, IndicatorEntry>,
    active: IndexSet<IndicatorKey>,
    computed_len: usize,
}

impl IndicatorSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the registry. Previously active keys that are still
    /// registered stay active.
    pub fn register_indicators(&mut self, list: impl IntoIterator<Item = (IndicatorKey, Indicator)>) {
        self.entries = list
            .into_iter()
            .map(|(key, indicator)| {
                (
                    key,
                    IndicatorEntry {
                        indicator,
                        series: Vec::new(),
                    },
                )
            })
            .collect();
        let entries = &self.entries;
        self.active.retain(|key| entries.contains_key(key));
        self.computed_len = 0;
    }

    pub fn compute_all(&mut self, bars: &[Bar]) {
        #[cfg(feature = "parallel-indicators")]
        {
            self.entries
                .par_values_mut()
                .for_each(|entry| entry.series = entry.indicator.compute(bars));
        }

        #[cfg(not(feature = "parallel-indicators"))]
        {
            for entry in self.entries.values_mut() {
                entry.series = entry.indicator.compute(bars);
            }
        }

        self.computed_len = bars.len();
        trace!(
            indicators = self.entries.len(),
            bars = bars.len(),
            "recomputed indicator series"
        );
    }

    /// Activates `keys`; computes series first if they are stale for `bars`.
    /// Returns `true` when the active set changed.
    pub fn show_indicators(&mut self, keys: &[IndicatorKey], bars: &[Bar]) -> bool {
        let mut changed = false;
        for key in keys {
            if self.entries.contains_key(key) && self.active.insert(*key) {
                changed = true;
            }
        }
        if changed && self.computed_len != bars.len() {
            self.compute_all(bars);
        }
        if changed {
            self.active.sort();
        }
        changed
    }

    /// Deactivates `keys`. Returns `true` when the active set changed.
    pub fn hide_indicators(&mut self, keys: &[IndicatorKey]) -> bool {
        let mut changed = false;
        for key in keys {
            changed |= self.active.shift_remove(key);
        }
        changed
    }

    #[must_use]
    pub fn is_active(&self, key: IndicatorKey) -> bool {
        self.active.contains(&key)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.entries.len()
    }

    pub fn active_keys(&self) -> impl Iterator<Item = IndicatorKey> + '_ {
        self.active.iter().copied()
    }

    /// Active overlays in draw order.
    pub fn active_entries(&self) -> impl Iterator<Item = (IndicatorKey, &IndicatorEntry)> {
        self.active
            .iter()
            .filter_map(|key| self.entries.get(key).map(|entry| (*key, entry)))
    }

    pub fn entry_mut(&mut self, key: IndicatorKey) -> Option<&mut IndicatorEntry> {
        self.entries.get_mut(&key)
    }

    /// Min/max over active overlays inside `range`. Inactive overlays
    /// contribute nothing.
    #[must_use]
    pub fn min_max_for_range(&self, range: Option<VisibleRange>) -> Option<(f64, f64)> {
        let range = range?;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (_, entry) in self.active_entries() {
            for value in entry
                .series
                .iter()
                .take(range.end_index + 1)
                .skip(range.start_index)
                .flatten()
            {
                min = min.min(*value);
                max = max.max(*value);
            }
        }
        (min.is_finite() && max.is_finite()).then_some((min, max))
    }

    /// Strokes one path per active overlay across `params.range`. Undefined
    /// values split the path; runs shorter than two points are skipped.
    pub fn draw_all(&self, recorder: &mut PictureRecorder, params: &IndicatorDrawParams) {
        for (_, entry) in self.active_entries() {
            let color = entry.indicator.color();
            let mut points = Vec::with_capacity(params.range.bar_count());
            for index in params.range.indices() {
                match entry.series.get(index).copied().flatten() {
                    Some(value) => points.push((
                        params.geometry.pixel_x(index, params.viewport),
                        params.projection.price_to_y(value),
                    )),
                    None => flush_path(recorder, &mut points, params.stroke_width, color),
                }
            }
            flush_path(recorder, &mut points, params.stroke_width, color);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.active.clear();
        self.computed_len = 0;
    }
}

fn flush_path(
    recorder: &mut PictureRecorder,
    points: &mut Vec<(f64, f64)>,
    stroke_width: f64,
    color: Color,
) {
    if points.len() < 2 {
        points.clear();
        return;
    }
    recorder.path(
        PathPrimitive::new(std::mem::take(points), stroke_width, color)
            .with_corner_radius(PATH_CORNER_RADIUS),
    );
}

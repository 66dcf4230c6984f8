use crate::core::{Bar, IndicatorSet, PriceBounds, Viewport, VisibleRange, VolumeScale};
use crate::interaction::{AnimatedValue, AnimationTarget};

/// Bar data plus the overlays computed from it.
pub(super) struct ChartModel {
    pub(super) bars: Vec<Bar>,
    pub(super) indicators: IndicatorSet,
    pub(super) has_previous_candles: bool,
    pub(super) loading_history: bool,
}

impl ChartModel {
    #[must_use]
    pub(super) fn new(indicators: IndicatorSet) -> Self {
        Self {
            bars: Vec::new(),
            indicators,
            has_previous_candles: false,
            loading_history: false,
        }
    }
}

/// The single owned copy of every animated value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct ChartViewState {
    pub(super) viewport: Viewport,
    pub(super) bounds: PriceBounds,
    pub(super) max_volume: f64,
}

impl AnimationTarget for ChartViewState {
    fn value(&self, key: AnimatedValue) -> f64 {
        match key {
            AnimatedValue::Offset => self.viewport.offset,
            AnimatedValue::MinPrice => self.bounds.min,
            AnimatedValue::MaxPrice => self.bounds.max,
            AnimatedValue::MaxVolume => self.max_volume,
        }
    }

    fn set_value(&mut self, key: AnimatedValue, value: f64) {
        match key {
            AnimatedValue::Offset => self.viewport = self.viewport.with_offset(value),
            AnimatedValue::MinPrice => self.bounds.min = value,
            AnimatedValue::MaxPrice => self.bounds.max = value,
            AnimatedValue::MaxVolume => self.max_volume = value,
        }
    }
}

/// View state plus the layout facts derived from the last bounds pass.
pub(super) struct ChartLayoutState {
    pub(super) view: ChartViewState,
    /// Shift from a history prepend not yet folded into `view.viewport.offset`.
    /// Every read uses `offset + pending_offset`.
    pub(super) pending_offset: f64,
    pub(super) y_axis_width: f64,
    /// Smoothed volume target; `None` until the first recompute after a reset.
    pub(super) volume_scale: Option<VolumeScale>,
    pub(super) last_visible_range: Option<VisibleRange>,
}

impl ChartLayoutState {
    #[must_use]
    pub(super) fn new(viewport: Viewport, y_axis_width: f64) -> Self {
        Self {
            view: ChartViewState {
                viewport,
                bounds: PriceBounds::DEFAULT,
                max_volume: 0.0,
            },
            pending_offset: 0.0,
            y_axis_width,
            volume_scale: None,
            last_visible_range: None,
        }
    }
}

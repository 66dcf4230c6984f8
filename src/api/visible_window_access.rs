use tracing::trace;

use crate::core::{ViewportGeometry, VisibleRange};
use crate::interaction::{AnimatedValue, ChartEvent};
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    pub(super) fn geometry(&self) -> ViewportGeometry {
        let presentation = &self.core.presentation;
        let candles = &presentation.config.candles;
        ViewportGeometry {
            chart_width: presentation.dimensions.width,
            y_axis_width: self.core.layout.y_axis_width,
            bar_count: self.core.model.bars.len(),
            spacing_ratio: candles.spacing_ratio,
            min_candle_width: candles.min_width,
            max_candle_width: candles.max_width,
        }
    }

    /// Displayed offset: the raw animated offset plus the pending prepend shift.
    pub(super) fn offset_x(&self) -> f64 {
        self.core.layout.view.viewport.offset + self.core.layout.pending_offset
    }

    /// Offset that puts the newest bar flush against the y-axis.
    #[must_use]
    pub fn min_offset(&self) -> f64 {
        self.geometry()
            .min_offset(self.core.layout.view.viewport.candle_width)
    }

    pub(super) fn clamp_offset(&self, offset: f64) -> f64 {
        self.geometry()
            .clamp_offset(offset, self.core.layout.view.viewport.candle_width)
    }

    /// Bars intersecting the chart, with one bar of overscan per side.
    #[must_use]
    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.geometry().visible_range(self.viewport())
    }

    /// Index and center x of the bar nearest to pixel `x`.
    #[must_use]
    pub fn nearest_bar(&self, x: f64) -> Option<(usize, f64)> {
        let geometry = self.geometry();
        let viewport = self.viewport();
        geometry
            .nearest_index(x, viewport)
            .map(|index| (index, geometry.pixel_x(index, viewport)))
    }

    /// Sets the displayed offset immediately, cancelling any momentum run.
    pub(super) fn set_offset_direct(&mut self, offset_x: f64) {
        let raw = offset_x - self.core.layout.pending_offset;
        self.core
            .runtime
            .animator
            .direct(&mut self.core.layout.view, AnimatedValue::Offset, raw);
        self.process_settled();
    }

    /// Folds the pending prepend shift into the raw offset. The displayed
    /// offset does not move.
    pub(super) fn commit_pending_offset(&mut self) {
        let layout = &mut self.core.layout;
        if layout.pending_offset == 0.0 {
            return;
        }
        let committed = layout.view.viewport.offset + layout.pending_offset;
        layout.view.viewport = layout.view.viewport.with_offset(committed);
        trace!(
            pending = layout.pending_offset,
            offset = committed,
            "committed pending offset"
        );
        layout.pending_offset = 0.0;
    }

    pub(super) fn set_decelerating(&mut self, decelerating: bool) {
        if self
            .core
            .runtime
            .interaction
            .set_decelerating(decelerating)
        {
            self.emit(ChartEvent::DecelerationChanged(decelerating));
        }
    }

    /// Requests older history when the viewport nears the oldest bar.
    pub(super) fn request_history_near_edge(&mut self, offset_x: f64) {
        if offset_x.abs() < self.core.presentation.config.chart.history_load_threshold_px {
            self.request_additional_candles();
        }
    }
}

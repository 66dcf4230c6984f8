use serde::{Deserialize, Serialize};

use crate::core::VisibleRange;
use crate::core::primitives::clamp_f64;

/// Pannable/zoomable window over the bar array.
///
/// `offset` is the pixel position of bar 0's left edge (normally `<= 0`).
/// The struct is a plain value: every change goes through a transition that
/// returns a new `Viewport`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub offset: f64,
    pub candle_width: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(offset: f64, candle_width: f64) -> Self {
        Self {
            offset,
            candle_width,
        }
    }

    #[must_use]
    pub fn with_offset(self, offset: f64) -> Self {
        Self { offset, ..self }
    }

    #[must_use]
    pub fn with_candle_width(self, candle_width: f64) -> Self {
        Self {
            candle_width,
            ..self
        }
    }
}

/// Pixel distance between consecutive bar starts.
#[must_use]
pub fn stride(candle_width: f64, spacing_ratio: f64) -> f64 {
    candle_width + candle_width * spacing_ratio
}

/// Layout facts the transform math depends on besides the viewport itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportGeometry {
    pub chart_width: f64,
    pub y_axis_width: f64,
    pub bar_count: usize,
    pub spacing_ratio: f64,
    pub min_candle_width: f64,
    pub max_candle_width: f64,
}

impl ViewportGeometry {
    #[must_use]
    pub fn stride(self, candle_width: f64) -> f64 {
        stride(candle_width, self.spacing_ratio)
    }

    /// Center x of bar `index`.
    #[must_use]
    pub fn pixel_x(self, index: usize, viewport: Viewport) -> f64 {
        self.bar_left(index, viewport) + viewport.candle_width / 2.0
    }

    /// Left edge x of bar `index`.
    #[must_use]
    pub fn bar_left(self, index: usize, viewport: Viewport) -> f64 {
        index as f64 * self.stride(viewport.candle_width) + viewport.offset
    }

    /// Offset that puts the newest bar flush against the y-axis.
    #[must_use]
    pub fn min_offset(self, candle_width: f64) -> f64 {
        self.chart_width - self.y_axis_width - self.bar_count as f64 * self.stride(candle_width)
    }

    /// Clamps an offset into `[min_offset, 0]`.
    ///
    /// When every bar fits inside the plot the offset pins to `min_offset`
    /// (bars stay right-aligned against the axis). That is the only case
    /// where the clamped offset is positive; clamping to 0 there would leave
    /// the bars left-aligned.
    #[must_use]
    pub fn clamp_offset(self, offset: f64, candle_width: f64) -> f64 {
        let min_offset = self.min_offset(candle_width);
        if min_offset > 0.0 {
            return min_offset;
        }
        clamp_f64(offset, min_offset, 0.0)
    }

    #[must_use]
    pub fn clamp_candle_width(self, width: f64) -> f64 {
        clamp_f64(width, self.min_candle_width, self.max_candle_width)
    }

    /// Index window intersecting the chart, with one bar of overscan on each
    /// side. `None` for an empty bar array.
    #[must_use]
    pub fn visible_range(self, viewport: Viewport) -> Option<VisibleRange> {
        if self.bar_count == 0 {
            return None;
        }
        let stride = self.stride(viewport.candle_width);
        if !stride.is_finite() || stride <= 0.0 {
            return Some(VisibleRange::new(0, self.bar_count - 1));
        }

        let last = (self.bar_count - 1) as f64;
        let raw_start = ((-viewport.offset - viewport.candle_width) / stride).floor() - 1.0;
        let raw_end = ((self.chart_width - viewport.offset) / stride).ceil() + 1.0;
        let start = clamp_f64(raw_start, 0.0, last) as usize;
        let end = clamp_f64(raw_end, 0.0, last) as usize;
        Some(VisibleRange::new(start, end.max(start)))
    }

    /// Nearest bar to pixel `x`, always clamped into the bar array.
    #[must_use]
    pub fn nearest_index(self, x: f64, viewport: Viewport) -> Option<usize> {
        if self.bar_count == 0 {
            return None;
        }
        let stride = self.stride(viewport.candle_width);
        let raw = ((x - viewport.offset - viewport.candle_width / 2.0) / stride).round();
        let raw = if raw.is_finite() { raw } else { 0.0 };
        Some(clamp_f64(raw, 0.0, (self.bar_count - 1) as f64) as usize)
    }

    /// Viewport after a drag that moved the finger `translation_x` pixels
    /// since `start_offset` was captured.
    #[must_use]
    pub fn panned(self, viewport: Viewport, start_offset: f64, translation_x: f64) -> Viewport {
        viewport.with_offset(self.clamp_offset(start_offset + translation_x, viewport.candle_width))
    }

    /// Viewport after a pinch scaled the starting candle width by `scale`.
    ///
    /// The bar under `focal_x` at gesture start keeps its center x. When
    /// `pinned_right` is set the newest bar stays against the y-axis instead.
    #[must_use]
    pub fn pinched(self, start: Viewport, focal_x: f64, scale: f64, pinned_right: bool) -> Viewport {
        let new_width = self.clamp_candle_width(start.candle_width * scale);
        if pinned_right {
            return Viewport::new(self.min_offset(new_width), new_width);
        }

        let Some(anchor) = self.nearest_index(focal_x, start) else {
            return start.with_candle_width(new_width);
        };
        self.pinched_around(anchor as f64, self.pixel_x(anchor, start), new_width)
    }

    /// Viewport of width `new_width` that puts the center of bar
    /// `anchor_index` at `anchor_x`, clamped.
    #[must_use]
    pub fn pinched_around(self, anchor_index: f64, anchor_x: f64, new_width: f64) -> Viewport {
        let proposed = anchor_x - anchor_index * self.stride(new_width) - new_width / 2.0;
        Viewport::new(self.clamp_offset(proposed, new_width), new_width)
    }
}

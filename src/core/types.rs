use serde::{Deserialize, Serialize};

/// Pixel size of the chart drawing area (excluding the x-axis label strip).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartDimensions {
    pub width: f64,
    pub height: f64,
}

impl ChartDimensions {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Inclusive index window of bars that intersect the viewport (with overscan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub start_index: usize,
    pub end_index: usize,
}

impl VisibleRange {
    #[must_use]
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    #[must_use]
    pub fn bar_count(self) -> usize {
        self.end_index - self.start_index + 1
    }

    #[must_use]
    pub fn indices(self) -> std::ops::RangeInclusive<usize> {
        self.start_index..=self.end_index
    }
}

/// Vertical price window of the candle region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl PriceBounds {
    /// Bounds used whenever there is nothing to measure.
    pub const DEFAULT: Self = Self { min: 0.0, max: 1.0 };

    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn range(self) -> f64 {
        self.max - self.min
    }
}

impl Default for PriceBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

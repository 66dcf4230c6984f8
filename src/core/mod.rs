pub mod bounds;
pub mod candlestick;
pub mod indicator;
pub mod primitives;
pub mod types;
pub mod viewport;

pub use bounds::{
    PriceProjection, VolumeScale, compute_price_bounds, max_volume_in_range, nice_interval,
    y_axis_label_width, y_axis_width,
};
pub use candlestick::Bar;
pub use indicator::{
    Indicator, IndicatorDrawParams, IndicatorEntry, IndicatorKey, IndicatorSelector, IndicatorSet,
};
pub use types::{ChartDimensions, PriceBounds, VisibleRange};
pub use viewport::{Viewport, ViewportGeometry, stride};

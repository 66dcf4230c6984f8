//! candle-chart: gesture-driven OHLCV candlestick renderer.
//!
//! The engine turns a bar array plus pan, pinch and long-press input into
//! three immutable layer pictures (base, indicators, crosshair) that a
//! backend replays onto its surface.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{
    CandleResolution, ChartConfig, ChartEngine, ChartEngineConfig, ColorMode, CurrencyFormat,
    SetCandlesOptions,
};
pub use error::{ChartError, ChartResult};

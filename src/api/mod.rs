mod base_picture_builder;
mod chart_model;
mod chart_presentation;
mod chart_runtime;
mod color_mode;
mod crosshair_picture_builder;
mod data_controller;
mod engine;
mod engine_config;
mod engine_core;
mod engine_init;
mod indicator_controller;
mod indicator_picture_builder;
mod interaction_controller;
mod label_formatter_controller;
mod label_text_formatter;
mod layout_helpers;
mod price_scale_coordinator;
mod render_coordinator;
mod visible_window_access;

pub use color_mode::{ChartPalette, ColorMode};
pub use data_controller::SetCandlesOptions;
pub use engine::ChartEngine;
pub use engine_config::{
    AnimationConfig, CandleConfig, ChartConfig, ChartEngineConfig, ChartLayoutConfig,
    CrosshairConfig, GridConfig, IndicatorStyleConfig, PriceBubbleConfig, VolumeConfig,
};
pub use label_text_formatter::{
    CandleResolution, CurrencyFormat, PriceLabelFormatterFn, TimeFormatter, TimeLabelFormatterFn,
    format_currency,
};

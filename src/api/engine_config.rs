use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::ChartDimensions;
use crate::error::{ChartError, ChartResult};
use crate::interaction::SpringConfig;
use crate::render::Color;

use super::{CandleResolution, ColorMode, CurrencyFormat};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub spring: SpringConfig,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            spring: SpringConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandleConfig {
    pub initial_width: f64,
    pub min_width: f64,
    pub max_width: f64,
    /// Gap between bars as a fraction of the candle width.
    pub spacing_ratio: f64,
    pub max_border_radius: f64,
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub bullish_color: Color,
    pub bearish_color: Color,
}

impl Default for CandleConfig {
    fn default() -> Self {
        Self {
            initial_width: 9.0,
            min_width: 2.0,
            max_width: 20.0,
            spacing_ratio: 3.4 / 12.0,
            max_border_radius: 6.0,
            stroke_color: Color::WHITE.with_alpha(0.1),
            stroke_width: 1.0,
            bullish_color: Color::from_rgb8(0x1F, 0xC2, 0x4A),
            bearish_color: Color::from_rgb8(0xFF, 0x58, 0x4D),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayoutConfig {
    pub background_color: Color,
    pub candles_padding_ratio_vertical: f64,
    /// Per-millisecond velocity multiplier for fling momentum.
    pub pan_gesture_deceleration: f64,
    /// Release speed (px/s) above which a pan turns into a fling.
    pub fling_velocity_threshold: f64,
    pub decay_rest_velocity: f64,
    /// Per-recompute shrink factor of the displayed volume maximum.
    pub volume_decay_factor: f64,
    pub label_font_size_px: f64,
    pub x_axis_gap: f64,
    pub x_axis_height: f64,
    pub x_axis_inset: f64,
    pub y_axis_padding_left: f64,
    pub y_axis_padding_right: f64,
    /// Distance from the oldest bar (px) at which older history is requested.
    pub history_load_threshold_px: f64,
    pub max_candles_to_load: usize,
}

impl Default for ChartLayoutConfig {
    fn default() -> Self {
        Self {
            background_color: Color::from_rgb8(0x14, 0x16, 0x19),
            candles_padding_ratio_vertical: 0.1,
            pan_gesture_deceleration: 0.9975,
            fling_velocity_threshold: 100.0,
            decay_rest_velocity: 1.0,
            volume_decay_factor: 0.97,
            label_font_size_px: 11.0,
            x_axis_gap: 10.0,
            x_axis_height: 13.0,
            x_axis_inset: 16.0,
            y_axis_padding_left: 12.0,
            y_axis_padding_right: 8.0,
            history_load_threshold_px: 1_600.0,
            max_candles_to_load: 5_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosshairConfig {
    pub dot_color: Color,
    pub line_color: Color,
    pub dot_size: f64,
    pub dot_stroke_width: f64,
    pub stroke_width: f64,
    /// Vertical shift from the touch point so the finger does not cover it.
    pub y_offset: f64,
}

impl Default for CrosshairConfig {
    fn default() -> Self {
        Self {
            dot_color: Color::WHITE,
            line_color: Color::WHITE,
            dot_size: 3.0,
            dot_stroke_width: 5.0 / 3.0,
            stroke_width: 2.0,
            y_offset: -68.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub color: Color,
    pub dotted: bool,
    pub stroke_width: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            color: Color::from_rgb8(0x22, 0x25, 0x28),
            dotted: true,
            stroke_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorStyleConfig {
    pub stroke_width: f64,
}

impl Default for IndicatorStyleConfig {
    fn default() -> Self {
        Self {
            stroke_width: 4.0 / 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceBubbleConfig {
    pub height: f64,
    /// Hides the crosshair price bubble. The current-price bubble is always drawn.
    pub hidden: bool,
    pub padding_horizontal: f64,
}

impl Default for PriceBubbleConfig {
    fn default() -> Self {
        Self {
            height: 18.0,
            hidden: true,
            padding_horizontal: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    pub color: Color,
    /// Fraction of the chart height reserved for volume bars.
    pub height_factor: f64,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            color: Color::from_rgb8(0x2B, 0x2D, 0x2F),
            height_factor: 0.175,
        }
    }
}

/// Fully defaulted renderer tuning. Partial JSON documents deserialize onto
/// the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub animation: AnimationConfig,
    pub candles: CandleConfig,
    pub chart: ChartLayoutConfig,
    pub crosshair: CrosshairConfig,
    pub grid: GridConfig,
    pub indicators: IndicatorStyleConfig,
    pub price_bubble: PriceBubbleConfig,
    pub volume: VolumeConfig,
}

impl ChartConfig {
    /// Deep-merges `overrides` onto `self`: objects merge key by key, every
    /// other value replaces the existing one. `null` leaves the value as is.
    pub fn with_overrides(self, overrides: Value) -> ChartResult<Self> {
        let mut merged = serde_json::to_value(self)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to serialize config: {e}")))?;
        deep_merge(&mut merged, overrides);
        let config: Self = serde_json::from_value(merged)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to apply overrides: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ChartResult<()> {
        let candles = &self.candles;
        if !(candles.min_width.is_finite() && candles.min_width > 0.0) {
            return Err(invalid("candles.min_width must be finite and > 0"));
        }
        if !(candles.max_width.is_finite() && candles.max_width >= candles.min_width) {
            return Err(invalid("candles.max_width must be >= candles.min_width"));
        }
        if !(candles.min_width..=candles.max_width).contains(&candles.initial_width) {
            return Err(invalid("candles.initial_width must be within [min_width, max_width]"));
        }
        ensure_non_negative("candles.spacing_ratio", candles.spacing_ratio)?;
        ensure_non_negative("candles.max_border_radius", candles.max_border_radius)?;
        ensure_non_negative("candles.stroke_width", candles.stroke_width)?;

        let chart = &self.chart;
        ensure_non_negative(
            "chart.candles_padding_ratio_vertical",
            chart.candles_padding_ratio_vertical,
        )?;
        if !(chart.pan_gesture_deceleration > 0.0 && chart.pan_gesture_deceleration < 1.0) {
            return Err(invalid("chart.pan_gesture_deceleration must be in (0, 1)"));
        }
        if !(chart.volume_decay_factor > 0.0 && chart.volume_decay_factor <= 1.0) {
            return Err(invalid("chart.volume_decay_factor must be in (0, 1]"));
        }
        if !(chart.label_font_size_px.is_finite() && chart.label_font_size_px > 0.0) {
            return Err(invalid("chart.label_font_size_px must be finite and > 0"));
        }
        for (name, value) in [
            ("chart.fling_velocity_threshold", chart.fling_velocity_threshold),
            ("chart.decay_rest_velocity", chart.decay_rest_velocity),
            ("chart.x_axis_gap", chart.x_axis_gap),
            ("chart.x_axis_height", chart.x_axis_height),
            ("chart.x_axis_inset", chart.x_axis_inset),
            ("chart.y_axis_padding_left", chart.y_axis_padding_left),
            ("chart.y_axis_padding_right", chart.y_axis_padding_right),
            ("chart.history_load_threshold_px", chart.history_load_threshold_px),
            ("crosshair.dot_size", self.crosshair.dot_size),
            ("crosshair.dot_stroke_width", self.crosshair.dot_stroke_width),
            ("price_bubble.height", self.price_bubble.height),
            ("price_bubble.padding_horizontal", self.price_bubble.padding_horizontal),
        ] {
            ensure_non_negative(name, value)?;
        }
        for (name, value) in [
            ("crosshair.stroke_width", self.crosshair.stroke_width),
            ("grid.stroke_width", self.grid.stroke_width),
            ("indicators.stroke_width", self.indicators.stroke_width),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(&format!("{name} must be finite and > 0")));
            }
        }
        if !self.crosshair.y_offset.is_finite() {
            return Err(invalid("crosshair.y_offset must be finite"));
        }
        if !(0.0..1.0).contains(&self.volume.height_factor) {
            return Err(invalid("volume.height_factor must be in [0, 1)"));
        }

        let spring = self.animation.spring;
        for (name, value) in [
            ("animation.spring.mass", spring.mass),
            ("animation.spring.stiffness", spring.stiffness),
            ("animation.spring.damping", spring.damping),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(&format!("{name} must be finite and > 0")));
            }
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ChartError {
    ChartError::InvalidConfig(message.to_owned())
}

fn ensure_non_negative(name: &str, value: f64) -> ChartResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(&format!("{name} must be finite and >= 0")))
    }
}

fn deep_merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (slot, value) => *slot = value,
    }
}

/// Public engine bootstrap configuration.
///
/// This type is serializable so hosts can persist/load chart setup without
/// inventing their own ad-hoc format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEngineConfig {
    pub dimensions: ChartDimensions,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub currency: CurrencyFormat,
    #[serde(default = "default_resolution")]
    pub resolution: CandleResolution,
    #[serde(default = "default_color_mode")]
    pub color_mode: ColorMode,
}

impl ChartEngineConfig {
    #[must_use]
    pub fn new(dimensions: ChartDimensions) -> Self {
        Self {
            dimensions,
            chart: ChartConfig::default(),
            currency: CurrencyFormat::default(),
            resolution: default_resolution(),
            color_mode: default_color_mode(),
        }
    }

    #[must_use]
    pub fn with_chart_config(mut self, chart: ChartConfig) -> Self {
        self.chart = chart;
        self
    }

    #[must_use]
    pub fn with_currency(mut self, currency: CurrencyFormat) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: CandleResolution) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}

fn default_resolution() -> CandleResolution {
    CandleResolution::OneHour
}

fn default_color_mode() -> ColorMode {
    ColorMode::Dark
}

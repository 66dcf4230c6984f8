use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ChartResult;
use crate::render::{Color, Renderer};

use super::{ChartConfig, ChartEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    Light,
    Dark,
}

impl ColorMode {
    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

/// Theme colors not carried by [`ChartConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPalette {
    /// Axis and grid price labels.
    pub label_quinary: Color,
    /// Crosshair bubble text.
    pub label_secondary: Color,
    /// Crosshair bubble fill.
    pub fill: Color,
}

impl ChartPalette {
    #[must_use]
    pub fn for_mode(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Dark => Self {
                label_quinary: Color::from_rgb8(0xF5, 0xF8, 0xFF).with_alpha(0.28),
                label_secondary: Color::from_rgb8(0xF5, 0xF8, 0xFF).with_alpha(0.6),
                fill: Color::from_rgb8(0xF5, 0xF8, 0xFF).with_alpha(0.06),
            },
            ColorMode::Light => Self {
                label_quinary: Color::from_rgb8(0x1B, 0x1D, 0x1F).with_alpha(0.2),
                label_secondary: Color::from_rgb8(0x1B, 0x1D, 0x1F).with_alpha(0.6),
                fill: Color::from_rgb8(0x1B, 0x1D, 0x1F).with_alpha(0.06),
            },
        }
    }
}

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        self.core.presentation.color_mode
    }

    #[must_use]
    pub fn palette(&self) -> ChartPalette {
        self.core.presentation.palette
    }

    /// Switches theme.
    ///
    /// Crosshair, grid and volume colors are reset to the values in
    /// `color_overrides` or else to their defaults, so colors picked for the
    /// previous theme do not leak into the new one.
    pub fn set_color_mode(
        &mut self,
        mode: ColorMode,
        background: Option<Color>,
        color_overrides: Option<Value>,
    ) -> ChartResult<()> {
        let themed = match color_overrides {
            Some(overrides) => ChartConfig::default().with_overrides(overrides)?,
            None => ChartConfig::default(),
        };
        if let Some(background) = background {
            background.validate()?;
        }

        let presentation = &mut self.core.presentation;
        presentation.color_mode = mode;
        presentation.palette = ChartPalette::for_mode(mode);
        if let Some(background) = background {
            presentation.config.chart.background_color = background;
        }
        let config = &mut presentation.config;
        config.crosshair.dot_color = themed.crosshair.dot_color;
        config.crosshair.line_color = themed.crosshair.line_color;
        config.grid.color = themed.grid.color;
        config.volume.color = themed.volume.color;
        debug!(?mode, "set color mode");

        self.rebuild_chart(false, false);
        self.rebuild_active_crosshair();
        Ok(())
    }
}

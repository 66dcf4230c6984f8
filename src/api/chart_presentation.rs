use std::sync::Arc;

use crate::core::ChartDimensions;
use crate::render::{Picture, PictureLayer, PictureSlot};

use super::label_text_formatter::{PriceLabelFormatterFn, TimeLabelFormatterFn};
use super::{ChartConfig, ChartPalette, ColorMode, CurrencyFormat, TimeFormatter};

/// One slot per composited layer, all sharing the same blank picture.
pub(super) struct LayerPictures {
    pub(super) base: PictureSlot,
    pub(super) indicator: PictureSlot,
    pub(super) crosshair: PictureSlot,
}

impl LayerPictures {
    #[must_use]
    pub(super) fn new(dimensions: ChartDimensions) -> Self {
        let blank = Arc::new(Picture::blank(dimensions.width, dimensions.height));
        Self {
            base: PictureSlot::new(PictureLayer::Base, Arc::clone(&blank)),
            indicator: PictureSlot::new(PictureLayer::Indicator, Arc::clone(&blank)),
            crosshair: PictureSlot::new(PictureLayer::Crosshair, blank),
        }
    }

    #[must_use]
    pub(super) fn slot(&self, layer: PictureLayer) -> &PictureSlot {
        match layer {
            PictureLayer::Base => &self.base,
            PictureLayer::Indicator => &self.indicator,
            PictureLayer::Crosshair => &self.crosshair,
        }
    }

    pub(super) fn reset_all(&mut self) {
        self.base.reset_to_blank();
        self.indicator.reset_to_blank();
        self.crosshair.reset_to_blank();
    }
}

/// Theme, tuning and label formatting grouped apart from the chart model.
pub(super) struct ChartPresentationState {
    pub(super) dimensions: ChartDimensions,
    pub(super) config: ChartConfig,
    pub(super) color_mode: ColorMode,
    pub(super) palette: ChartPalette,
    pub(super) currency: CurrencyFormat,
    pub(super) price_label_formatter: PriceLabelFormatterFn,
    pub(super) time_formatter: TimeFormatter,
    pub(super) time_label_formatter: Option<TimeLabelFormatterFn>,
    pub(super) pictures: LayerPictures,
}

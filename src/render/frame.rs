use std::sync::Arc;

use crate::core::ChartDimensions;
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, Picture, PictureLayer};

/// The three layer handles a host composites for one displayed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeFrame {
    pub dimensions: ChartDimensions,
    pub background: Color,
    pub base: Arc<Picture>,
    pub indicator: Arc<Picture>,
    pub crosshair: Arc<Picture>,
}

impl CompositeFrame {
    #[must_use]
    pub fn layer(&self, layer: PictureLayer) -> &Arc<Picture> {
        match layer {
            PictureLayer::Base => &self.base,
            PictureLayer::Indicator => &self.indicator,
            PictureLayer::Crosshair => &self.crosshair,
        }
    }

    /// Pictures in composite order.
    pub fn layers(&self) -> impl Iterator<Item = (PictureLayer, &Arc<Picture>)> {
        PictureLayer::COMPOSITE_ORDER
            .into_iter()
            .map(|layer| (layer, self.layer(layer)))
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.dimensions.is_valid() {
            return Err(ChartError::InvalidDimensions {
                width: self.dimensions.width,
                height: self.dimensions.height,
            });
        }
        self.background.validate()?;
        for (_, picture) in self.layers() {
            picture.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn command_count(&self) -> usize {
        self.layers()
            .map(|(_, picture)| picture.commands().len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.command_count() == 0
    }
}

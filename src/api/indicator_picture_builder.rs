use tracing::trace;

use crate::core::IndicatorDrawParams;
use crate::render::{ClipRect, PictureRecorder, Renderer};

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Re-records the overlay layer, or swaps in the blank picture when no
    /// overlay is active.
    pub(super) fn build_indicator_picture(&mut self) {
        let geometry = self.geometry();
        let viewport = self.viewport();
        let range = geometry.visible_range(viewport);
        let indicators = &self.core.model.indicators;
        let Some(range) = range.filter(|_| indicators.active_count() > 0) else {
            self.core.presentation.pictures.indicator.reset_to_blank();
            return;
        };

        let presentation = &self.core.presentation;
        let width = presentation.dimensions.width;
        let height = presentation.dimensions.height;
        let mut recorder = PictureRecorder::begin(width, height);
        recorder.clip_rect(ClipRect::new(0.0, 0.0, width, height));
        indicators.draw_all(
            &mut recorder,
            &IndicatorDrawParams {
                range,
                geometry,
                viewport,
                projection: self.projection(),
                stroke_width: presentation.config.indicators.stroke_width,
            },
        );

        let picture = recorder.finish();
        trace!(
            paths = picture.path_count(),
            active = indicators.active_count(),
            "rebuilt indicator picture"
        );
        self.core.presentation.pictures.indicator.replace(picture);
    }
}

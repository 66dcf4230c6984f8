use tracing::trace;

use crate::core::{
    PriceBounds, PriceProjection, VisibleRange, VolumeScale, compute_price_bounds,
    max_volume_in_range, y_axis_width,
};
use crate::interaction::AnimatedValue;
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Target bounds for the current visible range, including active
    /// overlays. Refreshes the y-axis width as a side effect.
    pub(super) fn refresh_target_bounds(&mut self) -> (PriceBounds, Option<VisibleRange>) {
        let range = self.visible_range();
        let model = &self.core.model;
        let config = &self.core.presentation.config;
        let bounds = compute_price_bounds(
            &model.bars,
            range,
            model.indicators.min_max_for_range(range),
            config.chart.candles_padding_ratio_vertical,
        );
        self.core.layout.y_axis_width = y_axis_width(
            bounds,
            self.core.presentation.currency.decimals,
            config.chart.y_axis_padding_left,
            config.chart.y_axis_padding_right,
        );
        (bounds, range)
    }

    /// Price to y mapping for the bounds currently on screen.
    pub(super) fn projection(&self) -> PriceProjection {
        let presentation = &self.core.presentation;
        PriceProjection::new(
            self.core.layout.view.bounds,
            presentation.dimensions.height,
            presentation.config.volume.height_factor,
        )
    }

    /// Price under chart-local `y`, using the displayed bounds.
    #[must_use]
    pub fn price_at_y(&self, y: f64) -> f64 {
        self.projection().y_to_price(y)
    }

    /// Moves price bounds and the volume maximum toward the values of the
    /// current visible range. Nothing happens unless the range changed or
    /// `force` is set.
    pub(super) fn handle_animations(&mut self, animate: bool, force: bool) {
        let previous_range = self.core.layout.last_visible_range;
        let (bounds, range) = self.refresh_target_bounds();
        self.core.layout.last_visible_range = range;
        if !force && range == previous_range {
            return;
        }

        let config = &self.core.presentation.config;
        let raw_volume = max_volume_in_range(&self.core.model.bars, range);
        let previous_scale = self.core.layout.volume_scale;
        let next_scale = previous_scale
            .unwrap_or(VolumeScale::RESET)
            .next(raw_volume, config.chart.volume_decay_factor);
        let volume_changed = previous_scale != Some(next_scale);
        self.core.layout.volume_scale = Some(next_scale);
        let volume_target = next_scale.max_displayed_volume;
        let spring = config.animation.spring;

        let animator = &mut self.core.runtime.animator;
        let view = &mut self.core.layout.view;
        if animate {
            let normalized = spring.normalized(&[
                (view.bounds.min - bounds.min).abs(),
                (view.bounds.max - bounds.max).abs(),
            ]);
            animator.spring(view, AnimatedValue::MinPrice, bounds.min, normalized);
            animator.spring(view, AnimatedValue::MaxPrice, bounds.max, normalized);
            if force || volume_changed {
                if previous_scale.is_none() {
                    animator.direct(view, AnimatedValue::MaxVolume, volume_target);
                } else {
                    animator.spring(view, AnimatedValue::MaxVolume, volume_target, spring);
                }
            }
        } else {
            animator.direct(view, AnimatedValue::MinPrice, bounds.min);
            animator.direct(view, AnimatedValue::MaxPrice, bounds.max);
            animator.direct(view, AnimatedValue::MaxVolume, volume_target);
        }
        trace!(
            animate,
            force,
            min = bounds.min,
            max = bounds.max,
            max_volume = volume_target,
            "updated price bounds"
        );
    }

    /// Forgets range and volume history so the next rebuild starts fresh, and
    /// drops springs still aimed at the old bounds.
    pub(super) fn reset_bounds_tracking(&mut self) {
        let layout = &mut self.core.layout;
        layout.last_visible_range = None;
        layout.volume_scale = None;
        let animator = &mut self.core.runtime.animator;
        for key in [
            AnimatedValue::MinPrice,
            AnimatedValue::MaxPrice,
            AnimatedValue::MaxVolume,
        ] {
            animator.cancel(key);
        }
    }
}

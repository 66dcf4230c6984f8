use tracing::trace;

use crate::core::y_axis_label_width;
use crate::interaction::{ChartEvent, CrosshairSnap, HapticFeedback};
use crate::render::{
    BlendMode, CirclePrimitive, Color, LineCap, LinePrimitive, LineStrokeStyle, PictureRecorder,
    Renderer,
};

use super::ChartEngine;
use super::layout_helpers::PriceBubble;

const GUIDE_DASH: LineStrokeStyle = LineStrokeStyle::Dashed { on: 0.0, off: 5.0 };
const GUIDE_ALPHA: f64 = 0.6;
const LIGHT_HALO_ALPHA: f64 = 0.08;
const BUBBLE_STROKE_OPACITY: f64 = 0.12;

impl<R: Renderer> ChartEngine<R> {
    /// Re-records the crosshair layer for a touch at (`x`, `y`).
    ///
    /// Inactive (or with no bars) the layer drops to the blank picture and the
    /// active candle is cleared.
    pub(super) fn build_crosshair_picture(&mut self, x: f64, y: f64, active: bool) {
        let snapped = if active { self.nearest_bar(x) } else { None };
        let Some((index, snapped_x)) = snapped else {
            self.clear_crosshair();
            return;
        };

        let presentation = &self.core.presentation;
        let config = &presentation.config;
        let crosshair = &config.crosshair;
        let width = presentation.dimensions.width;
        let height = presentation.dimensions.height;
        let y = y + crosshair.y_offset;
        let inset = crosshair.stroke_width / 2.0;
        let guide_color = crosshair.line_color.with_alpha(GUIDE_ALPHA);

        let mut recorder = PictureRecorder::begin(width, height);
        for (x1, y1, x2, y2) in [
            (0.0, y, width, y),
            (snapped_x, inset, snapped_x, height - inset),
        ] {
            recorder.line(
                LinePrimitive::new(x1, y1, x2, y2, crosshair.stroke_width, guide_color)
                    .with_stroke_style(GUIDE_DASH)
                    .with_cap(LineCap::Round),
            );
        }

        if presentation.color_mode.is_dark() {
            recorder.circle(
                CirclePrimitive::new(
                    snapped_x,
                    y,
                    crosshair.dot_size + crosshair.dot_stroke_width,
                    Color::BLACK,
                )
                .with_blend_mode(BlendMode::Overlay),
            );
            recorder.circle(CirclePrimitive::new(
                snapped_x,
                y,
                crosshair.dot_size,
                crosshair.dot_color,
            ));
        } else {
            recorder.circle(CirclePrimitive::new(
                snapped_x,
                y,
                crosshair.dot_size + crosshair.dot_stroke_width / 0.2,
                crosshair.dot_color.with_alpha(LIGHT_HALO_ALPHA),
            ));
            recorder.circle(CirclePrimitive::new(
                snapped_x,
                y,
                crosshair.dot_size,
                Color::WHITE,
            ));
        }

        let price = self.price_at_y(y);
        if !config.price_bubble.hidden {
            let decimals = usize::from(presentation.currency.decimals);
            let fixed_chars = format!("{price:.decimals$}").len();
            self.record_price_bubble(
                &mut recorder,
                PriceBubble {
                    label: self.format_price(price),
                    left_x: self.y_axis_label_x(),
                    center_y: y,
                    // Sized from the digit count so the bubble does not
                    // jitter while the finger moves.
                    label_width: y_axis_label_width(fixed_chars) - 2.0,
                    color: presentation.palette.fill,
                    text_color: presentation.palette.label_secondary,
                    stroke_opacity: BUBBLE_STROKE_OPACITY,
                },
            );
        }

        let picture = recorder.finish();
        trace!(index, x = snapped_x, y, "rebuilt crosshair picture");
        self.core.presentation.pictures.crosshair.replace(picture);
        self.core
            .runtime
            .interaction
            .set_crosshair_snap(Some(CrosshairSnap {
                index,
                x: snapped_x,
                y,
                price,
            }));
        self.core.runtime.gesture_active = true;

        let bar = self.core.model.bars[index];
        let previous = self.core.runtime.active_candle;
        if previous.map(|candle| candle.timestamp) != Some(bar.timestamp) {
            self.core.runtime.active_candle = Some(bar);
            self.emit(ChartEvent::ActiveCandleChanged(Some(bar)));
            if previous.is_some() {
                self.emit(ChartEvent::Haptic(HapticFeedback::Selection));
            }
        }
    }

    fn clear_crosshair(&mut self) {
        let runtime = &mut self.core.runtime;
        runtime.gesture_active = false;
        runtime.interaction.set_crosshair_snap(None);
        self.core.presentation.pictures.crosshair.reset_to_blank();
        if self.core.runtime.active_candle.take().is_some() {
            self.emit(ChartEvent::ActiveCandleChanged(None));
        }
    }

    /// Redraws the crosshair at its last touch position while a candle is
    /// selected.
    pub(super) fn rebuild_active_crosshair(&mut self) {
        if self.core.runtime.active_candle.is_none() {
            return;
        }
        let crosshair = self.core.runtime.interaction.crosshair();
        self.build_crosshair_picture(crosshair.x, crosshair.y, true);
    }
}

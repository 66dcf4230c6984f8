use crate::render::{
    Color, PictureRecorder, RectPrimitive, Renderer, TextHAlign, TextPrimitive,
};

use super::ChartEngine;

const LABEL_LINE_HEIGHT_FACTOR: f64 = 1.2;
const BUBBLE_FILL_ALPHA: f64 = 0.24;
const BUBBLE_SHADOW_ALPHA: f64 = 0.48;
const BUBBLE_SHADOW_OFFSET_Y: f64 = 4.0;

pub(super) fn estimate_label_text_width_px(text: &str, font_size_px: f64) -> f64 {
    // Keep this estimate deterministic and backend-independent.
    let units = text.chars().fold(0.0, |acc, ch| {
        acc + match ch {
            '0'..='9' => 0.62,
            '.' | ',' => 0.34,
            '-' | '+' | '%' => 0.42,
            ' ' => 0.33,
            _ => 0.58,
        }
    });
    (units * font_size_px).max(font_size_px)
}

pub(super) fn label_line_height_px(font_size_px: f64) -> f64 {
    font_size_px * LABEL_LINE_HEIGHT_FACTOR
}

/// Top of the price label for horizontal grid line `index`. The first line
/// hugs the top edge, so its label hangs below it.
pub(super) fn grid_label_top(line_y: f64, index: usize, line_height: f64) -> f64 {
    if index == 0 {
        line_y + 6.0
    } else {
        line_y - line_height / 2.0 - 0.5
    }
}

/// Rounded price tag drawn on the y-axis.
pub(super) struct PriceBubble {
    pub(super) label: String,
    pub(super) left_x: f64,
    pub(super) center_y: f64,
    pub(super) label_width: f64,
    pub(super) color: Color,
    pub(super) text_color: Color,
    pub(super) stroke_opacity: f64,
}

impl<R: Renderer> ChartEngine<R> {
    /// Left edge of y-axis label text.
    pub(super) fn y_axis_label_x(&self) -> f64 {
        self.core.presentation.dimensions.width - self.core.layout.y_axis_width
            + self.core.presentation.config.chart.y_axis_padding_left
    }

    pub(super) fn record_price_bubble(&self, recorder: &mut PictureRecorder, bubble: PriceBubble) {
        let presentation = &self.core.presentation;
        let config = &presentation.config;
        let height = config.price_bubble.height;
        let padding = config.price_bubble.padding_horizontal;
        let radius = height / 2.0;
        let x = bubble.left_x - padding;
        let y = bubble.center_y - height / 2.0;
        let width = bubble.label_width + padding * 2.0;

        let shadow = config.chart.background_color.with_alpha(BUBBLE_SHADOW_ALPHA);
        for dy in [BUBBLE_SHADOW_OFFSET_Y, -BUBBLE_SHADOW_OFFSET_Y] {
            recorder.rect(
                RectPrimitive::new(x, y + dy, width, height, shadow).with_corner_radius(radius),
            );
        }
        recorder.rect(
            RectPrimitive::new(x, y, width, height, bubble.color.with_alpha(BUBBLE_FILL_ALPHA))
                .with_corner_radius(radius),
        );

        let stroke_width = config.candles.stroke_width;
        if presentation.color_mode.is_dark() && stroke_width > 0.0 {
            let inset = stroke_width / 2.0;
            recorder.rect(
                RectPrimitive::new(
                    x + inset,
                    y + inset,
                    (width - stroke_width).max(0.0),
                    (height - stroke_width).max(0.0),
                    Color::TRANSPARENT,
                )
                .with_border(stroke_width, bubble.color.with_alpha(bubble.stroke_opacity))
                .with_corner_radius((radius - inset).max(0.0)),
            );
        }

        let font = config.chart.label_font_size_px;
        let text_top = y + (height - label_line_height_px(font)) / 2.0;
        recorder.text(TextPrimitive::new(
            bubble.label,
            bubble.left_x,
            text_top,
            font,
            bubble.text_color,
            TextHAlign::Left,
        ));
    }
}

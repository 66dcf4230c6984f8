use tracing::trace;

use crate::core::{Bar, PriceProjection, Viewport, ViewportGeometry, VisibleRange, nice_interval};
use crate::render::{
    ClipRect, Color, LineCap, LinePrimitive, LineStrokeStyle, PictureRecorder, RectPrimitive,
    Renderer, TextHAlign, TextPrimitive,
};

use super::ChartEngine;
use super::layout_helpers::{
    PriceBubble, estimate_label_text_width_px, grid_label_top, label_line_height_px,
};

const HORIZONTAL_GRID_LINES: usize = 4;
const TARGET_VERTICAL_GRID_LINES: f64 = 6.0;
const VOLUME_HEIGHT_EXPONENT: f64 = 0.7;
const MIN_BODY_HEIGHT: f64 = 0.7;
const WICK_ALPHA: f64 = 0.7;
const WICK_WIDTH: f64 = 1.0;
const PRICE_LINE_ALPHA: f64 = 0.4;
const PRICE_LINE_BUFFER_RATIO: f64 = 0.02;
const PRICE_BUBBLE_STROKE_OPACITY: f64 = 0.15;
const DOTTED_GRID: LineStrokeStyle = LineStrokeStyle::Dashed { on: 1.9, off: 2.9 };

/// Per-rebuild snapshot shared by the base layer passes.
#[derive(Clone, Copy)]
struct BaseLayerContext {
    geometry: ViewportGeometry,
    viewport: Viewport,
    projection: PriceProjection,
    range: Option<VisibleRange>,
    width: f64,
    height: f64,
}

impl<R: Renderer> ChartEngine<R> {
    pub(super) fn build_base_picture(&mut self) {
        let presentation = &self.core.presentation;
        let chart = &presentation.config.chart;
        let width = presentation.dimensions.width;
        let height = presentation.dimensions.height;
        let geometry = self.geometry();
        let viewport = self.viewport();
        let context = BaseLayerContext {
            geometry,
            viewport,
            projection: self.projection(),
            range: geometry.visible_range(viewport),
            width,
            height,
        };

        let mut recorder =
            PictureRecorder::begin(width, height + chart.x_axis_gap * 2.0 + chart.x_axis_height);
        self.record_x_axis_labels(&mut recorder, &context);
        recorder.clip_rect(ClipRect::new(0.0, 0.0, width, height));
        self.record_grid(&mut recorder, &context);
        if let Some(range) = context.range {
            self.record_volume_bars(&mut recorder, &context, range);
        }
        let current_price_y = self.current_price_y(&context);
        if let Some(y) = current_price_y {
            self.record_current_price_line(&mut recorder, &context, y);
        }
        if let Some(range) = context.range {
            self.record_wicks(&mut recorder, &context, range);
            self.record_bodies(&mut recorder, &context, range);
        }
        if let Some(y) = current_price_y {
            self.record_current_price_bubble(&mut recorder, y);
        }

        let picture = recorder.finish();
        trace!(
            commands = picture.commands().len(),
            range = ?context.range,
            "rebuilt base picture"
        );
        self.core.presentation.pictures.base.replace(picture);
    }

    fn record_x_axis_labels(&self, recorder: &mut PictureRecorder, context: &BaseLayerContext) {
        let Some((left, right)) = self.x_axis_labels() else {
            return;
        };
        let presentation = &self.core.presentation;
        let chart = &presentation.config.chart;
        let y = context.height + chart.x_axis_gap;
        let color = presentation.palette.label_quinary;
        let font = chart.label_font_size_px;
        for (text, x, align) in [
            (left, chart.x_axis_inset, TextHAlign::Left),
            (right, context.width - chart.x_axis_inset, TextHAlign::Right),
        ] {
            if !text.is_empty() {
                recorder.text(TextPrimitive::new(text, x, y, font, color, align));
            }
        }
    }

    fn grid_line(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> LinePrimitive {
        let grid = &self.core.presentation.config.grid;
        let line = LinePrimitive::new(x1, y1, x2, y2, grid.stroke_width, grid.color);
        if grid.dotted {
            line.with_stroke_style(DOTTED_GRID)
        } else {
            line
        }
    }

    fn record_grid(&self, recorder: &mut PictureRecorder, context: &BaseLayerContext) {
        let BaseLayerContext {
            geometry,
            viewport,
            width,
            height,
            ..
        } = *context;

        if let Some(range) = context.range {
            let stride = geometry.stride(viewport.candle_width);
            let interval =
                nice_interval(width / stride / TARGET_VERTICAL_GRID_LINES).round().max(1.0) as usize;
            let first = range.start_index.div_ceil(interval) * interval;
            for index in (first..=range.end_index).step_by(interval) {
                let x = geometry.pixel_x(index, viewport);
                recorder.line(self.grid_line(x, 0.0, x, height));
            }
        }

        let presentation = &self.core.presentation;
        let font = presentation.config.chart.label_font_size_px;
        let line_height = label_line_height_px(font);
        let label_x = self.y_axis_label_x();
        let has_bars = !self.core.model.bars.is_empty();
        for index in 0..HORIZONTAL_GRID_LINES {
            let y = height * index as f64 / HORIZONTAL_GRID_LINES as f64 + 0.5;
            recorder.line(self.grid_line(0.0, y, width, y));
            if has_bars {
                recorder.text(TextPrimitive::new(
                    self.format_price(context.projection.y_to_price(y)),
                    label_x,
                    grid_label_top(y, index, line_height),
                    font,
                    presentation.palette.label_quinary,
                    TextHAlign::Left,
                ));
            }
        }
    }

    fn corner_radius(&self, candle_width: f64) -> f64 {
        self.core
            .presentation
            .config
            .candles
            .max_border_radius
            .min(candle_width / 3.0)
    }

    fn record_volume_bars(
        &self,
        recorder: &mut PictureRecorder,
        context: &BaseLayerContext,
        range: VisibleRange,
    ) {
        let max_volume = self.core.layout.view.max_volume;
        if !max_volume.is_finite() || max_volume <= 0.0 {
            return;
        }
        let config = &self.core.presentation.config;
        let volume_height = context.height * config.volume.height_factor;
        let candle_width = context.viewport.candle_width;
        let radius = self.corner_radius(candle_width);
        for (index, bar) in self.visible_bars(range) {
            let fraction = (bar.volume / max_volume).min(1.0);
            if fraction <= 0.0 {
                continue;
            }
            let bar_height = fraction.powf(VOLUME_HEIGHT_EXPONENT) * volume_height;
            recorder.rect(
                RectPrimitive::new(
                    context.geometry.bar_left(index, context.viewport),
                    context.height - bar_height,
                    candle_width,
                    bar_height,
                    config.volume.color,
                )
                .with_corner_radius(radius),
            );
        }
    }

    fn visible_bars(&self, range: VisibleRange) -> impl Iterator<Item = (usize, &Bar)> {
        self.core
            .model
            .bars
            .iter()
            .enumerate()
            .take(range.end_index + 1)
            .skip(range.start_index)
    }

    pub(super) fn candle_color(&self, bar: &Bar) -> Color {
        let candles = &self.core.presentation.config.candles;
        if bar.is_bullish() {
            candles.bullish_color
        } else {
            candles.bearish_color
        }
    }

    /// Y of the last close when it lies within the displayed price window
    /// (volume strip included) plus a small buffer.
    fn current_price_y(&self, context: &BaseLayerContext) -> Option<f64> {
        let last = self.core.model.bars.last()?;
        let bounds = context.projection.bounds;
        let range = bounds.range();
        let buffer = range * PRICE_LINE_BUFFER_RATIO;
        let candle_height = context.projection.candle_region_height;
        let volume_height = context.height - candle_height;
        let min_visible = if candle_height > 0.0 {
            bounds.min - range * (volume_height / candle_height)
        } else {
            bounds.min
        };
        let in_range = last.close >= min_visible - buffer && last.close <= bounds.max + buffer;
        in_range.then(|| context.projection.price_to_y(last.close))
    }

    fn record_current_price_line(
        &self,
        recorder: &mut PictureRecorder,
        context: &BaseLayerContext,
        y: f64,
    ) {
        let Some(last) = self.core.model.bars.last() else {
            return;
        };
        let end_x = context.width - self.core.layout.y_axis_width / 2.0;
        recorder.line(LinePrimitive::new(
            0.0,
            y,
            end_x,
            y,
            1.0,
            self.candle_color(last).with_alpha(PRICE_LINE_ALPHA),
        ));
    }

    /// Wicks in two passes, bullish first, so each pass keeps one paint.
    fn record_wicks(
        &self,
        recorder: &mut PictureRecorder,
        context: &BaseLayerContext,
        range: VisibleRange,
    ) {
        for bullish in [true, false] {
            for (index, bar) in self.visible_bars(range) {
                if bar.is_bullish() != bullish {
                    continue;
                }
                let x = context.geometry.pixel_x(index, context.viewport);
                recorder.line(
                    LinePrimitive::new(
                        x,
                        context.projection.price_to_y(bar.high),
                        x,
                        context.projection.price_to_y(bar.low),
                        WICK_WIDTH,
                        self.candle_color(bar).with_alpha(WICK_ALPHA),
                    )
                    .with_cap(LineCap::Round),
                );
            }
        }
    }

    fn record_bodies(
        &self,
        recorder: &mut PictureRecorder,
        context: &BaseLayerContext,
        range: VisibleRange,
    ) {
        let presentation = &self.core.presentation;
        let candles = &presentation.config.candles;
        let candle_width = context.viewport.candle_width;
        let radius = self.corner_radius(candle_width);
        let stroke_width = candles.stroke_width;
        let inner_stroke = presentation.color_mode.is_dark()
            && stroke_width > 0.0
            && candle_width >= 4.0 * stroke_width;

        for bullish in [true, false] {
            for (index, bar) in self.visible_bars(range) {
                if bar.is_bullish() != bullish {
                    continue;
                }
                let left = context.geometry.bar_left(index, context.viewport);
                let top = context.projection.price_to_y(bar.open.max(bar.close));
                let bottom = context.projection.price_to_y(bar.open.min(bar.close));
                let body_height = (bottom - top).max(MIN_BODY_HEIGHT);
                recorder.rect(
                    RectPrimitive::new(left, top, candle_width, body_height, self.candle_color(bar))
                        .with_corner_radius(radius),
                );
                if inner_stroke {
                    let inset = stroke_width / 2.0;
                    recorder.rect(
                        RectPrimitive::new(
                            left + inset,
                            top + inset,
                            candle_width - stroke_width,
                            (body_height - stroke_width).max(0.0),
                            Color::TRANSPARENT,
                        )
                        .with_border(stroke_width, candles.stroke_color)
                        .with_corner_radius((radius - inset).max(0.0)),
                    );
                }
            }
        }
    }

    fn record_current_price_bubble(&self, recorder: &mut PictureRecorder, y: f64) {
        let Some(last) = self.core.model.bars.last() else {
            return;
        };
        let label = self.format_price(last.close);
        let font = self.core.presentation.config.chart.label_font_size_px;
        let color = self.candle_color(last);
        self.record_price_bubble(
            recorder,
            PriceBubble {
                label_width: estimate_label_text_width_px(&label, font),
                label,
                left_x: self.y_axis_label_x(),
                center_y: y,
                color,
                text_color: color,
                stroke_opacity: PRICE_BUBBLE_STROKE_OPACITY,
            },
        );
    }
}

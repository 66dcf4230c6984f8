use cairo::{Context, Format, ImageSurface, LineJoin, Operator};
use pango::FontDescription;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::{ChartError, ChartResult};
use crate::render::{
    BlendMode, Color, CompositeFrame, DrawCommand, LineCap, LineStrokeStyle, Picture,
    RectPrimitive, Renderer, TextHAlign,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub circles_drawn: usize,
    pub paths_drawn: usize,
    pub texts_drawn: usize,
}

/// Renderers that can replay a frame into an external Cairo context (for
/// example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &CompositeFrame,
    ) -> ChartResult<()>;
}

/// Cairo + Pango renderer that replays recorded pictures.
///
/// Offscreen rendering goes through `Renderer::render` onto an owned image
/// surface; `CairoContextRenderer` draws onto a caller's context.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    fn render_with_context(&mut self, context: &Context, frame: &CompositeFrame) -> ChartResult<()> {
        frame.validate()?;

        apply_color(context, frame.background);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();
        for (_, picture) in frame.layers() {
            context
                .save()
                .map_err(|err| map_backend_error("failed to save context", err))?;
            let result = replay_picture(context, picture, &mut stats);
            context
                .restore()
                .map_err(|err| map_backend_error("failed to restore context", err))?;
            result?;
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &CompositeFrame) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &CompositeFrame,
    ) -> ChartResult<()> {
        self.render_with_context(context, frame)
    }
}

fn replay_picture(
    context: &Context,
    picture: &Picture,
    stats: &mut CairoRenderStats,
) -> ChartResult<()> {
    for command in picture.commands() {
        match command {
            DrawCommand::Clip(clip) => {
                context.rectangle(clip.x, clip.y, clip.width, clip.height);
                context.clip();
            }
            DrawCommand::Line(line) => {
                apply_color(context, line.color);
                context.set_line_width(line.stroke_width);
                context.set_line_cap(match line.cap {
                    LineCap::Butt => cairo::LineCap::Butt,
                    LineCap::Round => cairo::LineCap::Round,
                });
                match line.stroke_style {
                    LineStrokeStyle::Solid => context.set_dash(&[], 0.0),
                    LineStrokeStyle::Dashed { on, off } => context.set_dash(&[on, off], 0.0),
                }
                context.move_to(line.x1, line.y1);
                context.line_to(line.x2, line.y2);
                context
                    .stroke()
                    .map_err(|err| map_backend_error("failed to stroke line", err))?;
                context.set_dash(&[], 0.0);
                stats.lines_drawn += 1;
            }
            DrawCommand::Rect(rect) => {
                append_rect_path(context, *rect);
                apply_color(context, rect.fill_color);
                if rect.border_width > 0.0 {
                    context
                        .fill_preserve()
                        .map_err(|err| map_backend_error("failed to fill rectangle", err))?;
                    apply_color(context, rect.border_color);
                    context.set_line_width(rect.border_width);
                    context
                        .stroke()
                        .map_err(|err| map_backend_error("failed to stroke rectangle border", err))?;
                } else {
                    context
                        .fill()
                        .map_err(|err| map_backend_error("failed to fill rectangle", err))?;
                }
                stats.rects_drawn += 1;
            }
            DrawCommand::Circle(circle) => {
                context.set_operator(match circle.blend_mode {
                    BlendMode::SrcOver => Operator::Over,
                    BlendMode::Overlay => Operator::Overlay,
                });
                apply_color(context, circle.fill_color);
                context.new_sub_path();
                context.arc(circle.center_x, circle.center_y, circle.radius, 0.0, TAU);
                let filled = context.fill();
                context.set_operator(Operator::Over);
                filled.map_err(|err| map_backend_error("failed to fill circle", err))?;
                stats.circles_drawn += 1;
            }
            DrawCommand::Path(path) => {
                let Some(((first_x, first_y), rest)) = path.points.split_first() else {
                    continue;
                };
                apply_color(context, path.color);
                context.set_line_width(path.stroke_width);
                context.set_line_join(LineJoin::Round);
                context.set_line_cap(cairo::LineCap::Round);
                context.move_to(*first_x, *first_y);
                for (x, y) in rest {
                    context.line_to(*x, *y);
                }
                context
                    .stroke()
                    .map_err(|err| map_backend_error("failed to stroke path", err))?;
                stats.paths_drawn += 1;
            }
            DrawCommand::Text(text) => {
                let layout = pangocairo::functions::create_layout(context);
                let font_description =
                    FontDescription::from_string(&format!("Sans {}px", text.font_size_px));
                layout.set_font_description(Some(&font_description));
                layout.set_text(&text.text);

                let (text_width, _text_height) = layout.pixel_size();
                let x = match text.h_align {
                    TextHAlign::Left => text.x,
                    TextHAlign::Center => text.x - f64::from(text_width) / 2.0,
                    TextHAlign::Right => text.x - f64::from(text_width),
                };

                apply_color(context, text.color);
                context.move_to(x, text.y);
                pangocairo::functions::show_layout(context, &layout);
                stats.texts_drawn += 1;
            }
        }
    }
    Ok(())
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn append_rect_path(context: &Context, rect: RectPrimitive) {
    if rect.corner_radius <= 0.0 {
        context.rectangle(rect.x, rect.y, rect.width, rect.height);
        return;
    }

    let radius = rect
        .corner_radius
        .min(rect.width * 0.5)
        .min(rect.height * 0.5);
    let left = rect.x;
    let top = rect.y;
    let right = rect.x + rect.width;
    let bottom = rect.y + rect.height;

    context.new_sub_path();
    context.arc(right - radius, top + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(left + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.arc(left + radius, top + radius, radius, PI, PI + FRAC_PI_2);
    context.close_path();
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::InvalidData(format!("{prefix}: {err}"))
}

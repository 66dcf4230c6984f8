mod frame;
mod null_renderer;
mod picture;
mod picture_slot;
mod primitives;

pub use frame::CompositeFrame;
pub use null_renderer::NullRenderer;
pub use picture::{ClipRect, DrawCommand, Picture, PictureLayer, PictureRecorder};
pub use picture_slot::{PictureSlot, PictureSlotStats};
pub use primitives::{
    BlendMode, CirclePrimitive, Color, LineCap, LinePrimitive, LineStrokeStyle, PathPrimitive,
    RectPrimitive, TextHAlign, TextPrimitive,
};

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive the three current layer pictures so drawing code stays
/// isolated from chart domain and gesture logic.
pub trait Renderer {
    fn render(&mut self, frame: &CompositeFrame) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};

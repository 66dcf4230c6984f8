use std::sync::Arc;

use tracing::{debug, trace};

use crate::core::{Bar, ChartDimensions, PriceBounds, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{ChartEvent, CrosshairState, GestureState};
use crate::render::{CompositeFrame, Picture, PictureLayer, PictureSlotStats, Renderer};

use super::{ChartConfig, engine_core::EngineCore};

#[cfg(feature = "cairo-backend")]
use crate::render::CairoContextRenderer;

/// Main orchestration facade consumed by host applications.
///
/// `ChartEngine` owns the bar array, the viewport, the animator and the three
/// layer pictures. Every mutation happens on the thread that owns the engine;
/// other threads post gestures through [`ChartEngine::gesture_sender`].
pub struct ChartEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) core: EngineCore,
}

impl<R: Renderer> ChartEngine<R> {
    /// Current layer handles for compositing.
    #[must_use]
    pub fn composite_frame(&self) -> CompositeFrame {
        let presentation = &self.core.presentation;
        CompositeFrame {
            dimensions: presentation.dimensions,
            background: presentation.config.chart.background_color,
            base: presentation.pictures.base.current(),
            indicator: presentation.pictures.indicator.current(),
            crosshair: presentation.pictures.crosshair.current(),
        }
    }

    pub fn render(&mut self) -> ChartResult<()> {
        self.ensure_live()?;
        let frame = self.composite_frame();
        self.renderer.render(&frame)
    }

    /// Renders the current pictures into an external cairo context.
    #[cfg(feature = "cairo-backend")]
    pub fn render_on_cairo_context(&mut self, context: &cairo::Context) -> ChartResult<()>
    where
        R: CairoContextRenderer,
    {
        self.ensure_live()?;
        let frame = self.composite_frame();
        self.renderer.render_on_cairo_context(context, &frame)
    }

    /// One display frame: applies queued gestures, advances animations by
    /// `dt_ms` and renders.
    pub fn frame(&mut self, dt_ms: f64) -> ChartResult<()> {
        self.ensure_live()?;
        self.drain_gestures();
        self.advance(dt_ms);
        self.render()
    }

    /// Releases pictures, animations and data. Later renders fail with
    /// [`ChartError::Disposed`].
    pub fn dispose(&mut self) {
        if self.core.runtime.disposed {
            return;
        }
        self.core.runtime.animator.cancel_all();
        self.core.runtime.animator.take_settled();
        self.core.presentation.pictures.reset_all();
        self.core.model.bars.clear();
        self.core.model.indicators.clear();
        self.core.runtime.active_candle = None;
        self.core.runtime.gesture_active = false;
        self.core.runtime.disposed = true;
        debug!("disposed chart engine");
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.core.runtime.disposed
    }

    pub(super) fn ensure_live(&self) -> ChartResult<()> {
        if self.core.runtime.disposed {
            return Err(ChartError::Disposed);
        }
        Ok(())
    }

    pub(super) fn emit(&mut self, event: ChartEvent) {
        trace!(?event, "chart event");
        self.core.runtime.events.push(event);
    }

    /// Drains pending host notifications in emission order.
    pub fn take_events(&mut self) -> Vec<ChartEvent> {
        std::mem::take(&mut self.core.runtime.events)
    }

    #[must_use]
    pub fn picture(&self, layer: PictureLayer) -> Arc<Picture> {
        self.core.presentation.pictures.slot(layer).current()
    }

    #[must_use]
    pub fn picture_stats(&self, layer: PictureLayer) -> PictureSlotStats {
        self.core.presentation.pictures.slot(layer).stats()
    }

    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.core.model.bars
    }

    #[must_use]
    pub fn dimensions(&self) -> ChartDimensions {
        self.core.presentation.dimensions
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.core.presentation.config
    }

    /// Viewport as displayed, including any uncommitted prepend shift.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        let layout = &self.core.layout;
        layout
            .view
            .viewport
            .with_offset(layout.view.viewport.offset + layout.pending_offset)
    }

    /// Price bounds as currently displayed (mid-spring while animating).
    #[must_use]
    pub fn price_bounds(&self) -> PriceBounds {
        self.core.layout.view.bounds
    }

    #[must_use]
    pub fn max_displayed_volume(&self) -> f64 {
        self.core.layout.view.max_volume
    }

    #[must_use]
    pub fn y_axis_width(&self) -> f64 {
        self.core.layout.y_axis_width
    }

    #[must_use]
    pub fn active_candle(&self) -> Option<Bar> {
        self.core.runtime.active_candle
    }

    #[must_use]
    pub fn is_gesture_active(&self) -> bool {
        self.core.runtime.gesture_active
    }

    #[must_use]
    pub fn is_decelerating(&self) -> bool {
        self.core.runtime.interaction.is_decelerating()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.core.runtime.animator.is_animating()
    }

    #[must_use]
    pub fn gesture_state(&self) -> GestureState {
        self.core.runtime.interaction.gesture_state()
    }

    #[must_use]
    pub fn crosshair(&self) -> CrosshairState {
        self.core.runtime.interaction.crosshair()
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

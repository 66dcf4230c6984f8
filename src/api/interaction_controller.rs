use tracing::{trace, warn};

use crate::interaction::{
    AnimatedValue, ChartEvent, DecayConfig, GestureCommand, GestureSender, GestureState,
    HapticFeedback, PinchSession, RecognizerState,
};
use crate::render::Renderer;

use super::ChartEngine;

/// Offsets closer than this to `min_offset` count as pinned to the newest bar.
const PINNED_RIGHT_TOLERANCE_PX: f64 = 2.0;

impl<R: Renderer> ChartEngine<R> {
    /// Cloneable `Send` handle for posting gestures from an input thread.
    #[must_use]
    pub fn gesture_sender(&self) -> GestureSender {
        self.core.runtime.gestures.sender()
    }

    /// Applies every queued gesture in posting order. Returns how many ran.
    pub fn drain_gestures(&mut self) -> usize {
        let commands = self.core.runtime.gestures.drain();
        let count = commands.len();
        for command in commands {
            self.apply_gesture(command);
        }
        count
    }

    pub fn apply_gesture(&mut self, command: GestureCommand) {
        if self.core.runtime.disposed {
            warn!(?command, "ignoring gesture on disposed engine");
            return;
        }
        match command {
            GestureCommand::PanStart => self.pan_start(),
            GestureCommand::PanChange { translation_x } => self.pan_change(translation_x),
            GestureCommand::PanEnd { velocity_x } => self.pan_end(velocity_x),
            GestureCommand::PinchStart { focal_x } => self.pinch_start(focal_x),
            GestureCommand::PinchUpdate { scale } => self.pinch_update(scale),
            GestureCommand::PinchEnd => self.pinch_end(),
            GestureCommand::CrosshairStart { x, y } => self.long_press_start(x, y),
            GestureCommand::CrosshairMove { x, y, state } => self.long_press_move(x, y, state),
            GestureCommand::CrosshairEnd { x, y, state } => self.long_press_end(x, y, state),
        }
    }

    fn claim(&mut self, state: GestureState) -> bool {
        let claimed = self.core.runtime.interaction.try_claim(state);
        if !claimed {
            trace!(
                requested = ?state,
                owner = ?self.core.runtime.interaction.gesture_state(),
                "gesture rejected, touch owned by another recognizer"
            );
        }
        claimed
    }

    fn owns(&self, state: GestureState) -> bool {
        self.core.runtime.interaction.gesture_state() == state
    }

    /// Stops a running fling; its settle report runs immediately.
    fn stop_deceleration(&mut self) {
        self.core.runtime.animator.cancel(AnimatedValue::Offset);
        self.process_settled();
        self.set_decelerating(false);
    }

    pub fn pan_start(&mut self) {
        if !self.claim(GestureState::Panning) {
            return;
        }
        self.stop_deceleration();
        let start_offset = self.core.layout.view.viewport.offset;
        self.core.runtime.interaction.on_pan_start(start_offset);
        trace!(start_offset, "pan start");
    }

    /// `translation_x` is the cumulative drag since `pan_start`.
    pub fn pan_change(&mut self, translation_x: f64) {
        if !self.owns(GestureState::Panning) || !translation_x.is_finite() {
            return;
        }
        let Some(session) = self.core.runtime.interaction.pan() else {
            return;
        };
        let current = self.offset_x();
        let start = session.start_offset + self.core.layout.pending_offset;
        let clamped = self.clamp_offset(start + translation_x);
        if clamped == current {
            return;
        }

        self.set_offset_direct(clamped);
        let at_boundary = clamped == 0.0 || clamped == self.min_offset();
        if at_boundary && current != start {
            self.emit(ChartEvent::Haptic(HapticFeedback::Soft));
        } else {
            self.request_history_near_edge(clamped);
        }
        self.rebuild_chart(true, false);
    }

    /// `velocity_x` is the release speed in px/s.
    pub fn pan_end(&mut self, velocity_x: f64) {
        if !self.owns(GestureState::Panning) {
            return;
        }
        let interaction = &mut self.core.runtime.interaction;
        interaction.on_pan_end();
        interaction.release(GestureState::Panning);
        self.commit_pending_offset();

        let chart = self.core.presentation.config.chart;
        if !velocity_x.is_finite() || velocity_x.abs() <= chart.fling_velocity_threshold {
            return;
        }
        let current = self.offset_x();
        let min_offset = self.min_offset();
        if min_offset > 0.0 {
            return;
        }
        let blocked_left = current >= 0.0 && velocity_x > 0.0;
        let blocked_right = current <= min_offset && velocity_x < 0.0;
        if blocked_left || blocked_right {
            return;
        }

        self.set_decelerating(true);
        self.core.runtime.animator.decay(
            AnimatedValue::Offset,
            DecayConfig {
                velocity: velocity_x,
                deceleration: chart.pan_gesture_deceleration,
                rest_velocity: chart.decay_rest_velocity,
                clamp: Some((min_offset, 0.0)),
            },
        );
        trace!(velocity_x, "fling started");
    }

    pub fn pinch_start(&mut self, focal_x: f64) {
        if !self.claim(GestureState::Pinching) {
            return;
        }
        self.commit_pending_offset();
        self.stop_deceleration();

        let viewport = self.viewport();
        let (anchor_index, anchor_x) = self.nearest_bar(focal_x).unwrap_or((0, focal_x));
        let session = PinchSession {
            start_bar_count: self.core.model.bars.len(),
            start_width: viewport.candle_width,
            anchor_index,
            anchor_x,
            pinned_right: (viewport.offset - self.min_offset()).abs() < PINNED_RIGHT_TOLERANCE_PX,
        };
        self.core.runtime.interaction.on_pinch_start(session);
        trace!(?session, "pinch start");
    }

    /// `scale` is relative to the candle width at `pinch_start`.
    pub fn pinch_update(&mut self, scale: f64) {
        if !self.owns(GestureState::Pinching) || !scale.is_finite() || scale <= 0.0 {
            return;
        }
        let Some(session) = self.core.runtime.interaction.pinch() else {
            return;
        };
        self.commit_pending_offset();

        let geometry = self.geometry();
        let new_width = geometry.clamp_candle_width(session.start_width * scale);
        if new_width == self.core.layout.view.viewport.candle_width {
            return;
        }
        let view = &mut self.core.layout.view;
        view.viewport = view.viewport.with_candle_width(new_width);

        // Bars prepended mid-gesture shift the anchor's index.
        let prepended = geometry.bar_count.saturating_sub(session.start_bar_count);
        let offset = if session.pinned_right {
            geometry.min_offset(new_width)
        } else {
            geometry
                .pinched_around(
                    (session.anchor_index + prepended) as f64,
                    session.anchor_x,
                    new_width,
                )
                .offset
        };
        self.set_offset_direct(offset);
        self.request_history_near_edge(offset);
        self.rebuild_chart(true, false);
    }

    pub fn pinch_end(&mut self) {
        if !self.owns(GestureState::Pinching) {
            return;
        }
        let interaction = &mut self.core.runtime.interaction;
        interaction.on_pinch_end();
        interaction.release(GestureState::Pinching);
    }

    pub fn long_press_start(&mut self, x: f64, y: f64) {
        if !self.claim(GestureState::CrosshairActive) {
            return;
        }
        self.emit(ChartEvent::Haptic(HapticFeedback::Soft));
        self.core.runtime.interaction.on_pointer_move(x, y);
        self.build_crosshair_picture(x, y, true);
    }

    pub fn long_press_move(&mut self, x: f64, y: f64, state: RecognizerState) {
        if !self.owns(GestureState::CrosshairActive) {
            return;
        }
        self.core.runtime.interaction.on_pointer_move(x, y);
        self.build_crosshair_picture(x, y, state == RecognizerState::Active);
    }

    pub fn long_press_end(&mut self, x: f64, y: f64, state: RecognizerState) {
        if !self.owns(GestureState::CrosshairActive) {
            return;
        }
        if state == RecognizerState::Ended {
            self.emit(ChartEvent::Haptic(HapticFeedback::Rigid));
        }
        self.core.runtime.interaction.on_pointer_move(x, y);
        self.build_crosshair_picture(x, y, false);
        self.core
            .runtime
            .interaction
            .release(GestureState::CrosshairActive);
    }
}

mod animator;
mod commands;

pub use animator::{
    AnimatedValue, AnimationTarget, Animator, DecayConfig, DecaySettled, SpringConfig, TickReport,
};
pub use commands::{GestureCommand, GestureQueue, GestureSender, RecognizerState};

use serde::{Deserialize, Serialize};

use crate::core::Bar;

/// Which recognizer currently owns touch input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GestureState {
    #[default]
    Idle,
    Panning,
    Pinching,
    CrosshairActive,
}

/// Haptic requests surfaced to the host. The engine never performs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HapticFeedback {
    Soft,
    Rigid,
    Selection,
}

/// Notifications drained by the host with `take_events`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChartEvent {
    Haptic(HapticFeedback),
    /// Older bars should be fetched and passed to `set_candles`.
    HistoryRequested,
    ActiveCandleChanged(Option<Bar>),
    DecelerationChanged(bool),
}

/// Snapped crosshair position for the active candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrosshairSnap {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub price: f64,
}

/// Public crosshair state exposed to host applications.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CrosshairState {
    pub visible: bool,
    /// Last raw touch position.
    pub x: f64,
    pub y: f64,
    pub snap: Option<CrosshairSnap>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanSession {
    /// Raw (uncommitted) offset captured at pan start.
    pub start_offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PinchSession {
    pub start_bar_count: usize,
    pub start_width: f64,
    pub anchor_index: usize,
    pub anchor_x: f64,
    pub pinned_right: bool,
}

/// Gesture ownership plus the per-gesture bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    state: GestureState,
    pan: Option<PanSession>,
    pinch: Option<PinchSession>,
    crosshair: CrosshairState,
    decelerating: bool,
}

impl InteractionState {
    #[must_use]
    pub fn gesture_state(self) -> GestureState {
        self.state
    }

    /// Claims touch ownership. The first recognizer to activate keeps it until
    /// it releases.
    pub fn try_claim(&mut self, state: GestureState) -> bool {
        if self.state == GestureState::Idle || self.state == state {
            self.state = state;
            return true;
        }
        false
    }

    pub fn release(&mut self, state: GestureState) {
        if self.state == state {
            self.state = GestureState::Idle;
        }
    }

    #[must_use]
    pub fn pan(self) -> Option<PanSession> {
        self.pan
    }

    pub fn on_pan_start(&mut self, start_offset: f64) {
        self.pan = Some(PanSession { start_offset });
    }

    pub fn on_pan_end(&mut self) {
        self.pan = None;
    }

    #[must_use]
    pub fn pinch(self) -> Option<PinchSession> {
        self.pinch
    }

    pub fn on_pinch_start(&mut self, session: PinchSession) {
        self.pinch = Some(session);
    }

    pub fn on_pinch_end(&mut self) {
        self.pinch = None;
    }

    #[must_use]
    pub fn crosshair(self) -> CrosshairState {
        self.crosshair
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.crosshair.x = x;
        self.crosshair.y = y;
    }

    pub fn set_crosshair_snap(&mut self, snap: Option<CrosshairSnap>) {
        self.crosshair.visible = snap.is_some();
        self.crosshair.snap = snap;
    }

    #[must_use]
    pub fn is_decelerating(self) -> bool {
        self.decelerating
    }

    /// Returns `true` when the flag actually flipped.
    pub fn set_decelerating(&mut self, decelerating: bool) -> bool {
        let changed = self.decelerating != decelerating;
        self.decelerating = decelerating;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_recognizer_keeps_ownership() {
        let mut state = InteractionState::default();
        assert!(state.try_claim(GestureState::Panning));
        assert!(!state.try_claim(GestureState::Pinching));
        assert!(state.try_claim(GestureState::Panning));

        state.release(GestureState::Pinching);
        assert_eq!(state.gesture_state(), GestureState::Panning);
        state.release(GestureState::Panning);
        assert!(state.try_claim(GestureState::CrosshairActive));
    }

    #[test]
    fn deceleration_flag_reports_transitions_only() {
        let mut state = InteractionState::default();
        assert!(!state.set_decelerating(false));
        assert!(state.set_decelerating(true));
        assert!(!state.set_decelerating(true));
        assert!(state.set_decelerating(false));
    }
}

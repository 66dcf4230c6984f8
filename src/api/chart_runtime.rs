use crate::core::Bar;
use crate::interaction::{Animator, ChartEvent, GestureQueue, InteractionState};

/// Frame-to-frame orchestration state grouped separately from model/presentation.
#[derive(Default)]
pub(super) struct ChartRuntimeState {
    pub(super) animator: Animator,
    pub(super) interaction: InteractionState,
    pub(super) gestures: GestureQueue,
    pub(super) events: Vec<ChartEvent>,
    pub(super) active_candle: Option<Bar>,
    pub(super) gesture_active: bool,
    pub(super) disposed: bool,
}

use tracing::trace;

use crate::interaction::{AnimatedValue, ChartEvent, DecaySettled, HapticFeedback};
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Recomputes bounds, then re-records the base picture followed by the
    /// indicator picture.
    ///
    /// A momentum run that carried the offset out of range (the clamp range
    /// moved under it) is stopped and snapped back first.
    pub fn rebuild_chart(&mut self, animate: bool, force_bounds: bool) {
        if self.core.runtime.disposed {
            return;
        }
        if self.core.runtime.interaction.is_decelerating() {
            let current = self.offset_x();
            let clamped = self.clamp_offset(current);
            if clamped != current {
                self.emit(ChartEvent::Haptic(HapticFeedback::Soft));
                self.set_decelerating(false);
                self.set_offset_direct(clamped);
            }
        }
        self.handle_animations(animate, force_bounds);
        self.build_base_picture();
        self.build_indicator_picture();
    }

    /// Advances animations by `dt_ms` milliseconds, rebuilding when a value
    /// moved. Returns whether anything moved.
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        if self.core.runtime.disposed {
            return false;
        }
        let report = self
            .core
            .runtime
            .animator
            .tick(&mut self.core.layout.view, dt_ms);
        if report.changed {
            self.rebuild_chart(true, false);
        }
        for settled in report.settled {
            self.on_decay_settled(settled);
        }
        if report.after_animations {
            self.commit_pending_offset();
        }
        report.changed
    }

    pub(super) fn process_settled(&mut self) {
        let settled = self.core.runtime.animator.take_settled();
        for report in settled {
            self.on_decay_settled(report);
        }
    }

    fn on_decay_settled(&mut self, settled: DecaySettled) {
        if settled.key != AnimatedValue::Offset {
            return;
        }
        trace!(
            completed = settled.completed,
            hit_boundary = settled.hit_boundary,
            "momentum settled"
        );
        self.set_decelerating(false);
        self.commit_pending_offset();
        if settled.hit_boundary {
            self.emit(ChartEvent::Haptic(HapticFeedback::Soft));
        }
        if settled.completed {
            self.rebuild_active_crosshair();
        }
    }
}

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::Bar;
use crate::interaction::ChartEvent;
use crate::render::Renderer;

use super::ChartEngine;

/// Flags accompanying a bar array swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetCandlesOptions {
    /// Older history exists upstream and may be requested.
    pub has_previous_candles: bool,
    /// Jump back to the newest bar instead of preserving the viewport.
    pub reset_offset: bool,
}

impl<R: Renderer> ChartEngine<R> {
    /// Replaces the bar array.
    ///
    /// A longer array that starts earlier than the current one is treated as
    /// a history prepend: the viewport shifts by the added bars so the same
    /// candles stay on screen. Any other change re-pins the viewport to the
    /// newest bar when it was pinned there (or on reset/first load) and
    /// rebuilds bounds without animation.
    pub fn set_candles(&mut self, bars: Vec<Bar>, options: SetCandlesOptions) {
        if self.core.runtime.disposed {
            warn!("ignoring set_candles on disposed engine");
            return;
        }
        let original_count = bars.len();
        let bars = canonicalize_bars(bars);
        self.core.model.loading_history = false;

        if bars == self.core.model.bars {
            self.core.model.has_previous_candles = options.has_previous_candles;
            trace!(count = bars.len(), "set candles with unchanged bars");
            return;
        }

        let old = &self.core.model.bars;
        let was_prepended = !options.reset_offset
            && !old.is_empty()
            && bars.len() > old.len()
            && bars.first().map(|bar| bar.timestamp) < old.first().map(|bar| bar.timestamp);
        let was_pinned_right =
            options.reset_offset || old.is_empty() || self.offset_x() == self.min_offset();
        let added = bars.len().saturating_sub(old.len());
        debug!(
            original_count,
            canonical_count = bars.len(),
            was_prepended,
            was_pinned_right,
            "set candles"
        );

        self.core.model.bars = bars;
        self.core.model.has_previous_candles = options.has_previous_candles;
        self.core.model.indicators.compute_all(&self.core.model.bars);

        if was_prepended {
            self.register_prepend_adjustment(added);
            if self.core.runtime.animator.run_after_animations() {
                self.commit_pending_offset();
            }
            self.rebuild_chart(true, false);
            self.rebuild_active_crosshair();
            return;
        }

        self.commit_pending_offset();
        self.reset_bounds_tracking();
        self.refresh_target_bounds();
        if was_pinned_right {
            self.pin_to_newest_bar();
        } else {
            self.rebuild_chart(false, true);
        }
        self.rebuild_active_crosshair();
    }

    /// Moves the newest bar flush against the y-axis and force-rebuilds.
    ///
    /// The rebuild can change the y-axis width (and with it `min_offset`), so
    /// the offset is re-pinned once afterwards.
    fn pin_to_newest_bar(&mut self) {
        self.set_offset_direct(self.min_offset());
        self.rebuild_chart(false, true);
        let min_offset = self.min_offset();
        if self.offset_x() != min_offset {
            self.set_offset_direct(min_offset);
            self.rebuild_chart(false, true);
        }
    }

    /// Queues the shift that keeps on-screen bars in place after `added` bars
    /// were inserted at the front.
    fn register_prepend_adjustment(&mut self, added: usize) {
        self.refresh_target_bounds();
        let current = self.offset_x();
        let stride = self
            .geometry()
            .stride(self.core.layout.view.viewport.candle_width);
        let desired = self.clamp_offset(current - added as f64 * stride);
        self.core.layout.pending_offset += desired - current;
        trace!(
            added,
            pending = self.core.layout.pending_offset,
            "registered prepend offset adjustment"
        );
    }

    /// Jumps to the newest bar and rebuilds bounds without animation.
    pub fn snap_to_current_candle(&mut self) {
        let min_offset = self.min_offset();
        if self.offset_x() == min_offset {
            return;
        }
        self.commit_pending_offset();
        self.reset_bounds_tracking();
        self.set_decelerating(false);
        self.pin_to_newest_bar();
        self.rebuild_active_crosshair();
    }

    /// Asks the host for older bars. Returns whether a request was emitted.
    ///
    /// Requests are suppressed when no older history exists, a load is
    /// already in flight, or the configured bar cap is reached. An emitted
    /// request marks a load in flight until the next `set_candles` or
    /// `set_loading_history(false)`.
    pub fn request_additional_candles(&mut self) -> bool {
        let model = &self.core.model;
        if !model.has_previous_candles
            || model.loading_history
            || model.bars.len() >= self.core.presentation.config.chart.max_candles_to_load
        {
            return false;
        }
        self.core.model.loading_history = true;
        debug!(count = self.core.model.bars.len(), "requesting older candles");
        self.emit(ChartEvent::HistoryRequested);
        true
    }

    pub fn set_loading_history(&mut self, loading: bool) {
        self.core.model.loading_history = loading;
    }

    #[must_use]
    pub fn is_loading_history(&self) -> bool {
        self.core.model.loading_history
    }

    #[must_use]
    pub fn has_previous_candles(&self) -> bool {
        self.core.model.has_previous_candles
    }
}

fn is_valid_bar(bar: &Bar) -> bool {
    Bar::new(
        bar.timestamp,
        bar.open,
        bar.high,
        bar.low,
        bar.close,
        bar.volume,
    )
    .is_ok()
}

/// Drops invalid bars, sorts by time and keeps the last bar per timestamp.
fn canonicalize_bars(mut bars: Vec<Bar>) -> Vec<Bar> {
    let original_len = bars.len();
    bars.retain(is_valid_bar);
    bars.sort_by_key(|bar| bar.timestamp);

    let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
    let mut duplicate_count = 0_usize;
    for bar in bars {
        if let Some(last) = deduped.last_mut() {
            if bar.timestamp == last.timestamp {
                *last = bar;
                duplicate_count += 1;
                continue;
            }
        }
        deduped.push(bar);
    }

    let filtered_count = original_len.saturating_sub(deduped.len() + duplicate_count);
    if filtered_count > 0 || duplicate_count > 0 {
        warn!(
            filtered_count,
            duplicate_count,
            canonical_count = deduped.len(),
            "canonicalized candles on set_candles"
        );
    }
    deduped
}

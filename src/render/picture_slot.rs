use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::render::{Picture, PictureLayer};

/// Lifetime counters for one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PictureSlotStats {
    /// Recorded pictures installed into the slot.
    pub recorded: usize,
    /// Recorded pictures the slot released on replacement or teardown.
    pub disposed: usize,
}

impl PictureSlotStats {
    /// Recorded pictures still owned by the slot (0 or 1).
    #[must_use]
    pub fn live(self) -> usize {
        self.recorded - self.disposed
    }
}

/// Single-writer owner of one layer's current picture.
///
/// Replacement swaps the handle and drops the slot's reference to the old
/// picture in the same call. A paint that cloned the previous handle keeps it
/// alive until it finishes.
#[derive(Debug)]
pub struct PictureSlot {
    layer: PictureLayer,
    current: Arc<Picture>,
    blank: Arc<Picture>,
    stats: PictureSlotStats,
}

impl PictureSlot {
    #[must_use]
    pub fn new(layer: PictureLayer, blank: Arc<Picture>) -> Self {
        Self {
            layer,
            current: Arc::clone(&blank),
            blank,
            stats: PictureSlotStats::default(),
        }
    }

    #[must_use]
    pub fn layer(&self) -> PictureLayer {
        self.layer
    }

    /// Handle for a reader. Cheap to clone.
    #[must_use]
    pub fn current(&self) -> Arc<Picture> {
        Arc::clone(&self.current)
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        Arc::ptr_eq(&self.current, &self.blank)
    }

    #[must_use]
    pub fn stats(&self) -> PictureSlotStats {
        self.stats
    }

    /// Installs a freshly recorded picture and disposes the previous one.
    pub fn replace(&mut self, picture: Picture) {
        let previous = std::mem::replace(&mut self.current, Arc::new(picture));
        self.stats.recorded += 1;
        self.release(previous);
    }

    /// Swaps to the shared blank picture. No-op when already blank.
    pub fn reset_to_blank(&mut self) {
        if self.is_blank() {
            return;
        }
        let previous = std::mem::replace(&mut self.current, Arc::clone(&self.blank));
        self.release(previous);
    }

    fn release(&mut self, previous: Arc<Picture>) {
        if Arc::ptr_eq(&previous, &self.blank) {
            return;
        }
        self.stats.disposed += 1;
        trace!(
            layer = ?self.layer,
            commands = previous.commands().len(),
            still_shared = Arc::strong_count(&previous) > 1,
            "disposed picture"
        );
        drop(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Color, LinePrimitive, PictureRecorder};

    fn one_line() -> Picture {
        let mut recorder = PictureRecorder::begin(10.0, 10.0);
        recorder.line(LinePrimitive::new(0.0, 0.0, 1.0, 1.0, 1.0, Color::WHITE));
        recorder.finish()
    }

    #[test]
    fn replacement_disposes_previous_picture() {
        let mut slot = PictureSlot::new(PictureLayer::Base, Arc::new(Picture::blank(10.0, 10.0)));
        slot.replace(one_line());
        slot.replace(one_line());
        let stats = slot.stats();
        assert_eq!(stats.recorded, 2);
        assert_eq!(stats.disposed, 1);
        assert_eq!(stats.live(), 1);
    }

    #[test]
    fn reader_handle_outlives_replacement() {
        let mut slot = PictureSlot::new(PictureLayer::Crosshair, Arc::new(Picture::blank(10.0, 10.0)));
        slot.replace(one_line());
        let in_flight = slot.current();
        slot.reset_to_blank();
        assert!(slot.is_blank());
        assert_eq!(in_flight.line_count(), 1);
        assert_eq!(slot.stats().live(), 0);
    }

    #[test]
    fn blank_is_never_counted_as_disposed() {
        let mut slot = PictureSlot::new(PictureLayer::Indicator, Arc::new(Picture::blank(10.0, 10.0)));
        slot.reset_to_blank();
        slot.reset_to_blank();
        assert_eq!(slot.stats(), PictureSlotStats::default());
    }
}

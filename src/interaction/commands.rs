use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Recognizer phase for long-press move/end events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognizerState {
    Active,
    Ended,
    Cancelled,
}

/// Gesture intents posted from the input thread and applied once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureCommand {
    PanStart,
    /// Cumulative horizontal translation since `PanStart`.
    PanChange { translation_x: f64 },
    /// Release velocity in px/s.
    PanEnd { velocity_x: f64 },
    PinchStart { focal_x: f64 },
    /// Scale relative to the candle width at `PinchStart`.
    PinchUpdate { scale: f64 },
    PinchEnd,
    CrosshairStart { x: f64, y: f64 },
    CrosshairMove { x: f64, y: f64, state: RecognizerState },
    CrosshairEnd { x: f64, y: f64, state: RecognizerState },
}

/// Cloneable, `Send` handle for posting gestures to an engine.
#[derive(Debug, Clone)]
pub struct GestureSender {
    tx: mpsc::Sender<GestureCommand>,
}

impl GestureSender {
    /// Fails with [`ChartError::Disposed`] once the engine is gone.
    pub fn send(&self, command: GestureCommand) -> ChartResult<()> {
        self.tx.send(command).map_err(|_| ChartError::Disposed)
    }
}

/// Single-consumer side of the gesture channel.
#[derive(Debug)]
pub struct GestureQueue {
    tx: mpsc::Sender<GestureCommand>,
    rx: mpsc::Receiver<GestureCommand>,
}

impl Default for GestureQueue {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl GestureQueue {
    #[must_use]
    pub fn sender(&self) -> GestureSender {
        GestureSender {
            tx: self.tx.clone(),
        }
    }

    /// Every command posted so far, in posting order.
    pub fn drain(&self) -> Vec<GestureCommand> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_posting_order_across_threads() {
        let queue = GestureQueue::default();
        let sender = queue.sender();
        let worker = std::thread::spawn(move || {
            sender.send(GestureCommand::PanStart).expect("send");
            sender
                .send(GestureCommand::PanChange { translation_x: 12.0 })
                .expect("send");
        });
        worker.join().expect("join");

        assert_eq!(
            queue.drain(),
            vec![
                GestureCommand::PanStart,
                GestureCommand::PanChange { translation_x: 12.0 }
            ]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn sender_reports_disposed_queue() {
        let queue = GestureQueue::default();
        let sender = queue.sender();
        drop(queue);
        assert!(matches!(
            sender.send(GestureCommand::PinchEnd),
            Err(ChartError::Disposed)
        ));
    }
}

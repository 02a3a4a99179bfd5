//! Single-use stop/done handshake between the controller and one worker.
//!
//! Exactly two messages cross a handshake: one stop instruction from the
//! controller and one done acknowledgment from the worker, in that order.
//! The only exception is a worker that fails to set up capture, which
//! acknowledges without waiting for the stop. Each end is consumed by the
//! send it performs, so neither message can be sent twice.

use tokio::sync::oneshot;

use super::segment::SegmentOutcome;

/// Why the controller ended a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The fixed segment window elapsed.
    WindowElapsed,
    /// The shutdown signal fired; this is the last segment.
    Shutdown,
}

/// Create the two ends of a fresh handshake.
pub fn handshake() -> (ControllerEnd, WorkerEnd) {
    let (stop_tx, stop_rx) = oneshot::channel();
    let (done_tx, done_rx) = oneshot::channel();

    (
        ControllerEnd { stop_tx, done_rx },
        WorkerEnd { stop_rx, done_tx },
    )
}

pub struct ControllerEnd {
    stop_tx: oneshot::Sender<StopReason>,
    done_rx: oneshot::Receiver<SegmentOutcome>,
}

impl ControllerEnd {
    /// Send the stop instruction.
    pub fn stop(self, reason: StopReason) -> AwaitingDone {
        let delivered = self.stop_tx.send(reason).is_ok();
        AwaitingDone {
            delivered,
            done_rx: self.done_rx,
        }
    }
}

/// Controller end after the stop instruction went out.
pub struct AwaitingDone {
    delivered: bool,
    done_rx: oneshot::Receiver<SegmentOutcome>,
}

impl AwaitingDone {
    /// `false` when the worker had already acknowledged and gone away.
    pub fn stop_delivered(&self) -> bool {
        self.delivered
    }

    /// Wait for the worker's acknowledgment. `None` if the worker ended
    /// without sending one.
    pub async fn done(self) -> Option<SegmentOutcome> {
        self.done_rx.await.ok()
    }
}

pub struct WorkerEnd {
    stop_rx: oneshot::Receiver<StopReason>,
    done_tx: oneshot::Sender<SegmentOutcome>,
}

impl WorkerEnd {
    /// Acknowledge without waiting for a stop instruction. Only used when
    /// the segment could not start.
    pub fn acknowledge_early(self, outcome: SegmentOutcome) {
        let _ = self.done_tx.send(outcome);
    }

    /// Block the current thread until the stop instruction arrives.
    ///
    /// Must not be called from an async context. A controller that went
    /// away without sending stop reads as a shutdown.
    pub fn wait_for_stop(self) -> StopReceived {
        let reason = self.stop_rx.blocking_recv().unwrap_or(StopReason::Shutdown);
        StopReceived {
            reason,
            done_tx: self.done_tx,
        }
    }
}

/// Worker end after the stop instruction was received.
pub struct StopReceived {
    pub reason: StopReason,
    done_tx: oneshot::Sender<SegmentOutcome>,
}

impl StopReceived {
    pub fn acknowledge(self, outcome: SegmentOutcome) {
        let _ = self.done_tx.send(outcome);
    }
}

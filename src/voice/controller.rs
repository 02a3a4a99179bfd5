//! The recording loop.
//!
//! One segment at a time: name it, hand it to a worker, wait for the window
//! to elapse or for shutdown, tell the worker to stop, and wait for its
//! acknowledgment before doing anything else. The next segment never starts
//! before the previous file is finalized, and shutdown only ever ends the
//! loop after the in-flight file has been closed.

use chrono::{DateTime, FixedOffset, Local};
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::handshake::{handshake, StopReason};
use super::segment::{Segment, SegmentOutcome};
use super::worker::SegmentWorker;

/// Length of every segment that is not cut short by shutdown.
pub const SEGMENT_DURATION: Duration = Duration::from_secs(7);

type Clock = Box<dyn FnMut() -> DateTime<FixedOffset> + Send>;

/// Totals over one controller run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub segments: usize,
    pub recorded: usize,
    pub stream_failures: usize,
    pub file_failures: usize,
    /// Workers that ended without acknowledging (panicked)
    pub unacknowledged: usize,
    pub frames: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: Option<&SegmentOutcome>) {
        self.segments += 1;
        match outcome {
            Some(recorded @ SegmentOutcome::Recorded { .. }) => {
                self.recorded += 1;
                self.frames += u64::from(recorded.frames());
            }
            Some(SegmentOutcome::StreamFailed { .. }) => self.stream_failures += 1,
            Some(SegmentOutcome::FileFailed { .. }) => self.file_failures += 1,
            None => self.unacknowledged += 1,
        }
    }
}

pub struct SegmentController {
    worker: SegmentWorker,
    shutdown: CancellationToken,
    segment_duration: Duration,
    clock: Clock,
}

impl SegmentController {
    pub fn new(worker: SegmentWorker, shutdown: CancellationToken) -> Self {
        Self {
            worker,
            shutdown,
            segment_duration: SEGMENT_DURATION,
            clock: Box::new(|| Local::now().fixed_offset()),
        }
    }

    #[cfg(test)]
    fn with_segment_duration(mut self, duration: Duration) -> Self {
        self.segment_duration = duration;
        self
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: impl FnMut() -> DateTime<FixedOffset> + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Record segments back to back until the shutdown token fires.
    ///
    /// Each iteration lasts the full window even when the worker acknowledges
    /// early because its stream failed to open; the early acknowledgment is
    /// collected after the window, and the next segment then starts without
    /// further delay. Segment names have one-second resolution, so ending the
    /// iteration at once would reuse the failed segment's file name.
    ///
    /// Returns once the last segment's file is finalized and every worker
    /// task has been joined.
    pub async fn run(mut self) -> RunSummary {
        let mut workers = JoinSet::new();
        let mut summary = RunSummary::default();

        loop {
            let (controller_end, worker_end) = handshake();
            let segment = Segment::starting_at(&(self.clock)());
            let segment_name = segment.name.clone();

            let worker = self.worker.clone();
            workers.spawn_blocking(move || worker.run(segment, worker_end));
            debug!(segment = %segment_name, "Segment started");

            let reason = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => StopReason::Shutdown,
                _ = tokio::time::sleep(self.segment_duration) => StopReason::WindowElapsed,
            };

            let awaiting = controller_end.stop(reason);
            if !awaiting.stop_delivered() {
                debug!(segment = %segment_name, "Worker finished before the stop instruction");
            }

            // Mandatory even on shutdown: the file must be closed before exit.
            let outcome = awaiting.done().await;
            match outcome {
                Some(ref outcome) => {
                    info!(file = ?outcome.path(), frames = outcome.frames(), "Segment finished")
                }
                None => {
                    error!(segment = %segment_name, "Segment worker ended without acknowledging")
                }
            }
            summary.record(outcome.as_ref());

            while let Some(joined) = workers.try_join_next() {
                log_join(joined);
            }

            if reason == StopReason::Shutdown {
                info!("dying, breaking...");
                break;
            }
        }

        while let Some(joined) = workers.join_next().await {
            log_join(joined);
        }

        summary
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!("Segment worker task failed: {}", e);
    }
}

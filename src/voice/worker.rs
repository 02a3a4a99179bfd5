//! Executes exactly one segment: create the file, stream audio into it,
//! stop and finalize on instruction, acknowledge once.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::backend::AudioBackend;
use super::handshake::WorkerEnd;
use super::segment::{Segment, SegmentOutcome};
use super::storage::SegmentFile;

#[derive(Clone)]
pub struct SegmentWorker {
    backend: Arc<dyn AudioBackend>,
    output_dir: PathBuf,
}

impl SegmentWorker {
    pub fn new(backend: Arc<dyn AudioBackend>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            output_dir: output_dir.into(),
        }
    }

    /// Record `segment` until the controller says stop.
    ///
    /// Blocks the calling thread; run it on a blocking-capable thread.
    pub fn run(&self, segment: Segment, handshake: WorkerEnd) {
        let path = segment.path_in(&self.output_dir);
        debug!(segment = %segment, "Segment worker starting");

        info!(file_name = %segment.file_name(), "Creating audio file");
        let file = match SegmentFile::create(&path, segment.format) {
            Ok(f) => f,
            Err(e) => {
                error!("{}", e);
                handshake.acknowledge_early(SegmentOutcome::FileFailed { path });
                return;
            }
        };

        let mut stream = match self.backend.open_capture(segment.format, file.sink()) {
            Ok(s) => s,
            Err(e) => {
                error!("{}", e);
                error!(file_name = %segment.file_name(), "Failed to create record stream, leaving segment empty");
                if let Err(e) = file.close() {
                    error!("{}", e);
                }
                handshake.acknowledge_early(SegmentOutcome::StreamFailed { path });
                return;
            }
        };

        // Audio usually takes a moment to start flowing after this.
        if let Err(e) = stream.start() {
            warn!(file_name = %segment.file_name(), "Capture stream did not start: {}", e);
        }
        debug!(segment = %segment, "Segment worker recording");

        let stop = handshake.wait_for_stop();
        info!(
            file_name = %segment.file_name(),
            reason = ?stop.reason,
            "Stopping recording and saving file"
        );

        if let Err(e) = stream.stop() {
            warn!("Failed to stop capture stream: {}", e);
        }
        drop(stream);

        let outcome = match file.close() {
            Ok(frames) => SegmentOutcome::Recorded { path, frames },
            Err(e) => {
                error!("{}", e);
                SegmentOutcome::FileFailed { path }
            }
        };

        stop.acknowledge(outcome);
        debug!(segment = %segment, "Segment worker done");
    }
}

use hound::WavWriter;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, error};

use super::audio::AudioFormat;
use super::backend::SampleSink;

type SharedWriter = Arc<Mutex<Option<WavWriter<BufWriter<File>>>>>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("Failed to finalize {}: {source}", .path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

/// WAV container for one segment.
///
/// The header is written on `create`, so the file exists on disk even if no
/// samples ever arrive. `close` patches the size fields and releases the
/// handle; until then the writer is shared with the capture callback through
/// the sink.
pub struct SegmentFile {
    path: PathBuf,
    format: AudioFormat,
    writer: SharedWriter,
}

impl SegmentFile {
    pub fn create(path: impl Into<PathBuf>, format: AudioFormat) -> Result<Self, StorageError> {
        let path = path.into();
        let writer = WavWriter::create(&path, format.wav_spec()).map_err(|source| {
            StorageError::Create {
                path: path.clone(),
                source,
            }
        })?;

        debug!("Created segment file {:?}", path);

        Ok(Self {
            path,
            format,
            writer: Arc::new(Mutex::new(Some(writer))),
        })
    }

    /// Sink that appends every captured buffer to this file.
    ///
    /// Buffers arriving after `close` are discarded.
    pub fn sink(&self) -> SampleSink {
        let writer = Arc::clone(&self.writer);
        let path = self.path.clone();
        let mut failed = false;

        Box::new(move |samples: &[f32]| {
            if failed {
                return;
            }

            let mut guard = lock(&writer);
            if let Some(ref mut w) = *guard {
                for &sample in samples {
                    if let Err(e) = w.write_sample(sample) {
                        error!("Failed to write samples to {:?}: {}", path, e);
                        failed = true;
                        break;
                    }
                }
            }
        })
    }

    /// Finalize the container. Returns the number of frames written.
    pub fn close(self) -> Result<u32, StorageError> {
        let writer = lock(&self.writer).take();

        let Some(writer) = writer else {
            return Ok(0);
        };

        let frames = self.format.frames(writer.len());
        writer.finalize().map_err(|source| StorageError::Finalize {
            path: self.path.clone(),
            source,
        })?;

        debug!(frames, "Finalized segment file {:?}", self.path);
        Ok(frames)
    }
}

// A panic inside the capture callback must not stop the file from being
// finalized, so poisoning is ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

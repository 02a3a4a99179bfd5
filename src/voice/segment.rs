//! Segment identity and outcome.
//!
//! A segment is one bounded recording session. Its name is the RFC3339
//! timestamp of the moment capture started, and that name is also the base
//! of the WAV file it produces.

use chrono::{DateTime, SecondsFormat, TimeZone};
use std::fmt;
use std::path::{Path, PathBuf};

use super::audio::AudioFormat;

/// One recording unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// RFC3339 capture start time, used as the base file name
    pub name: String,
    /// Capture format (fixed sample rate, single channel)
    pub format: AudioFormat,
}

impl Segment {
    pub fn starting_at<Tz>(started_at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            name: started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            format: AudioFormat::CAPTURE_MONO,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.wav", self.name)
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// How a segment ended, as reported by its worker on completion.
///
/// The controller does not branch on this; it only feeds the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    /// Capture ran until the stop instruction and the file was finalized.
    Recorded { path: PathBuf, frames: u32 },
    /// The capture stream could not be opened. The file exists but holds no audio.
    StreamFailed { path: PathBuf },
    /// The destination file could not be created or finalized.
    FileFailed { path: PathBuf },
}

impl SegmentOutcome {
    pub fn path(&self) -> &Path {
        match self {
            SegmentOutcome::Recorded { path, .. }
            | SegmentOutcome::StreamFailed { path }
            | SegmentOutcome::FileFailed { path } => path,
        }
    }

    pub fn frames(&self) -> u32 {
        match self {
            SegmentOutcome::Recorded { frames, .. } => *frames,
            _ => 0,
        }
    }
}

use clap::ArgMatches;
use std::path::PathBuf;

use crate::cli::DEFAULT_LOG_PATH;

/// Runtime configuration: the two command-line flags plus environment
/// overrides (a `.env` file is honoured).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfig {
    pub log_path: PathBuf,
    pub debug: bool,
    /// Directory segment files are written to (`RECORDINGS_DIR`)
    pub recordings_dir: PathBuf,
    /// Input device name (`AUDIO_INPUT_DEVICE`); default input when unset
    pub input_device: Option<String>,
}

impl RecorderConfig {
    pub fn from_env(matches: &ArgMatches) -> Self {
        Self::from_lookup(matches, |key| std::env::var(key).ok())
    }

    fn from_lookup(matches: &ArgMatches, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            log_path: matches
                .get_one::<PathBuf>("log_path")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH)),
            debug: matches.get_flag("debug"),
            recordings_dir: non_empty("RECORDINGS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            input_device: non_empty("AUDIO_INPUT_DEVICE"),
        }
    }
}

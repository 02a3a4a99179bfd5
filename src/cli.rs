use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

pub const DEFAULT_LOG_PATH: &str = "./vaf.log";

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .about("Record the microphone into back-to-back WAV segments")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("log_path")
                .long("log-path")
                .alias("logPath")
                .value_name("PATH")
                .help("Path to log file")
                .default_value(DEFAULT_LOG_PATH)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug mode")
                .action(ArgAction::SetTrue),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let matches = build_cli().try_get_matches_from(["rspi-mic-recorder"]).unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("log_path").unwrap(),
            &PathBuf::from(DEFAULT_LOG_PATH)
        );
        assert!(!matches.get_flag("debug"));
    }

    #[test]
    fn test_flags() {
        let matches = build_cli()
            .try_get_matches_from(["rspi-mic-recorder", "--logPath", "/var/log/mic.log", "--debug"])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("log_path").unwrap(),
            &PathBuf::from("/var/log/mic.log")
        );
        assert!(matches.get_flag("debug"));
    }

    #[test]
    fn test_rejects_positional_arguments() {
        assert!(build_cli()
            .try_get_matches_from(["rspi-mic-recorder", "record"])
            .is_err());
    }
}

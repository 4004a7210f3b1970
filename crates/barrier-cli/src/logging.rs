use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
};

/// Maps `-v` occurrences and `--quiet` to the console level.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber: compact stderr output, plus a plain-text file if requested.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(level_filter(verbosity, quiet));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .with_target(true)
                    .with_filter(LevelFilter::DEBUG.max(level_filter(verbosity, quiet))),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::PathBuf;
    use tracing::{debug, info, trace};

    #[test]
    fn verbosity_maps_to_increasing_levels() {
        assert_eq!(level_filter(0, false), LevelFilter::WARN);
        assert_eq!(level_filter(1, false), LevelFilter::INFO);
        assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(level_filter(7, false), LevelFilter::TRACE);
    }

    #[test]
    fn quiet_keeps_only_errors() {
        assert_eq!(level_filter(0, true), LevelFilter::ERROR);
    }

    #[test]
    #[serial]
    fn file_layer_records_debug_events_with_thread_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("barrier.log");

        let file = File::create(&log_path).unwrap();
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_filter(LevelFilter::DEBUG);
        let subscriber = tracing_subscriber::registry().with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            debug!(trees = 3, "Flooding finished.");
            trace!("Not recorded.");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Flooding finished."));
        assert!(content.contains("trees=3"));
        assert!(content.contains("ThreadId"));
        assert!(!content.contains("Not recorded."));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_is_an_io_error() {
        let directory = PathBuf::from("/");
        if cfg!(unix) && directory.is_dir() {
            let result = setup_logging(0, false, Some(&directory));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
        info!("Logger state is unchanged after a failed setup.");
    }
}

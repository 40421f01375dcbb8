//! Logging set up for the follower executables
//!
//! Records go through the `log` facade to stdout and to the session log file. Every line starts
//! with the seconds since the session epoch, so log lines can be lined up with the rows of the
//! status archives in the same session.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level};
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Targets capped at a quieter level than the one requested.
const CAPPED_TARGETS: &[(&str, LevelFilter)] = &[
    ("zmq", LevelFilter::Info)
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Log level {0} would hide warnings from the follow loop, use INFO or more verbose")]
    LevelTooQuiet(LevelFilter),

    #[error("Could not open the session log file: {0}")]
    LogFile(std::io::Error),

    #[error("A logger has already been installed: {0}")]
    AlreadyInstalled(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Install the logger for this execution, writing to stdout and `session.log_file_path`.
///
/// `min_level` must be `Info` or more verbose. Can only succeed once per process.
pub fn logger_init(
    min_level: LevelFilter,
    session: &Session
) -> Result<(), LoggerInitError> {

    if min_level < Level::Info {
        return Err(LoggerInitError::LevelTooQuiet(min_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFile)?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!(
            "{} {}",
            line_prefix(session::get_elapsed_seconds(), record.level(), record.target()),
            message
        )))
        .level(min_level);

    for (target, cap) in CAPPED_TARGETS {
        dispatch = dispatch.level_for(*target, *cap);
    }

    dispatch
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::AlreadyInstalled)?;

    info!(
        "Logging at {:?} to {:?}, session epoch {}",
        min_level, session.log_file_path, session::get_epoch()
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Start of a log line. Debug and trace lines also name their module, since the per-tick output
/// of several modules is interleaved at those levels.
fn line_prefix(elapsed_s: f64, level: Level, target: &str) -> String {
    match level {
        Level::Debug | Level::Trace =>
            format!("[{:10.6} {}] {}:", elapsed_s, level_tag(level), target),
        _ => format!("[{:10.6} {}]", elapsed_s, level_tag(level))
    }
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Error => "ERR".red().bold(),
        Level::Warn  => "WRN".yellow(),
        Level::Info  => "INF".normal(),
        Level::Debug => "DBG".dimmed(),
        Level::Trace => "TRC".dimmed().italic()
    }
}

//! Global log subscriber installation.
//!
//! Output goes to stderr; stdout usually carries the LSP transport.

use std::str::FromStr;

use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;

use crate::LogConfig;

/// Errors from [`init`].
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	/// The configured level is not a known tracing level.
	#[error("unknown log level: {0}")]
	InvalidLevel(String),
	/// A global subscriber was installed earlier in this process.
	#[error("a global log subscriber is already installed")]
	AlreadyInstalled(#[from] SetGlobalDefaultError),
}

/// Parses a level name such as `"debug"`, case-insensitively.
pub fn parse_level(level: &str) -> Result<Level, LoggingError> {
	Level::from_str(level.trim()).map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}

/// Installs a `fmt` subscriber as the global default.
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(parse_level(&config.level)?)
		.with_ansi(config.ansi)
		.with_writer(std::io::stderr)
		.finish();

	tracing::subscriber::set_global_default(subscriber)?;
	Ok(())
}

//! Server configuration loaded from JSON.

use std::path::{Path, PathBuf};

use quire_cache::WalkOptions;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Whether the document cache decorator is installed.
	pub caching: bool,
	/// Log output settings.
	pub log: LogConfig,
	/// Options for the workspace walk on `initialize`.
	pub walk: WalkOptions,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			caching: true,
			log: LogConfig::default(),
			walk: WalkOptions::default(),
		}
	}
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
	/// Maximum level, one of `trace`, `debug`, `info`, `warn`, `error`.
	pub level: String,
	/// Emit ANSI colors.
	pub ansi: bool,
}

impl Default for LogConfig {
	fn default() -> Self {
		Self {
			level: "info".into(),
			ansi: false,
		}
	}
}

/// Errors from loading a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The file could not be read.
	#[error("failed to read config {}: {source}", path.display())]
	Io {
		/// Path that failed.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},
	/// The JSON was malformed or had unknown fields.
	#[error("invalid config: {0}")]
	Parse(#[from] serde_json::Error),
}

impl Config {
	/// Parses a configuration from JSON text. Missing fields take defaults.
	pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(text)?)
	}

	/// Reads and parses a configuration file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_json_str(&text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_from_empty_object() {
		let config = Config::from_json_str("{}").unwrap();
		assert!(config.caching);
		assert_eq!(config.log.level, "info");
		assert!(config.walk.excluded_dirs.iter().any(|dir| dir == ".git"));
	}

	#[test]
	fn test_partial_override() {
		let config =
			Config::from_json_str(r#"{"caching": false, "log": {"level": "debug"}}"#).unwrap();
		assert!(!config.caching);
		assert_eq!(config.log.level, "debug");
		assert!(!config.log.ansi);
	}

	#[test]
	fn test_unknown_field_is_rejected() {
		let err = Config::from_json_str(r#"{"cache": true}"#).unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}

	#[test]
	fn test_load_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("quire.json");
		std::fs::write(&path, r#"{"walk": {"excluded_dirs": ["target"]}}"#).unwrap();

		let config = Config::load(&path).unwrap();
		assert_eq!(config.walk.excluded_dirs, vec!["target".to_string()]);

		let err = Config::load(&dir.path().join("missing.json")).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
	}
}

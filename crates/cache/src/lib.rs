//! Document synchronization cache for language servers.
//!
//! The cache keeps an authoritative view of every workspace file while an
//! editor opens, edits, saves and closes it:
//!
//! * [`Cache`]: the registry of tracked files, keyed by URI.
//! * [`CachedFile`]: per-file state (editor buffer, on-disk cache, version)
//!   and the incremental edit merge.
//! * [`DetachedFile`]: an owned point-in-time copy of a file with staleness
//!   detection, for work that must not hold any lock.
//!
//! Two lock scopes are used. The registry lock guards only the shape of the
//! map. Each [`CachedFile`] has its own lock, held for a whole change batch
//! and across disk reads of saved content. Edits to different files never
//! contend.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

mod cached;
pub mod error;
mod file;
pub mod loader;
pub mod position;
mod registry;
mod snapshot;
pub mod walk;

pub use cached::Cached;
pub use error::{Error, ErrorKind, Result};
pub use file::{CachedFile, FileInfo};
pub use loader::{ContentLoader, DiskLoader};
pub use position::{ByteSpan, PositionError, PositionMapper, Utf16Mapper};
pub use registry::Cache;
pub use snapshot::DetachedFile;
pub use walk::WalkOptions;

/// Re-export of the [`lsp_types`] dependency of this crate.
pub use lsp_types;

/// Converts a filesystem path to an LSP `file://` URI.
///
/// Relative paths are resolved against the current directory. Returns `None`
/// if the path cannot be represented as a URI.
pub fn uri_from_path(path: &std::path::Path) -> Option<lsp_types::Uri> {
	use std::str::FromStr;

	let abs_path = if path.is_absolute() {
		path.to_path_buf()
	} else {
		std::env::current_dir().ok()?.join(path)
	};

	let url = url::Url::from_file_path(abs_path).ok()?;
	lsp_types::Uri::from_str(url.as_str()).ok()
}

/// Converts an LSP URI to a filesystem path.
///
/// Returns `None` if the URI is not a `file://` scheme or cannot be parsed.
pub fn path_from_uri(uri: &lsp_types::Uri) -> Option<std::path::PathBuf> {
	use std::str::FromStr;

	let url = url::Url::from_str(uri.as_str()).ok()?;
	url.to_file_path().ok()
}

/// Returns the registry key identifying the file behind `uri`.
///
/// File URIs are decoded to a path and re-encoded, so spellings that differ
/// only in percent-encoding (`a%40b.txt` and `a@b.txt`) share one key. Other
/// URIs are keyed by their raw text.
pub fn canonical_key(uri: &lsp_types::Uri) -> String {
	if !is_file_uri(uri) {
		return uri.as_str().to_string();
	}
	path_from_uri(uri)
		.and_then(|path| uri_from_path(&path))
		.map_or_else(|| uri.as_str().to_string(), |canonical| canonical.as_str().to_string())
}

/// Returns `true` if the URI uses the `file` scheme.
pub fn is_file_uri(uri: &lsp_types::Uri) -> bool {
	uri.as_str()
		.split_once(':')
		.is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case("file"))
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use super::*;

	#[test]
	fn test_file_uri_round_trip() {
		let uri = uri_from_path(Path::new("/tmp/quire/a.rs")).unwrap();
		assert_eq!(uri.as_str(), "file:///tmp/quire/a.rs");
		assert!(is_file_uri(&uri));
		assert_eq!(path_from_uri(&uri).unwrap(), Path::new("/tmp/quire/a.rs"));
	}

	#[test]
	fn test_canonical_key_ignores_percent_encoding() {
		let escaped: lsp_types::Uri = "file:///tmp/quire/a%40b.txt".parse().unwrap();
		let plain = uri_from_path(Path::new("/tmp/quire/a@b.txt")).unwrap();
		assert_eq!(canonical_key(&escaped), canonical_key(&plain));

		let untitled: lsp_types::Uri = "untitled:Untitled-1".parse().unwrap();
		assert_eq!(canonical_key(&untitled), "untitled:Untitled-1");
	}

	#[test]
	fn test_non_file_uri() {
		let uri: lsp_types::Uri = "untitled:Untitled-1".parse().unwrap();
		assert!(!is_file_uri(&uri));
		assert!(path_from_uri(&uri).is_none());
	}
}

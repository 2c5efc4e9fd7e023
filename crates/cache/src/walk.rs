//! Workspace directory enumeration.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};

/// Version control metadata directories skipped by default.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] =
	&[".git", ".hg", ".svn", ".bzr", "_darcs", "CVS", ".jj", ".pijul", ".fslckout"];

/// Options for the initial workspace walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalkOptions {
	/// Directory names that are never descended into.
	pub excluded_dirs: Vec<String>,
	/// Follow symbolic links while walking.
	pub follow_links: bool,
}

impl Default for WalkOptions {
	fn default() -> Self {
		Self {
			excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| (*d).to_string()).collect(),
			follow_links: false,
		}
	}
}

/// Recursively lists the regular files under `root`.
///
/// Unreadable entries and directories are logged and skipped; their subtree is
/// simply missing from the result.
pub fn walk_files(root: &Path, options: &WalkOptions) -> Vec<PathBuf> {
	let excluded = options.excluded_dirs.clone();
	let walker = WalkBuilder::new(root)
		.standard_filters(false)
		.follow_links(options.follow_links)
		.filter_entry(move |entry| {
			let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
			let excluded_name = excluded.iter().any(|name| entry.file_name() == name.as_str());
			!(is_dir && entry.depth() > 0 && excluded_name)
		})
		.build();

	let mut files = Vec::new();
	for entry in walker {
		let entry = match entry {
			Ok(entry) => entry,
			Err(err) => {
				tracing::warn!(
					error = %err,
					root = %root.display(),
					"workspace walk entry skipped"
				);
				continue;
			}
		};

		if entry.file_type().is_some_and(|ft| ft.is_file()) {
			files.push(entry.into_path());
		}
	}

	files
}

//! Per-file cache state.

mod merge;

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use lsp_types::{TextDocumentContentChangeEvent, Uri};
use parking_lot::RwLock;

pub(crate) use self::merge::is_full_replace;
use self::merge::merge_changes;
use crate::cached::Cached;
use crate::loader::ContentLoader;
use crate::snapshot::DetachedFile;
use crate::{Error, PositionMapper, Result};

/// Identity and open-state metadata of a tracked file. Carries no content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
	/// File URI.
	pub uri: Uri,
	/// Local path, if the URI names one.
	pub path: Option<PathBuf>,
	/// Whether the file is open in the editor.
	pub is_opened: bool,
	/// Editor-reported language, empty if never opened.
	pub language_id: String,
	/// Last editor-supplied version.
	pub version: i32,
}

/// Mutable state of a [`CachedFile`], guarded by its lock.
#[derive(Debug, Default)]
struct FileState {
	language_id: String,
	/// Editor buffer. `None` while the file is not open.
	ide_content: Option<Vec<u8>>,
	saved_content: Cached<Vec<u8>>,
	version: i32,
}

/// A file tracked by the [`Cache`](crate::Cache).
///
/// The registry owns every `CachedFile`. Its URI never changes; everything
/// else lives behind a per-file lock so that operations on different files
/// never contend.
#[derive(Debug)]
pub struct CachedFile {
	uri: Uri,
	path: OnceLock<Option<PathBuf>>,
	state: RwLock<FileState>,
}

impl CachedFile {
	/// Creates an unopened file.
	pub fn new(uri: Uri) -> Self {
		Self {
			uri,
			path: OnceLock::new(),
			state: RwLock::new(FileState::default()),
		}
	}

	/// Creates an unopened file whose local path is already known.
	pub fn with_path(uri: Uri, path: PathBuf) -> Self {
		Self {
			uri,
			path: OnceLock::from(Some(path)),
			state: RwLock::new(FileState::default()),
		}
	}

	/// Returns the file URI.
	pub fn uri(&self) -> &Uri {
		&self.uri
	}

	/// Returns the local path, derived from the URI on first use.
	pub fn path(&self) -> Option<&Path> {
		self.path.get_or_init(|| crate::path_from_uri(&self.uri)).as_deref()
	}

	/// Returns `true` if the file is open in the editor.
	pub fn is_opened(&self) -> bool {
		self.state.read().ide_content.is_some()
	}

	/// Returns the last editor-supplied version.
	pub fn version(&self) -> i32 {
		self.state.read().version
	}

	/// Returns the editor-reported language.
	pub fn language_id(&self) -> String {
		self.state.read().language_id.clone()
	}

	/// Returns the metadata of this file.
	pub fn info(&self) -> FileInfo {
		let state = self.state.read();
		FileInfo {
			uri: self.uri.clone(),
			path: self.path().map(Path::to_path_buf),
			is_opened: state.ide_content.is_some(),
			language_id: state.language_id.clone(),
			version: state.version,
		}
	}

	/// Marks the file open with the editor's full text.
	///
	/// An empty `language_id` keeps the previous one.
	pub(crate) fn open(&self, text: &str, version: i32, language_id: &str) {
		let mut state = self.state.write();
		state.ide_content = Some(text.as_bytes().to_vec());
		state.version = version;
		if !language_id.is_empty() {
			state.language_id = language_id.to_string();
		}
	}

	/// Replaces the editor buffer with `text`, opening the file if needed.
	pub(crate) fn set_ide_content(&self, text: &str, version: i32) {
		let mut state = self.state.write();
		state.ide_content = Some(text.as_bytes().to_vec());
		state.version = version;
	}

	/// Applies an ordered batch of incremental changes.
	///
	/// The lock is held for the whole batch. Each change is resolved against the
	/// output of the previous one; on any failure the working copy is dropped and
	/// the file keeps its prior content and version.
	pub(crate) fn merge_changes(
		&self,
		mapper: &dyn PositionMapper,
		changes: &[TextDocumentContentChangeEvent],
		version: i32,
	) -> Result<()> {
		let mut state = self.state.write();
		if state.ide_content.is_none() {
			tracing::warn!(
				uri = self.uri.as_str(),
				"didChange on a file that is not open; merging into empty content"
			);
		}

		let base = state.ide_content.as_deref().unwrap_or_default();
		let merged = merge_changes(mapper, base, changes)?;

		state.ide_content = Some(merged);
		state.version = version;
		Ok(())
	}

	/// Drops the editor buffer. Version and saved content are kept.
	pub(crate) fn close(&self) {
		self.state.write().ide_content = None;
	}

	/// Forgets the cached on-disk content so the next read hits the disk.
	pub(crate) fn reset_saved_content(&self) {
		self.state.write().saved_content.invalidate();
	}

	/// Returns a copy of the on-disk content.
	///
	/// Reads through `loader` when `force_read` is set or nothing is cached. A
	/// failed read leaves the cache unset.
	pub fn saved_content(&self, loader: &dyn ContentLoader, force_read: bool) -> Result<Vec<u8>> {
		let mut state = self.state.write();
		if force_read {
			state.saved_content.invalidate();
		}

		let path = self.path().ok_or_else(|| Error::NotAFile(self.uri.as_str().to_string()))?;
		let content = state.saved_content.get_or_try_insert_with(|| {
			tracing::trace!(path = %path.display(), "reading saved content");
			loader.load(path).map_err(|source| Error::Io {
				path: path.to_path_buf(),
				source,
			})
		})?;

		Ok(content.clone())
	}

	/// Copies the current editor buffer and version into a [`DetachedFile`].
	pub fn detach(self: &Arc<Self>, loader: Arc<dyn ContentLoader>) -> DetachedFile {
		let state = self.state.read();
		DetachedFile::new(
			Arc::downgrade(self),
			loader,
			self.uri.clone(),
			self.path().map(Path::to_path_buf),
			state.language_id.clone(),
			state.ide_content.clone(),
			state.version,
		)
	}

	/// Returns `true` if the live version differs from the snapshot's.
	///
	/// Content is not compared.
	pub fn changed_since(&self, snapshot: &DetachedFile) -> bool {
		self.state.read().version != snapshot.version()
	}
}

#[cfg(test)]
mod tests;

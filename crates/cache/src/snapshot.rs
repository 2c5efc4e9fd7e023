use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use lsp_types::Uri;

use crate::file::CachedFile;
use crate::loader::ContentLoader;
use crate::{Error, Result};

/// An owned, point-in-time copy of a [`CachedFile`].
///
/// Holds its own copy of the editor buffer and version; later edits to the
/// live file are never visible through it. The only link back to the live
/// file is a weak reference used by [`is_stale`](Self::is_stale) and
/// [`saved_content`](Self::saved_content).
pub struct DetachedFile {
	file: Weak<CachedFile>,
	loader: Arc<dyn ContentLoader>,
	uri: Uri,
	path: Option<PathBuf>,
	language_id: String,
	was_opened: bool,
	content: Vec<u8>,
	version: i32,
}

impl std::fmt::Debug for DetachedFile {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DetachedFile")
			.field("uri", &self.uri.as_str())
			.field("language_id", &self.language_id)
			.field("was_opened", &self.was_opened)
			.field("content_len", &self.content.len())
			.field("version", &self.version)
			.finish()
	}
}

impl DetachedFile {
	pub(crate) fn new(
		file: Weak<CachedFile>,
		loader: Arc<dyn ContentLoader>,
		uri: Uri,
		path: Option<PathBuf>,
		language_id: String,
		content: Option<Vec<u8>>,
		version: i32,
	) -> Self {
		Self {
			file,
			loader,
			uri,
			path,
			language_id,
			was_opened: content.is_some(),
			content: content.unwrap_or_default(),
			version,
		}
	}

	/// Returns the file URI.
	pub fn uri(&self) -> &Uri {
		&self.uri
	}

	/// Returns the live file's local path at capture time.
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// Returns the editor-reported language at capture time.
	pub fn language_id(&self) -> &str {
		&self.language_id
	}

	/// Returns `true` if the file was open in the editor at capture time.
	pub fn was_opened(&self) -> bool {
		self.was_opened
	}

	/// Returns the captured editor buffer, empty if the file was not open.
	pub fn content(&self) -> &[u8] {
		&self.content
	}

	/// Consumes the snapshot, returning the captured buffer.
	pub fn into_content(self) -> Vec<u8> {
		self.content
	}

	/// Returns the version at capture time.
	pub fn version(&self) -> i32 {
		self.version
	}

	/// Returns `true` if the live file's version moved since capture.
	///
	/// A file that is no longer tracked (the workspace was re-initialized) is
	/// always stale.
	pub fn is_stale(&self) -> bool {
		self.file.upgrade().is_none_or(|file| file.changed_since(self))
	}

	/// Returns the live file's on-disk content.
	///
	/// See [`CachedFile::saved_content`].
	pub fn saved_content(&self, force_read: bool) -> Result<Vec<u8>> {
		let file = self
			.file
			.upgrade()
			.ok_or_else(|| Error::Detached(self.uri.as_str().to_string()))?;
		file.saved_content(self.loader.as_ref(), force_read)
	}
}

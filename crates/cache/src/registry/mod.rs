//! Workspace-wide registry of tracked files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lsp_types::{
	DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
	DidSaveTextDocumentParams, InitializeParams, InitializeResult, SaveOptions,
	TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
	TextDocumentSyncSaveOptions, Uri,
};
use parking_lot::RwLock;
use tracing::{Span, debug, info, warn};

use crate::file::{CachedFile, FileInfo, is_full_replace};
use crate::loader::{ContentLoader, DiskLoader};
use crate::position::{PositionMapper, Utf16Mapper};
use crate::snapshot::DetachedFile;
use crate::walk::{WalkOptions, walk_files};
use crate::{Error, Result};

/// Registry state replaced as a whole on initialization.
#[derive(Default)]
struct RegistryState {
	root_uri: Option<Uri>,
	root_path: Option<PathBuf>,
	/// Tracked files keyed by [`canonical_key`](crate::canonical_key).
	files: HashMap<String, Arc<CachedFile>>,
}

/// The document synchronization cache.
///
/// Tracks every workspace file by URI and applies the editor's lifecycle
/// notifications to them.
///
/// # Concurrency
///
/// - `state`: `RwLock` over the map shape and workspace root only. Never held
///   across content edits or disk reads.
/// - Each [`CachedFile`] carries its own lock, so edits to different files run
///   in parallel while edits to one file are serialized.
///
/// The cache imposes no order between concurrent calls for the same file
/// beyond whichever takes the file lock first; callers that need open to
/// precede close must serialize per file themselves.
pub struct Cache {
	state: RwLock<RegistryState>,
	mapper: Arc<dyn PositionMapper>,
	loader: Arc<dyn ContentLoader>,
	walk_options: WalkOptions,
	span: Span,
}

impl std::fmt::Debug for Cache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.read();
		f.debug_struct("Cache")
			.field("root_uri", &state.root_uri.as_ref().map(|uri| uri.as_str()))
			.field("root_path", &state.root_path)
			.field("file_count", &state.files.len())
			.field("walk_options", &self.walk_options)
			.finish()
	}
}

impl Default for Cache {
	fn default() -> Self {
		Self::new()
	}
}

impl Cache {
	/// Creates an empty cache reading from disk and mapping UTF-16 positions.
	pub fn new() -> Self {
		Self {
			state: RwLock::new(RegistryState::default()),
			mapper: Arc::new(Utf16Mapper),
			loader: Arc::new(DiskLoader),
			walk_options: WalkOptions::default(),
			span: Span::none(),
		}
	}

	/// Replaces the position mapper.
	pub fn with_mapper(mut self, mapper: Arc<dyn PositionMapper>) -> Self {
		self.mapper = mapper;
		self
	}

	/// Replaces the saved-content loader.
	pub fn with_loader(mut self, loader: Arc<dyn ContentLoader>) -> Self {
		self.loader = loader;
		self
	}

	/// Sets the options for the initialization walk.
	pub fn with_walk_options(mut self, options: WalkOptions) -> Self {
		self.walk_options = options;
		self
	}

	/// Sets the span all cache events are recorded under.
	pub fn with_span(mut self, span: Span) -> Self {
		self.span = span;
		self
	}

	/// Returns the workspace root URI, once initialized.
	pub fn root_uri(&self) -> Option<Uri> {
		self.state.read().root_uri.clone()
	}

	/// Returns the workspace root path, once initialized.
	pub fn root_path(&self) -> Option<PathBuf> {
		self.state.read().root_path.clone()
	}

	/// Walks `root_path` and replaces every tracked file with one unopened
	/// file per regular file found.
	///
	/// Unreadable subtrees are logged and left out. Meant to run before
	/// steady-state notification traffic; the map swap itself is atomic.
	pub fn initialize(&self, root_uri: Option<Uri>, root_path: &Path) {
		let _guard = self.span.enter();

		let mut files = HashMap::new();
		for path in walk_files(root_path, &self.walk_options) {
			let Some(uri) = crate::uri_from_path(&path) else {
				warn!(path = %path.display(), "skipping file without a file URI");
				continue;
			};
			let key = crate::canonical_key(&uri);
			files.insert(key, Arc::new(CachedFile::with_path(uri, path)));
		}

		info!(root = %root_path.display(), files = files.len(), "workspace cache initialized");

		let root_uri = root_uri.or_else(|| crate::uri_from_path(root_path));
		*self.state.write() = RegistryState {
			root_uri,
			root_path: Some(root_path.to_path_buf()),
			files,
		};
	}

	/// Initializes from an LSP `initialize` request.
	///
	/// The root is taken from `rootUri`, then `rootPath`, then the first
	/// workspace folder. Without any root the cache stays empty.
	#[allow(deprecated)]
	pub fn initialize_from_params(&self, params: &InitializeParams) -> Result<()> {
		let first_folder = params.workspace_folders.as_ref().and_then(|folders| folders.first());
		let (root_uri, root_path) = if let Some(uri) = &params.root_uri {
			let path = crate::path_from_uri(uri).ok_or_else(|| {
				Error::InvalidRequest(format!("rootUri is not a file URI: {}", uri.as_str()))
			})?;
			(Some(uri.clone()), Some(path))
		} else if let Some(path) = &params.root_path {
			(None, Some(PathBuf::from(path)))
		} else if let Some(folder) = first_folder {
			(Some(folder.uri.clone()), crate::path_from_uri(&folder.uri))
		} else {
			(None, None)
		};

		match root_path {
			Some(root_path) => self.initialize(root_uri, &root_path),
			None => {
				let _guard = self.span.enter();
				warn!("initialize without a workspace root; cache starts empty");
				*self.state.write() = RegistryState::default();
			}
		}
		Ok(())
	}

	/// Returns the text document sync capability the cache relies on.
	///
	/// Open/close notifications, incremental changes, and save notifications
	/// without text.
	pub fn sync_capability() -> TextDocumentSyncCapability {
		TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
			open_close: Some(true),
			change: Some(TextDocumentSyncKind::INCREMENTAL),
			save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
				include_text: Some(false),
			})),
			..Default::default()
		})
	}

	/// Overrides the text document sync capability of an `initialize` result.
	pub fn contribute_capabilities(&self, result: &mut InitializeResult) {
		result.capabilities.text_document_sync = Some(Self::sync_capability());
	}

	/// Looks up a tracked file. Percent-encoding differences in file URIs are
	/// ignored.
	pub fn get_file(&self, uri: &Uri) -> Option<Arc<CachedFile>> {
		self.state.read().files.get(&crate::canonical_key(uri)).cloned()
	}

	/// Returns the tracked file for `uri`, inserting `build()` if absent.
	///
	/// `build` runs outside the lock. When two callers race on a new URI the
	/// first insert wins and the other built file is dropped, so at most one
	/// file is ever installed per URI. URIs are compared by
	/// [`canonical_key`](crate::canonical_key).
	pub fn get_or_create(&self, uri: &Uri, build: impl FnOnce() -> CachedFile) -> Arc<CachedFile> {
		if let Some(file) = self.get_file(uri) {
			return file;
		}

		let (file, installed) = self.install(uri, Arc::new(build()));
		if installed {
			debug!(uri = uri.as_str(), "tracking new file");
		}
		file
	}

	/// Inserts `built` unless a file is already tracked for `uri`.
	///
	/// Returns the tracked file and whether it is `built`.
	fn install(&self, uri: &Uri, built: Arc<CachedFile>) -> (Arc<CachedFile>, bool) {
		let key = crate::canonical_key(uri);
		let file = self.state.write().files.entry(key).or_insert_with(|| built.clone()).clone();
		let installed = Arc::ptr_eq(&file, &built);
		(file, installed)
	}

	fn get_or_create_default(&self, uri: &Uri) -> Arc<CachedFile> {
		self.get_or_create(uri, || CachedFile::new(uri.clone()))
	}

	/// Returns the metadata of every tracked file.
	pub fn list_files(&self) -> Vec<FileInfo> {
		let files: Vec<_> = self.state.read().files.values().cloned().collect();
		files.iter().map(|file| file.info()).collect()
	}

	/// Returns a detached snapshot of a tracked file.
	pub fn get_detached_file(&self, uri: &Uri) -> Option<DetachedFile> {
		self.get_file(uri).map(|file| file.detach(self.loader.clone()))
	}

	/// Returns the on-disk content of a tracked file.
	///
	/// See [`CachedFile::saved_content`].
	pub fn get_saved_content(&self, uri: &Uri, force_read: bool) -> Result<Vec<u8>> {
		let file = self
			.get_file(uri)
			.ok_or_else(|| Error::FileNotFound(uri.as_str().to_string()))?;
		file.saved_content(self.loader.as_ref(), force_read)
	}

	/// Handles `textDocument/didOpen`.
	pub fn did_open(&self, params: &DidOpenTextDocumentParams) -> Result<()> {
		let _guard = self.span.enter();
		let doc = &params.text_document;
		if !crate::is_file_uri(&doc.uri) {
			debug!(uri = doc.uri.as_str(), "didOpen: ignoring non-file URI");
			return Ok(());
		}

		let file = self.get_or_create_default(&doc.uri);
		file.open(&doc.text, doc.version, &doc.language_id);
		debug!(
			uri = doc.uri.as_str(),
			version = doc.version,
			language = %doc.language_id,
			"didOpen"
		);
		Ok(())
	}

	/// Handles `textDocument/didChange`.
	///
	/// A lone rangeless change replaces the whole buffer and is accepted even
	/// for unknown or unopened files. Any other batch is merged incrementally
	/// and requires the file to be tracked already.
	pub fn did_change(&self, params: &DidChangeTextDocumentParams) -> Result<()> {
		let _guard = self.span.enter();
		let doc = &params.text_document;
		let res = self.apply_change(params);
		if let Err(err) = &res {
			warn!(
				uri = doc.uri.as_str(),
				version = doc.version,
				error = %err,
				"didChange rejected"
			);
		}
		res
	}

	fn apply_change(&self, params: &DidChangeTextDocumentParams) -> Result<()> {
		let doc = &params.text_document;
		if !crate::is_file_uri(&doc.uri) {
			debug!(uri = doc.uri.as_str(), "didChange: ignoring non-file URI");
			return Ok(());
		}

		let changes = &params.content_changes;
		if changes.is_empty() {
			return Err(Error::EmptyChanges);
		}

		if is_full_replace(changes) {
			let file = match self.get_file(&doc.uri) {
				Some(file) => {
					warn!(
						uri = doc.uri.as_str(),
						opened = file.is_opened(),
						"didChange: full content received although the file exists"
					);
					file
				}
				None => {
					warn!(
						uri = doc.uri.as_str(),
						"didChange: full content received for an unknown file"
					);
					self.get_or_create_default(&doc.uri)
				}
			};
			file.set_ide_content(&changes[0].text, doc.version);
			return Ok(());
		}

		let file = self
			.get_file(&doc.uri)
			.ok_or_else(|| Error::FileNotFound(doc.uri.as_str().to_string()))?;
		file.merge_changes(self.mapper.as_ref(), changes, doc.version)?;
		debug!(
			uri = doc.uri.as_str(),
			version = doc.version,
			changes = changes.len(),
			"didChange merged"
		);
		Ok(())
	}

	/// Handles `textDocument/didClose`. The file stays tracked.
	pub fn did_close(&self, params: &DidCloseTextDocumentParams) -> Result<()> {
		let _guard = self.span.enter();
		let uri = &params.text_document.uri;
		if !crate::is_file_uri(uri) {
			debug!(uri = uri.as_str(), "didClose: ignoring non-file URI");
			return Ok(());
		}

		self.get_or_create_default(uri).close();
		debug!(uri = uri.as_str(), "didClose");
		Ok(())
	}

	/// Handles `textDocument/didSave`. Any text payload is ignored.
	pub fn did_save(&self, params: &DidSaveTextDocumentParams) -> Result<()> {
		let _guard = self.span.enter();
		let uri = &params.text_document.uri;
		if !crate::is_file_uri(uri) {
			debug!(uri = uri.as_str(), "didSave: ignoring non-file URI");
			return Ok(());
		}

		self.get_or_create_default(uri).reset_saved_content();
		debug!(uri = uri.as_str(), "didSave");
		Ok(())
	}
}

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use lsp_types::{Position, Range};

use super::*;
use crate::Utf16Mapper;

struct CountingLoader {
	reads: AtomicUsize,
	content: &'static [u8],
}

impl CountingLoader {
	fn new(content: &'static [u8]) -> Self {
		Self {
			reads: AtomicUsize::new(0),
			content,
		}
	}

	fn reads(&self) -> usize {
		self.reads.load(Ordering::SeqCst)
	}
}

impl ContentLoader for CountingLoader {
	fn load(&self, _path: &Path) -> io::Result<Vec<u8>> {
		self.reads.fetch_add(1, Ordering::SeqCst);
		Ok(self.content.to_vec())
	}
}

struct FailingLoader;

impl ContentLoader for FailingLoader {
	fn load(&self, _path: &Path) -> io::Result<Vec<u8>> {
		Err(io::Error::new(io::ErrorKind::NotFound, "gone"))
	}
}

fn test_file() -> Arc<CachedFile> {
	Arc::new(CachedFile::new("file:///ws/a.txt".parse().unwrap()))
}

fn edit(start: u32, end: u32, text: &str) -> TextDocumentContentChangeEvent {
	TextDocumentContentChangeEvent {
		range: Some(Range {
			start: Position { line: 0, character: start },
			end: Position { line: 0, character: end },
		}),
		range_length: None,
		text: text.into(),
	}
}

fn full(text: &str) -> TextDocumentContentChangeEvent {
	TextDocumentContentChangeEvent {
		range: None,
		range_length: None,
		text: text.into(),
	}
}

fn content(file: &Arc<CachedFile>) -> Vec<u8> {
	file.detach(Arc::new(crate::DiskLoader)).into_content()
}

#[test]
fn test_edits_merge_left_to_right() {
	let file = test_file();
	file.open("abcdef", 1, "plaintext");

	file.merge_changes(&Utf16Mapper, &[edit(1, 3, "X"), edit(0, 1, "Y")], 2).unwrap();

	assert_eq!(content(&file), b"YXdef");
	assert_eq!(file.version(), 2);
}

#[test]
fn test_reversed_range_discards_whole_batch() {
	let file = test_file();
	file.open("abcdef", 1, "plaintext");

	let err = file.merge_changes(&Utf16Mapper, &[edit(0, 1, "Z"), edit(3, 1, "X")], 2).unwrap_err();

	assert!(matches!(err, Error::ReversedRange { index: 1, start: 3, end: 1 }));
	assert_eq!(err.kind(), crate::ErrorKind::Protocol);
	assert_eq!(content(&file), b"abcdef");
	assert_eq!(file.version(), 1);
}

#[test]
fn test_missing_range_in_batch_is_rejected() {
	let file = test_file();
	file.open("abc", 1, "");

	let err = file.merge_changes(&Utf16Mapper, &[edit(0, 0, "x"), full("abc")], 2).unwrap_err();

	assert!(matches!(err, Error::MissingRange { index: 1 }));
	assert_eq!(content(&file), b"abc");
}

#[test]
fn test_out_of_bounds_range_is_rejected() {
	let file = test_file();
	file.open("abc", 1, "");

	let err = file.merge_changes(&Utf16Mapper, &[edit(0, 9, "x")], 2).unwrap_err();

	assert!(matches!(err, Error::InvalidRange { index: 0, .. }));
	assert_eq!(content(&file), b"abc");
}

#[test]
fn test_empty_batch_is_rejected() {
	let file = test_file();
	file.open("abc", 1, "");

	let err = file.merge_changes(&Utf16Mapper, &[], 2).unwrap_err();
	assert!(matches!(err, Error::EmptyChanges));
}

#[test]
fn test_full_replace_detection() {
	assert!(is_full_replace(&[full("x")]));
	assert!(!is_full_replace(&[full("x"), full("y")]));
	assert!(!is_full_replace(&[edit(0, 0, "x")]));
	assert!(!is_full_replace(&[]));

	let mut with_length = full("x");
	with_length.range_length = Some(3);
	assert!(!is_full_replace(&[with_length]));
}

#[test]
fn test_close_keeps_version_and_saved_content() {
	let file = test_file();
	let loader = CountingLoader::new(b"on disk");
	file.open("abc", 4, "rust");
	file.saved_content(&loader, false).unwrap();

	file.close();

	assert!(!file.is_opened());
	assert_eq!(file.version(), 4);
	assert_eq!(file.language_id(), "rust");
	assert_eq!(file.saved_content(&loader, false).unwrap(), b"on disk");
	assert_eq!(loader.reads(), 1);

	file.open("abc", 5, "");
	assert!(file.is_opened());
	assert_eq!(file.language_id(), "rust");
}

#[test]
fn test_saved_content_is_cached_until_reset() {
	let file = test_file();
	let loader = CountingLoader::new(b"saved");

	file.reset_saved_content();
	assert_eq!(file.saved_content(&loader, false).unwrap(), b"saved");
	assert_eq!(loader.reads(), 1);
	assert_eq!(file.saved_content(&loader, false).unwrap(), b"saved");
	assert_eq!(loader.reads(), 1);

	file.saved_content(&loader, true).unwrap();
	assert_eq!(loader.reads(), 2);

	file.reset_saved_content();
	file.saved_content(&loader, false).unwrap();
	assert_eq!(loader.reads(), 3);
}

#[test]
fn test_saved_content_independent_of_editor_buffer() {
	let file = test_file();
	let loader = CountingLoader::new(b"disk");
	file.open("editor", 1, "");

	assert_eq!(file.saved_content(&loader, false).unwrap(), b"disk");
	assert_eq!(content(&file), b"editor");
}

#[test]
fn test_saved_content_read_failure_leaves_cache_unset() {
	let file = test_file();

	let err = file.saved_content(&FailingLoader, false).unwrap_err();
	assert!(matches!(err, Error::Io { .. }));
	assert_eq!(err.kind(), crate::ErrorKind::Io);

	let loader = CountingLoader::new(b"later");
	assert_eq!(file.saved_content(&loader, false).unwrap(), b"later");
	assert_eq!(loader.reads(), 1);
}

#[test]
fn test_saved_content_needs_a_local_path() {
	let file = Arc::new(CachedFile::new("untitled:Untitled-1".parse().unwrap()));
	let err = file.saved_content(&CountingLoader::new(b""), false).unwrap_err();
	assert!(matches!(err, Error::NotAFile(_)));
}

#[test]
fn test_detach_then_changed_since() {
	let file = test_file();
	file.open("abc", 1, "");

	let snapshot = file.detach(Arc::new(crate::DiskLoader));
	assert!(!file.changed_since(&snapshot));
	assert!(!snapshot.is_stale());

	file.merge_changes(&Utf16Mapper, &[edit(3, 3, "d")], 2).unwrap();
	assert!(file.changed_since(&snapshot));
	assert!(snapshot.is_stale());
	assert_eq!(snapshot.content(), b"abc");
}

#[test]
fn test_detach_unopened_is_empty() {
	let file = test_file();
	let snapshot = file.detach(Arc::new(crate::DiskLoader));
	assert!(!snapshot.was_opened());
	assert!(snapshot.content().is_empty());
	assert_eq!(snapshot.version(), 0);
}

#[test]
fn test_path_is_derived_once() {
	let file = test_file();
	assert_eq!(file.path(), Some(Path::new("/ws/a.txt")));

	let file =
		CachedFile::with_path("file:///ws/b.txt".parse().unwrap(), "/elsewhere/b.txt".into());
	assert_eq!(file.path(), Some(Path::new("/elsewhere/b.txt")));
}

#[test]
fn test_detach_keeps_known_path() {
	let file = Arc::new(CachedFile::with_path(
		"file:///ws/b.txt".parse().unwrap(),
		"workspace/b.txt".into(),
	));
	let snapshot = file.detach(Arc::new(crate::DiskLoader));
	assert_eq!(snapshot.path(), Some(Path::new("workspace/b.txt")));
	assert_eq!(snapshot.path(), file.info().path.as_deref());
}

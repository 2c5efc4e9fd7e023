//! Reading saved file content from disk.

use std::io;
use std::path::Path;

/// Source of on-disk file content.
///
/// The cache calls this with the file's lock held; implementations must not
/// call back into the cache.
pub trait ContentLoader: Send + Sync {
	/// Reads the full content of `path`.
	fn load(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Loader that reads straight from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskLoader;

impl ContentLoader for DiskLoader {
	fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
		std::fs::read(path)
	}
}

//! Error types for the document cache.

use std::io;
use std::path::PathBuf;

use crate::position::PositionError;

/// A convenient type alias for `Result` with `E` = [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors reported by cache operations.
///
/// Every error is returned to the immediate caller. Nothing is committed to a
/// file when an operation fails.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The notification payload is malformed.
	#[error("invalid request: {0}")]
	InvalidRequest(String),
	/// A change notification carried no content changes.
	#[error("didChange: no content changes provided")]
	EmptyChanges,
	/// A change in a batch is missing its range.
	#[error("didChange: unexpected missing range for change {index}")]
	MissingRange {
		/// Position of the offending change in the batch.
		index: usize,
	},
	/// A change range resolves to an end offset before its start offset.
	#[error("didChange: invalid range for change {index} ({start}..{end})")]
	ReversedRange {
		/// Position of the offending change in the batch.
		index: usize,
		/// Resolved start byte offset.
		start: usize,
		/// Resolved end byte offset.
		end: usize,
	},
	/// A mapper resolved a change past the end of the content.
	#[error("didChange: change {index} ends at byte {end}, past content length {len}")]
	SpanOutOfBounds {
		/// Position of the offending change in the batch.
		index: usize,
		/// Resolved offset past the end.
		end: usize,
		/// Content length in bytes.
		len: usize,
	},
	/// A change range could not be mapped onto the current content.
	#[error("didChange: change {index}: {source}")]
	InvalidRange {
		/// Position of the offending change in the batch.
		index: usize,
		/// Mapper failure.
		#[source]
		source: PositionError,
	},
	/// An incremental change targets a file that is not tracked.
	#[error("file not found: {0}")]
	FileNotFound(String),
	/// The URI does not name a local file.
	#[error("not a local file: {0}")]
	NotAFile(String),
	/// The live file behind a detached snapshot is no longer tracked.
	#[error("file is no longer tracked: {0}")]
	Detached(String),
	/// Reading saved content from disk failed.
	#[error("failed to read {}: {source}", path.display())]
	Io {
		/// The file that failed to read.
		path: PathBuf,
		/// Underlying error.
		#[source]
		source: io::Error,
	},
}

/// Broad classification of an [`enum@Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Malformed payload. Nothing was mutated.
	InvalidRequest,
	/// The peer violated the change protocol. Nothing was committed.
	Protocol,
	/// The request contradicts cache state, e.g. editing an unknown file.
	Consistency,
	/// A disk read failed. Only the caller is affected.
	Io,
}

impl Error {
	/// Returns the classification of this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::InvalidRequest(_) | Self::NotAFile(_) => ErrorKind::InvalidRequest,
			Self::EmptyChanges
			| Self::MissingRange { .. }
			| Self::ReversedRange { .. }
			| Self::SpanOutOfBounds { .. }
			| Self::InvalidRange { .. } => ErrorKind::Protocol,
			Self::FileNotFound(_) | Self::Detached(_) => ErrorKind::Consistency,
			Self::Io { .. } => ErrorKind::Io,
		}
	}
}

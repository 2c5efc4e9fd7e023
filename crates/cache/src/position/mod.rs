//! Conversion of LSP ranges to byte spans.
//!
//! LSP positions are a zero-based line plus a column counted in UTF-16 code
//! units. The cache stores content as bytes, so every incremental change is
//! resolved to a [`ByteSpan`] before it is spliced in.

use lsp_types::{Position, Range};
use ropey::Rope;

/// A half-open byte range `start..end`.
///
/// Not normalized: a mapper reports `end < start` as-is and leaves rejection
/// to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
	/// Byte offset of the first byte.
	pub start: usize,
	/// Byte offset one past the last byte.
	pub end: usize,
}

impl ByteSpan {
	/// Returns `true` if the span ends before it starts.
	pub fn is_reversed(&self) -> bool {
		self.end < self.start
	}
}

/// Failure to resolve a position against some content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
	/// The line is past the last line of the content.
	#[error("line {line} is out of bounds ({line_count} lines)")]
	LineOutOfBounds {
		/// Requested line.
		line: u32,
		/// Number of lines in the content.
		line_count: usize,
	},
	/// The column is past the end of its line.
	#[error("column {character} is beyond end of line {line} ({len} UTF-16 units)")]
	ColumnOutOfBounds {
		/// Requested line.
		line: u32,
		/// Requested UTF-16 column.
		character: u32,
		/// Line length in UTF-16 code units, terminator excluded.
		len: usize,
	},
	/// The column points between the two halves of a surrogate pair.
	#[error("column {character} on line {line} splits a surrogate pair")]
	SplitSurrogate {
		/// Requested line.
		line: u32,
		/// Requested UTF-16 column.
		character: u32,
	},
	/// The content is not valid UTF-8.
	#[error("content is not valid UTF-8")]
	InvalidUtf8,
}

/// Resolves LSP ranges to byte spans.
pub trait PositionMapper: Send + Sync {
	/// Converts `range` into byte offsets within `content`.
	fn range_to_byte_span(&self, content: &[u8], range: Range) -> Result<ByteSpan, PositionError>;
}

/// Default mapper for UTF-16 columns, the LSP default position encoding.
///
/// Lines end at `\n`, `\r\n` or `\r`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf16Mapper;

impl PositionMapper for Utf16Mapper {
	fn range_to_byte_span(&self, content: &[u8], range: Range) -> Result<ByteSpan, PositionError> {
		let text = std::str::from_utf8(content).map_err(|_| PositionError::InvalidUtf8)?;
		let rope = Rope::from_str(text);
		Ok(ByteSpan {
			start: position_to_byte(&rope, range.start)?,
			end: position_to_byte(&rope, range.end)?,
		})
	}
}

/// Converts one LSP position into a byte offset of `rope`.
pub fn position_to_byte(rope: &Rope, pos: Position) -> Result<usize, PositionError> {
	let line_idx = pos.line as usize;
	if line_idx >= rope.len_lines() {
		return Err(PositionError::LineOutOfBounds {
			line: pos.line,
			line_count: rope.len_lines(),
		});
	}

	let line = rope.line(line_idx);
	let mut text_chars = line.len_chars();
	if text_chars > 0 && line.char(text_chars - 1) == '\n' {
		text_chars -= 1;
	}
	if text_chars > 0 && line.char(text_chars - 1) == '\r' {
		text_chars -= 1;
	}
	let text = line.slice(..text_chars);

	let col = pos.character as usize;
	let len = text.len_utf16_cu();
	if col > len {
		return Err(PositionError::ColumnOutOfBounds {
			line: pos.line,
			character: pos.character,
			len,
		});
	}

	let char_in_line = text.utf16_cu_to_char(col);
	if text.char_to_utf16_cu(char_in_line) != col {
		return Err(PositionError::SplitSurrogate {
			line: pos.line,
			character: pos.character,
		});
	}

	Ok(rope.char_to_byte(rope.line_to_char(line_idx) + char_in_line))
}

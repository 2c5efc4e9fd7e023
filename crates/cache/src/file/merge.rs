use lsp_types::TextDocumentContentChangeEvent;

use crate::{Error, PositionMapper, Result};

/// Returns `true` if the batch is a single rangeless change carrying the whole
/// document text.
pub(crate) fn is_full_replace(changes: &[TextDocumentContentChangeEvent]) -> bool {
	match changes {
		[change] => change.range.is_none() && change.range_length.unwrap_or(0) == 0,
		_ => false,
	}
}

/// Applies `changes` in order to a copy of `base`.
///
/// Every change is resolved against the output of the previous one, never
/// against `base`. `base` itself is never touched, so a failure part way
/// through leaves the caller's content as it was.
pub(crate) fn merge_changes(
	mapper: &dyn PositionMapper,
	base: &[u8],
	changes: &[TextDocumentContentChangeEvent],
) -> Result<Vec<u8>> {
	if changes.is_empty() {
		return Err(Error::EmptyChanges);
	}

	let mut content = base.to_vec();
	for (index, change) in changes.iter().enumerate() {
		let range = change.range.ok_or(Error::MissingRange { index })?;
		let span = mapper
			.range_to_byte_span(&content, range)
			.map_err(|source| Error::InvalidRange { index, source })?;
		if span.start.max(span.end) > content.len() {
			return Err(Error::SpanOutOfBounds {
				index,
				end: span.start.max(span.end),
				len: content.len(),
			});
		}
		if span.is_reversed() {
			return Err(Error::ReversedRange {
				index,
				start: span.start,
				end: span.end,
			});
		}

		let removed = span.end - span.start;
		let mut next = Vec::with_capacity(content.len() - removed + change.text.len());
		next.extend_from_slice(&content[..span.start]);
		next.extend_from_slice(change.text.as_bytes());
		next.extend_from_slice(&content[span.end..]);
		content = next;
	}

	Ok(content)
}

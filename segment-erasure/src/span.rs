use crate::errors::*;
use std::ops::Range;

/// Location of one segment inside a flat backing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
	pub offset: usize,
	pub len: usize,
}

impl Span {
	pub fn range(&self) -> Range<usize> {
		self.offset..self.offset.saturating_add(self.len)
	}
}

/// `count` back to back segments of `segment_size` bytes each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLayout {
	count: usize,
	segment_size: usize,
}

impl SegmentLayout {
	/// Fails if `count * segment_size` does not fit a `usize`.
	pub fn new(count: usize, segment_size: usize) -> std::result::Result<Self, PreconditionViolation> {
		if count.checked_mul(segment_size).is_none() {
			return Err(PreconditionViolation::SegmentSizeOverflow { count, segment_size });
		}
		Ok(Self::new_unchecked(count, segment_size))
	}

	/// The caller guarantees `count * segment_size` fits a `usize`.
	pub(crate) const fn new_unchecked(count: usize, segment_size: usize) -> Self {
		Self { count, segment_size }
	}

	pub fn count(&self) -> usize {
		self.count
	}

	pub fn segment_size(&self) -> usize {
		self.segment_size
	}

	/// Bytes the backing buffer must have.
	pub fn byte_len(&self) -> usize {
		self.count * self.segment_size
	}

	/// Span of segment `idx`.
	///
	/// Only meaningful for `idx < count`, bounds are established by `validate`.
	pub fn span(&self, idx: usize) -> Span {
		debug_assert!(idx < self.count);
		Span { offset: idx * self.segment_size, len: self.segment_size }
	}

	pub fn spans(&self) -> impl Iterator<Item = Span> + '_ {
		(0..self.count).map(move |idx| self.span(idx))
	}

	/// Make sure a buffer of `buffer_len` bytes holds exactly this layout.
	pub fn validate(&self, buffer_len: usize) -> std::result::Result<(), PreconditionViolation> {
		let want = self.byte_len();
		if buffer_len != want {
			return Err(PreconditionViolation::DataLengthMismatch { have: buffer_len, want });
		}
		Ok(())
	}

	/// Read only views of all segments, in index order.
	pub fn segments<'a>(&self, buffer: &'a [u8]) -> Result<Vec<&'a [u8]>> {
		self.validate(buffer.len())?;
		Ok(self.spans().map(|span| &buffer[span.range()]).collect())
	}

	/// Mutable views of all segments, in index order.
	pub fn segments_mut<'a>(&self, buffer: &'a mut [u8]) -> Result<Vec<&'a mut [u8]>> {
		self.validate(buffer.len())?;
		Ok(buffer.chunks_exact_mut(self.segment_size).collect())
	}
}

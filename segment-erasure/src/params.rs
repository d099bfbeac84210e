use crate::errors::*;
use crate::span::SegmentLayout;

/// Erasure coding parameters of one coded block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeParams {
	/// number of original data segments
	k: usize,
	/// number of parity segments
	m: usize,
	/// bytes per segment, identical for data and parity
	segment_size: usize,
}

impl CodeParams {
	/// Validate and create a new set of coding parameters.
	///
	/// Every index in `0..k + m` must fit into the single byte row identifier
	/// of the engine, hence `k + m <= 255`.
	pub fn new(k: usize, m: usize, segment_size: usize) -> Result<Self> {
		if k == 0 {
			return Err(PreconditionViolation::NoDataSegments.into());
		}
		if m == 0 {
			return Err(PreconditionViolation::NoParitySegments.into());
		}
		if k.saturating_add(m) > MAX_TOTAL_SEGMENTS {
			return Err(PreconditionViolation::TooManySegments { k, m, max: MAX_TOTAL_SEGMENTS }.into());
		}
		if segment_size == 0 {
			return Err(PreconditionViolation::SegmentSizeIsZero.into());
		}
		// all derived byte sizes stay representable from here on
		SegmentLayout::new(k, segment_size)?;
		SegmentLayout::new(m, segment_size)?;
		Ok(Self { k, m, segment_size })
	}

	pub fn k(&self) -> usize {
		self.k
	}

	pub fn m(&self) -> usize {
		self.m
	}

	pub fn segment_size(&self) -> usize {
		self.segment_size
	}

	/// Number of segments in the full codeword, `k + m`.
	pub fn total(&self) -> usize {
		self.k + self.m
	}

	/// Size of the original data block in bytes.
	pub fn data_len(&self) -> usize {
		self.k * self.segment_size
	}

	/// Size of the parity output in bytes.
	pub fn parity_len(&self) -> usize {
		self.m * self.segment_size
	}

	pub fn is_data_index(&self, index: u8) -> bool {
		(index as usize) < self.k
	}

	pub(crate) fn data_layout(&self) -> SegmentLayout {
		SegmentLayout::new_unchecked(self.k, self.segment_size)
	}

	pub(crate) fn parity_layout(&self) -> SegmentLayout {
		SegmentLayout::new_unchecked(self.m, self.segment_size)
	}

	/// Check a survivor index set: exactly `k` entries, pairwise distinct, each below `k + m`.
	pub(crate) fn validate_survivor_indices(&self, indices: &[u8]) -> Result<()> {
		if indices.len() != self.k {
			return Err(PreconditionViolation::SurvivorCountMismatch { have: indices.len(), want: self.k }.into());
		}

		let total = self.total();
		let mut seen = [false; 256];
		for &index in indices {
			if index as usize >= total {
				return Err(PreconditionViolation::IndexOutOfRange { index, total }.into());
			}
			if std::mem::replace(&mut seen[index as usize], true) {
				return Err(PreconditionViolation::DuplicateIndex { index }.into());
			}
		}
		Ok(())
	}
}

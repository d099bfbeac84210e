use crate::engine::ErasureEngine;
use crate::errors::*;
use crate::params::CodeParams;
use crate::{encode_ring_with, rebuild_with, Segment};

/// Padding rules for deriving a segment size from a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorLimits {
	/// segment sizes are rounded up to a multiple of this
	pub alignment: usize,
	pub max_segment_size: usize,
}

impl Default for SectorLimits {
	fn default() -> Self {
		Self { alignment: 64, max_segment_size: 1 << 20 }
	}
}

/// A payload of arbitrary length, zero padded to a whole number of segments for coding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sector {
	data: Vec<u8>,
}

impl Sector {
	pub fn new(data: Vec<u8>) -> Result<Self> {
		if data.is_empty() {
			return Err(PreconditionViolation::PayloadSizeIsZero.into());
		}
		Ok(Self { data })
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn data(&self) -> &[u8] {
		&self.data
	}

	pub fn into_inner(self) -> Vec<u8> {
		self.data
	}

	/// Smallest aligned segment size fitting the payload into `k` segments.
	pub fn segment_size(&self, k: usize, limits: &SectorLimits) -> Result<usize> {
		if k == 0 {
			return Err(PreconditionViolation::NoDataSegments.into());
		}
		let alignment = limits.alignment.max(1);
		let max = limits.max_segment_size;
		let segment_size = self
			.data
			.len()
			.div_ceil(k)
			.div_ceil(alignment)
			.checked_mul(alignment)
			.ok_or(PreconditionViolation::SegmentTooLarge { want: usize::MAX, max })?;
		if segment_size > max {
			return Err(PreconditionViolation::SegmentTooLarge { want: segment_size, max }.into());
		}
		Ok(segment_size)
	}

	/// Derive coding parameters for `k` data and `m` parity segments.
	pub fn code_params(&self, k: usize, m: usize, limits: &SectorLimits) -> Result<CodeParams> {
		CodeParams::new(k, m, self.segment_size(k, limits)?)
	}

	/// Pad the payload to `k * segment_size` and encode the full ring of `k + m` segments.
	pub fn encode_with<E: ErasureEngine>(&self, engine: &E, params: &CodeParams) -> Result<Vec<Segment>> {
		if self.data.len() > params.data_len() {
			return Err(PreconditionViolation::DataLengthMismatch { have: self.data.len(), want: params.data_len() }.into());
		}
		let mut padded = Vec::with_capacity(params.data_len());
		padded.extend_from_slice(&self.data);
		padded.resize(params.data_len(), 0);
		encode_ring_with(engine, params, &padded)
	}

	/// Rebuild a sector of `length` bytes from its segments, dropping the padding.
	pub fn rebuild_with<E: ErasureEngine>(
		engine: &E,
		params: &CodeParams,
		length: usize,
		segments: &[Segment],
	) -> Result<Self> {
		if length > params.data_len() {
			return Err(PreconditionViolation::DataLengthMismatch { have: length, want: params.data_len() }.into());
		}
		let mut data = rebuild_with(engine, params, segments)?;
		data.truncate(length);
		Self::new(data)
	}
}

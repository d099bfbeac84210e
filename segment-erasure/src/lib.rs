//! Parity generation and in-place recovery for a data block cut into fixed-size segments.
//!
//! A block of `k * segment_size` bytes is split into `k` data segments and
//! `m` parity segments are derived from them. Any `k` of the `k + m` segments,
//! tagged with their index, suffice to restore the block. The Galois field
//! work is done by an [`ErasureEngine`], this crate validates, packs and
//! brings the recovered segments back into index order.

pub mod engine;
pub mod errors;
pub mod params;
pub mod sector;
pub mod sort;
pub mod span;

mod encode;
mod recover;

pub use encode::{encode_ring_with, encode_with};
pub use engine::{Block, EngineError, ErasureEngine, GaloisEngine};
pub use errors::*;
pub use params::CodeParams;
pub use recover::{rebuild_with, recover_with};
pub use sector::{Sector, SectorLimits};
pub use sort::{sort_blocks, sort_segments};
pub use span::{SegmentLayout, Span};

/// One segment of a coded ring together with its index in `0..k + m`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
	pub index: u8,
	pub data: Vec<u8>,
}

impl Segment {
	pub fn new(index: u8, data: Vec<u8>) -> Self {
		Self { index, data }
	}

	pub fn is_parity(&self, params: &CodeParams) -> bool {
		!params.is_data_index(self.index)
	}
}

impl AsRef<[u8]> for Segment {
	fn as_ref(&self) -> &[u8] {
		&self.data
	}
}

/// Coding parameters bound to an engine.
#[derive(Debug, Clone)]
pub struct SegmentCoder<E = GaloisEngine> {
	params: CodeParams,
	engine: E,
}

impl SegmentCoder<GaloisEngine> {
	pub fn new(params: CodeParams) -> Self {
		Self::with_engine(params, GaloisEngine::new())
	}
}

impl<E: ErasureEngine> SegmentCoder<E> {
	pub fn with_engine(params: CodeParams, engine: E) -> Self {
		Self { params, engine }
	}

	pub fn params(&self) -> &CodeParams {
		&self.params
	}

	pub fn engine(&self) -> &E {
		&self.engine
	}

	/// See [`encode_with`].
	pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
		encode_with(&self.engine, &self.params, data)
	}

	/// See [`encode_ring_with`].
	pub fn encode_ring(&self, data: &[u8]) -> Result<Vec<Segment>> {
		encode_ring_with(&self.engine, &self.params, data)
	}

	/// See [`recover_with`].
	pub fn recover(&self, survivors: &mut [u8], indices: &[u8]) -> Result<()> {
		recover_with(&self.engine, &self.params, survivors, indices)
	}

	/// See [`rebuild_with`].
	pub fn rebuild(&self, segments: &[Segment]) -> Result<Vec<u8>> {
		rebuild_with(&self.engine, &self.params, segments)
	}
}

/// Compute the `m` parity segments of a `k * segment_size` byte block.
pub fn encode(k: usize, m: usize, segment_size: usize, data: &[u8]) -> Result<Vec<u8>> {
	let params = CodeParams::new(k, m, segment_size)?;
	encode_with(&GaloisEngine::new(), &params, data)
}

/// Encode a block into all `k + m` segments, data first.
pub fn encode_ring(k: usize, m: usize, segment_size: usize, data: &[u8]) -> Result<Vec<Segment>> {
	let params = CodeParams::new(k, m, segment_size)?;
	encode_ring_with(&GaloisEngine::new(), &params, data)
}

/// Turn `k` survivors into the original block, in place.
pub fn recover(k: usize, m: usize, segment_size: usize, survivors: &mut [u8], indices: &[u8]) -> Result<()> {
	let params = CodeParams::new(k, m, segment_size)?;
	recover_with(&GaloisEngine::new(), &params, survivors, indices)
}

/// Rebuild the original block from owned segments.
pub fn rebuild(k: usize, m: usize, segment_size: usize, segments: &[Segment]) -> Result<Vec<u8>> {
	let params = CodeParams::new(k, m, segment_size)?;
	rebuild_with(&GaloisEngine::new(), &params, segments)
}

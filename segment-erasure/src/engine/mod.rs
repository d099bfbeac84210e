//! Boundary to the erasure engine doing the actual Galois field work.
//!
//! The engine is driven with flat segment views and single byte row
//! identifiers. Everything around it, validation, packing and the
//! post-decode reordering, lives in this crate.

mod galois;

pub use galois::GaloisEngine;

/// A segment handed to the decoder, tagged with its row in the `0..k + m` codeword.
#[derive(Debug)]
pub struct Block<'a> {
	pub row: u8,
	pub data: &'a mut [u8],
}

impl<'a> Block<'a> {
	pub fn new(row: u8, data: &'a mut [u8]) -> Self {
		Self { row, data }
	}
}

#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
	#[error("Engine self check failed: {0}")]
	SelfCheck(&'static str),

	#[error(transparent)]
	Backend(#[from] reed_solomon_erasure::Error),

	#[error("Decoded rows {rows:?} do not cover data segments 0..{k}")]
	RowsNotRecovered { rows: Vec<u8>, k: usize },
}

/// Primitives of an erasure engine.
///
/// `init` must succeed before `encode` or `decode` are called, implementations
/// make repeated calls cheap. Callers validate all parameters beforehand, an
/// engine may assume `k + m <= 255`, `inputs.len() == k`, `entries.len() == k`
/// and that every block is `block_len` bytes.
pub trait ErasureEngine {
	fn init(&self) -> Result<(), EngineError>;

	/// Compute `m` parity blocks into `output` (`m * block_len` bytes) from the `k` data blocks.
	fn encode(&self, k: usize, m: usize, inputs: &[&[u8]], output: &mut [u8], block_len: usize)
		-> Result<(), EngineError>;

	/// Rewrite the `k` blocks in place so that each holds the original data segment
	/// named by its (possibly rewritten) `row`.
	///
	/// The entries keep their position, only their content and row change.
	fn decode(&self, k: usize, m: usize, entries: &mut [Block<'_>], block_len: usize) -> Result<(), EngineError>;
}

impl<E: ErasureEngine + ?Sized> ErasureEngine for &E {
	fn init(&self) -> Result<(), EngineError> {
		(**self).init()
	}

	fn encode(
		&self,
		k: usize,
		m: usize,
		inputs: &[&[u8]],
		output: &mut [u8],
		block_len: usize,
	) -> Result<(), EngineError> {
		(**self).encode(k, m, inputs, output, block_len)
	}

	fn decode(&self, k: usize, m: usize, entries: &mut [Block<'_>], block_len: usize) -> Result<(), EngineError> {
		(**self).decode(k, m, entries, block_len)
	}
}

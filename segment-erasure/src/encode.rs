use tracing::debug;

use crate::engine::ErasureEngine;
use crate::errors::*;
use crate::params::CodeParams;
use crate::Segment;

/// Compute the `m` parity segments of `data`.
///
/// `data` must be exactly `k * segment_size` bytes and is only read. The
/// returned buffer holds the parity segments for indices `k..k + m`, back to back.
pub fn encode_with<E: ErasureEngine>(engine: &E, params: &CodeParams, data: &[u8]) -> Result<Vec<u8>> {
	let inputs = params.data_layout().segments(data)?;

	let mut parity = vec![0_u8; params.parity_len()];

	engine.init().map_err(Error::EngineInit)?;
	engine
		.encode(params.k(), params.m(), &inputs[..], &mut parity[..], params.segment_size())
		.map_err(|source| Error::EngineOperation {
			op: Operation::Encode,
			k: params.k(),
			m: params.m(),
			segment_size: params.segment_size(),
			source,
		})?;

	debug!(k = params.k(), m = params.m(), segment_size = params.segment_size(), "encoded parity segments");
	Ok(parity)
}

/// Encode `data` into the full ring of `k + m` segments.
///
/// The first `k` segments are the original data split up, the remaining `m` are parity.
pub fn encode_ring_with<E: ErasureEngine>(engine: &E, params: &CodeParams, data: &[u8]) -> Result<Vec<Segment>> {
	let parity = encode_with(engine, params, data)?;

	let data_segments = params.data_layout().segments(data)?;
	let parity_segments = params.parity_layout().segments(&parity)?;

	let ring = data_segments
		.into_iter()
		.chain(parity_segments)
		.enumerate()
		.map(|(index, bytes)| Segment::new(index as u8, bytes.to_vec()))
		.collect();
	Ok(ring)
}

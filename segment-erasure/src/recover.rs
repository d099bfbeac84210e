use tracing::debug;

use crate::engine::{Block, EngineError, ErasureEngine};
use crate::errors::*;
use crate::params::CodeParams;
use crate::sort::sort_blocks;
use crate::Segment;

/// Restore the original data block in place from exactly `k` survivors.
///
/// `survivors` holds `k` segments back to back, `indices[i]` is the position
/// segment `i` had in the `0..k + m` codeword. On success `survivors` is the
/// original data block, segment `i` being data segment `i`. After an error the
/// content of `survivors` is unspecified.
pub fn recover_with<E: ErasureEngine>(
	engine: &E,
	params: &CodeParams,
	survivors: &mut [u8],
	indices: &[u8],
) -> Result<()> {
	params.validate_survivor_indices(indices)?;

	let layout = params.data_layout();
	if survivors.len() != layout.byte_len() {
		return Err(PreconditionViolation::SurvivorLengthMismatch { have: survivors.len(), want: layout.byte_len() }.into());
	}

	let (k, m, segment_size) = (params.k(), params.m(), params.segment_size());
	let decode_error = |source: EngineError| Error::EngineOperation { op: Operation::Decode, k, m, segment_size, source };

	let mut entries = indices
		.iter()
		.zip(layout.segments_mut(survivors)?)
		.map(|(&row, data)| Block::new(row, data))
		.collect::<Vec<_>>();

	engine.init().map_err(Error::EngineInit)?;
	engine.decode(k, m, &mut entries[..], segment_size).map_err(decode_error)?;

	let swaps = sort_blocks(&mut entries[..]);

	// the engine must have turned the rows into exactly `0..k`
	if entries.iter().enumerate().any(|(position, entry)| entry.row as usize != position) {
		let rows = entries.iter().map(|entry| entry.row).collect();
		return Err(decode_error(EngineError::RowsNotRecovered { rows, k }));
	}

	debug!(
		k,
		m,
		segment_size,
		parity_used = indices.iter().filter(|&&index| !params.is_data_index(index)).count(),
		swaps,
		"recovered data block"
	);
	Ok(())
}

/// Rebuild the original data block from owned segments.
///
/// The first `k` segments are used, they must carry distinct indices from the
/// `0..k + m` codeword and be `segment_size` bytes each.
pub fn rebuild_with<E: ErasureEngine>(engine: &E, params: &CodeParams, segments: &[Segment]) -> Result<Vec<u8>> {
	let k = params.k();
	if segments.len() < k {
		return Err(PreconditionViolation::SurvivorCountMismatch { have: segments.len(), want: k }.into());
	}
	let segments = &segments[..k];

	let mut survivors = Vec::with_capacity(params.data_len());
	let mut indices = Vec::with_capacity(k);
	for (position, segment) in segments.iter().enumerate() {
		if segment.data.len() != params.segment_size() {
			return Err(PreconditionViolation::SegmentLengthMismatch {
				position,
				have: segment.data.len(),
				want: params.segment_size(),
			}
			.into());
		}
		survivors.extend_from_slice(&segment.data);
		indices.push(segment.index);
	}

	recover_with(engine, params, &mut survivors[..], &indices[..])?;
	Ok(survivors)
}

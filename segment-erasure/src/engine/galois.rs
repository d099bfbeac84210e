use reed_solomon_erasure::galois_8::ReedSolomon;
use static_init::dynamic;
use tracing::{debug, trace};

use super::*;

/// Outcome of the one time engine self check, evaluated on first access.
#[dynamic(lazy)]
static SELF_CHECK: Result<(), EngineError> = self_check();

/// Recover a fixed codeword with two lost data segments and compare.
fn self_check() -> Result<(), EngineError> {
	const K: usize = 3;
	const M: usize = 2;
	const LEN: usize = 4;

	let data: [[u8; LEN]; K] = [[0x01, 0x02, 0x03, 0x04], [0x10, 0x20, 0x30, 0x40], [0xA5, 0x5A, 0xFF, 0x00]];

	let rs = ReedSolomon::new(K, M)?;
	let mut parity = [[0_u8; LEN]; M];
	rs.encode_sep(&data[..], &mut parity[..])?;

	if parity.iter().all(|p| p.iter().all(|&b| b == 0)) {
		return Err(EngineError::SelfCheck("parity of non-zero data is all zero"));
	}

	let mut shards = data.iter().chain(parity.iter()).map(|s| Some(s.to_vec())).collect::<Vec<_>>();
	shards[0] = None;
	shards[2] = None;
	rs.reconstruct_data(&mut shards)?;

	let restored = shards.iter().take(K).zip(data.iter()).all(|(shard, original)| {
		shard.as_deref() == Some(&original[..])
	});
	if !restored {
		return Err(EngineError::SelfCheck("reconstructed data differs from the original"));
	}

	debug!(k = K, m = M, "erasure engine self check passed");
	Ok(())
}

/// Erasure engine over GF(2^8), backed by `reed-solomon-erasure`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GaloisEngine;

impl GaloisEngine {
	pub const fn new() -> Self {
		Self
	}
}

impl ErasureEngine for GaloisEngine {
	fn init(&self) -> Result<(), EngineError> {
		(*SELF_CHECK).clone()
	}

	fn encode(
		&self,
		k: usize,
		m: usize,
		inputs: &[&[u8]],
		output: &mut [u8],
		block_len: usize,
	) -> Result<(), EngineError> {
		let rs = ReedSolomon::new(k, m)?;
		let mut parity = output.chunks_exact_mut(block_len).collect::<Vec<_>>();
		rs.encode_sep(inputs, &mut parity[..])?;
		Ok(())
	}

	fn decode(&self, k: usize, m: usize, entries: &mut [Block<'_>], block_len: usize) -> Result<(), EngineError> {
		let rs = ReedSolomon::new(k, m)?;

		let mut present = vec![false; k];
		let mut shards: Vec<Option<Vec<u8>>> = vec![None; k + m];
		for entry in entries.iter() {
			let row = entry.row as usize;
			let slot = shards.get_mut(row).ok_or(reed_solomon_erasure::Error::InvalidIndex)?;
			*slot = Some(entry.data.to_vec());
			if row < k {
				present[row] = true;
			}
		}

		rs.reconstruct_data(&mut shards)?;

		// parity entries take over the data rows that were lost, lowest row first
		let mut lost = (0..k).filter(|&row| !present[row]);
		let mut recovered = 0_usize;
		for entry in entries.iter_mut().filter(|entry| entry.row as usize >= k) {
			let Some(row) = lost.next() else { break };
			let restored = shards[row].as_deref().filter(|shard| shard.len() == block_len).ok_or_else(|| {
				EngineError::RowsNotRecovered { rows: vec![row as u8], k }
			})?;
			entry.data.copy_from_slice(restored);
			entry.row = row as u8;
			recovered += 1;
		}

		trace!(k, m, block_len, recovered, "decoded survivors in place");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;

	#[test]
	fn init_is_idempotent() {
		let engine = GaloisEngine::new();
		assert_matches!(engine.init(), Ok(()));
		assert_matches!(engine.init(), Ok(()));
	}

	#[test]
	fn decode_rewrites_rows_of_parity_entries() {
		let engine = GaloisEngine::new();
		engine.init().unwrap();

		let data = [[7_u8; 3], [8; 3]];
		let mut parity = [0_u8; 9];
		engine.encode(2, 3, &[&data[0][..], &data[1][..]], &mut parity, 3).unwrap();

		let (p0, rest) = parity.split_at_mut(3);
		let p2 = &mut rest[3..];
		let mut entries = [Block::new(4, p2), Block::new(2, p0)];
		engine.decode(2, 3, &mut entries, 3).unwrap();

		// arrival order is kept, rows name what each block now holds
		assert_eq!(entries[0].row, 0);
		assert_eq!(entries[0].data, &data[0][..]);
		assert_eq!(entries[1].row, 1);
		assert_eq!(entries[1].data, &data[1][..]);
	}

	#[test]
	fn backend_rejects_oversized_codeword() {
		let engine = GaloisEngine::new();
		let mut output = [0_u8; 300];
		let inputs = vec![&[0_u8][..]; 100];
		assert_matches!(
			engine.encode(100, 300, &inputs, &mut output, 1),
			Err(EngineError::Backend(reed_solomon_erasure::Error::TooManyShards))
		);
	}
}

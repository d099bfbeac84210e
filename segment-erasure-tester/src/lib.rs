use rand::prelude::*;
use rand::seq::index::IndexVec;

use segment_erasure::{CodeParams, Segment};

pub static SMALL_RNG_SEED: [u8; 32] = [
	0, 6, 0xFA, 0, 0x37, 3, 19, 89, 32, 032, 0x37, 0x77, 77, 0b11, 112, 52, 12, 40, 82, 34, 0, 0, 0, 1, 4, 4, 1, 4, 99,
	127, 121, 107,
];

/// Demo test data, generated via `build.rs`.
pub const BYTES: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/rand_data.bin"));

/// Shared data segment count for simple, quick turnaround tests.
pub const K: usize = 10;
/// Shared parity segment count for simple, quick turnaround tests.
pub const M: usize = 6;
/// Shared segment size for simple, quick turnaround tests.
pub const SEGMENT_SIZE: usize = 1024;

/// Signature shared by all segment dropping strategies.
///
/// Receives the full ring as `Some`s and returns the indices it set to `None`.
pub type DropFn<R> = fn(&mut [Option<Segment>], usize, usize, &mut R) -> IndexVec;

/// Drop half of the `m` segments at the beginning, and the other half at the end.
pub fn deterministic_drop_segments<T: Sized, G: rand::Rng>(
	ring: &mut [Option<T>],
	k: usize,
	m: usize,
	_rng: &mut G,
) -> IndexVec {
	let n = k + m;
	assert_eq!(ring.len(), n);
	let head = m / 2;
	let mut v = Vec::with_capacity(m);
	for i in (0..head).chain(n - (m - head)..n) {
		ring[i] = None;
		v.push(i);
	}
	IndexVec::from(v)
}

/// Drop data segments first, so recovery has to lean on parity as much as possible.
pub fn drop_data_first<T: Sized, G: rand::Rng>(ring: &mut [Option<T>], k: usize, m: usize, _rng: &mut G) -> IndexVec {
	assert_eq!(ring.len(), k + m);
	let v = (0..m).collect::<Vec<_>>();
	v.iter().for_each(|&idx| {
		ring[idx] = None;
	});
	IndexVec::from(v)
}

/// Drop `m` segments at random.
pub fn drop_random_max<T: Sized, G: rand::Rng>(ring: &mut [Option<T>], k: usize, m: usize, rng: &mut G) -> IndexVec {
	assert_eq!(ring.len(), k + m);
	let iv = rand::seq::index::sample(rng, k + m, m);
	assert_eq!(iv.len(), m);
	iv.iter().for_each(|idx| {
		ring[idx] = None;
	});
	let kept_count = ring.iter().filter(|x| x.is_some()).count();
	assert_eq!(kept_count, k);
	iv
}

/// Take the remaining segments, in a shuffled arrival order.
pub fn survivors<G: rand::Rng>(ring: Vec<Option<Segment>>, rng: &mut G) -> Vec<Segment> {
	let mut survivors = ring.into_iter().flatten().collect::<Vec<_>>();
	survivors.shuffle(rng);
	survivors
}

/// Pack survivors into the flat `(buffer, indices)` form used by in-place recovery.
pub fn pack(survivors: &[Segment]) -> (Vec<u8>, Vec<u8>) {
	let buffer = survivors.iter().flat_map(|s| s.data.iter().copied()).collect();
	let indices = survivors.iter().map(|s| s.index).collect();
	(buffer, indices)
}

/// Encode `payload`, lose `m` segments at random, rebuild, and compare.
pub fn roundtrip<Enc, Recon, E>(
	encode: Enc,
	rebuild: Recon,
	payload: &[u8],
	params: &CodeParams,
) -> std::result::Result<(), E>
where
	Enc: Fn(&CodeParams, &[u8]) -> std::result::Result<Vec<Segment>, E>,
	Recon: Fn(&CodeParams, &[Segment]) -> std::result::Result<Vec<u8>, E>,
	E: std::error::Error + Send + Sync + 'static,
{
	roundtrip_w_drop_closure::<_, _, _, SmallRng, _>(encode, rebuild, payload, params, drop_random_max)
}

pub fn roundtrip_w_drop_closure<Enc, Recon, DropFun, RandGen, E>(
	encode: Enc,
	rebuild: Recon,
	payload: &[u8],
	params: &CodeParams,
	mut drop_rand: DropFun,
) -> std::result::Result<(), E>
where
	E: std::error::Error + Send + Sync + 'static,
	Enc: Fn(&CodeParams, &[u8]) -> std::result::Result<Vec<Segment>, E>,
	Recon: Fn(&CodeParams, &[Segment]) -> std::result::Result<Vec<u8>, E>,
	DropFun: FnMut(&mut [Option<Segment>], usize, usize, &mut RandGen) -> IndexVec,
	RandGen: rand::Rng + rand::SeedableRng<Seed = [u8; 32]>,
{
	let mut rng = <RandGen as rand::SeedableRng>::from_seed(SMALL_RNG_SEED);

	// Construct the full ring
	let ring = encode(params, payload)?;
	assert_eq!(ring.len(), params.total());

	let mut received = ring.into_iter().map(Some).collect::<Vec<Option<Segment>>>();
	let dropped = drop_rand(received.as_mut_slice(), params.k(), params.m(), &mut rng);
	assert_eq!(dropped.len(), params.m());

	let survivors = survivors(received, &mut rng);
	let recovered = rebuild(params, &survivors)?;

	assert_eq!(&recovered[..], payload, "recovered block differs, dropped {:?}", dropped.into_vec());
	Ok(())
}

use segment_erasure::*;

use std::cell::Cell;

use assert_matches::assert_matches;
use rand::prelude::*;
use rand::rngs::SmallRng;
use segment_erasure_tester::*;

/// Forwards to [`GaloisEngine`] while counting calls, optionally failing.
#[derive(Default)]
struct CountingEngine {
	inner: GaloisEngine,
	calls: Cell<usize>,
	fail_init: bool,
	fail_decode: bool,
	skip_decode: bool,
}

impl CountingEngine {
	fn calls(&self) -> usize {
		self.calls.get()
	}

	fn bump(&self) {
		self.calls.set(self.calls.get() + 1);
	}
}

impl ErasureEngine for CountingEngine {
	fn init(&self) -> std::result::Result<(), EngineError> {
		self.bump();
		if self.fail_init {
			return Err(EngineError::SelfCheck("refusing to start"));
		}
		self.inner.init()
	}

	fn encode(
		&self,
		k: usize,
		m: usize,
		inputs: &[&[u8]],
		output: &mut [u8],
		block_len: usize,
	) -> std::result::Result<(), EngineError> {
		self.bump();
		self.inner.encode(k, m, inputs, output, block_len)
	}

	fn decode(
		&self,
		k: usize,
		m: usize,
		entries: &mut [Block<'_>],
		block_len: usize,
	) -> std::result::Result<(), EngineError> {
		self.bump();
		if self.fail_decode {
			return Err(EngineError::Backend(reed_solomon_erasure::Error::TooFewShardsPresent));
		}
		if self.skip_decode {
			return Ok(());
		}
		self.inner.decode(k, m, entries, block_len)
	}
}

fn abcd() -> Vec<u8> {
	[&b"AAAAAAAA"[..], &b"BBBBBBBB"[..], &b"CCCCCCCC"[..], &b"DDDDDDDD"[..]].concat()
}

#[test]
fn lost_b_and_d_are_restored() {
	let data = abcd();
	let parity = encode(4, 2, 8, &data).unwrap();
	assert_eq!(parity.len(), 16);
	// the input is only read
	assert_eq!(data, abcd());

	let mut survivors = [&data[0..8], &data[16..24], &parity[0..8], &parity[8..16]].concat();
	recover(4, 2, 8, &mut survivors, &[0, 2, 4, 5]).unwrap();

	let segments = survivors.chunks_exact(8).collect::<Vec<_>>();
	assert_eq!(segments, vec![&b"AAAAAAAA"[..], &b"BBBBBBBB"[..], &b"CCCCCCCC"[..], &b"DDDDDDDD"[..]]);
}

#[test]
fn parity_first_arrival_order() {
	let data = abcd();
	let parity = encode(4, 2, 8, &data).unwrap();

	let mut survivors = [&parity[8..16], &data[24..32], &parity[0..8], &data[8..16]].concat();
	recover(4, 2, 8, &mut survivors, &[5, 3, 4, 1]).unwrap();
	assert_eq!(survivors, data);
}

#[test]
fn shuffled_data_only() {
	let data = abcd();
	let mut survivors = [&data[24..32], &data[0..8], &data[16..24], &data[8..16]].concat();
	recover(4, 2, 8, &mut survivors, &[3, 0, 2, 1]).unwrap();
	assert_eq!(survivors, data);
}

#[test]
fn too_few_survivors_never_reach_the_engine() {
	let engine = CountingEngine::default();
	let params = CodeParams::new(4, 2, 8).unwrap();
	let mut survivors = vec![0_u8; 24];

	assert_matches!(
		recover_with(&engine, &params, &mut survivors, &[0, 2, 4]),
		Err(Error::Precondition(PreconditionViolation::SurvivorCountMismatch { have: 3, want: 4 }))
	);
	assert_eq!(engine.calls(), 0);
}

#[test]
fn precondition_rejections_never_reach_the_engine() {
	let engine = CountingEngine::default();
	let params = CodeParams::new(4, 2, 8).unwrap();

	let err = recover_with(&engine, &params, &mut vec![0_u8; 32], &[0, 2, 2, 5]).unwrap_err();
	assert!(err.is_precondition_violation());
	assert_matches!(err, Error::Precondition(PreconditionViolation::DuplicateIndex { index: 2 }));

	assert_matches!(
		recover_with(&engine, &params, &mut vec![0_u8; 32], &[0, 1, 2, 6]),
		Err(Error::Precondition(PreconditionViolation::IndexOutOfRange { index: 6, total: 6 }))
	);

	assert_matches!(
		recover_with(&engine, &params, &mut vec![0_u8; 31], &[0, 1, 2, 3]),
		Err(Error::Precondition(PreconditionViolation::SurvivorLengthMismatch { have: 31, want: 32 }))
	);

	assert_matches!(
		encode_with(&engine, &params, &[0_u8; 33]),
		Err(Error::Precondition(PreconditionViolation::DataLengthMismatch { have: 33, want: 32 }))
	);

	let short = vec![Segment::new(0, vec![0; 8]), Segment::new(1, vec![0; 7]), Segment::new(2, vec![0; 8]), Segment::new(3, vec![0; 8])];
	assert_matches!(
		rebuild_with(&engine, &params, &short),
		Err(Error::Precondition(PreconditionViolation::SegmentLengthMismatch { position: 1, have: 7, want: 8 }))
	);

	assert_eq!(engine.calls(), 0);

	assert_matches!(
		encode(200, 56, 8, &vec![0_u8; 1600]),
		Err(Error::Precondition(PreconditionViolation::TooManySegments { .. }))
	);
	assert_matches!(recover(0, 2, 8, &mut [], &[]), Err(Error::Precondition(PreconditionViolation::NoDataSegments)));
}

#[test]
fn oversized_segment_size_is_a_precondition_violation() {
	let huge = usize::MAX / 2 + 1;

	assert_matches!(
		encode(2, 1, huge, &[0_u8; 4]),
		Err(Error::Precondition(PreconditionViolation::SegmentSizeOverflow { count: 2, .. }))
	);
	assert_matches!(
		recover(2, 1, huge, &mut [0_u8; 4], &[0, 1]),
		Err(Error::Precondition(PreconditionViolation::SegmentSizeOverflow { count: 2, .. }))
	);
	assert_matches!(
		encode_ring(1, 2, huge, &[0_u8; 4]),
		Err(Error::Precondition(PreconditionViolation::SegmentSizeOverflow { count: 2, .. }))
	);

	// a single huge segment is representable, the buffer just does not match
	assert_matches!(
		encode(1, 1, usize::MAX, &[0_u8; 4]),
		Err(Error::Precondition(PreconditionViolation::DataLengthMismatch { have: 4, want: usize::MAX }))
	);
}

#[test]
fn engine_init_failure_is_returned() {
	let engine = CountingEngine { fail_init: true, ..Default::default() };
	let params = CodeParams::new(4, 2, 8).unwrap();

	assert_matches!(encode_with(&engine, &params, &abcd()), Err(Error::EngineInit(EngineError::SelfCheck(_))));
	assert_matches!(
		recover_with(&engine, &params, &mut abcd(), &[0, 1, 2, 3]),
		Err(Error::EngineInit(EngineError::SelfCheck(_)))
	);
	assert_eq!(engine.calls(), 2);
}

#[test]
fn engine_decode_failure_carries_context() {
	let engine = CountingEngine { fail_decode: true, ..Default::default() };
	let params = CodeParams::new(4, 2, 8).unwrap();

	let err = recover_with(&engine, &params, &mut abcd(), &[0, 1, 2, 5]).unwrap_err();
	assert_matches!(
		err,
		Error::EngineOperation { op: Operation::Decode, k: 4, m: 2, segment_size: 8, source: EngineError::Backend(_) }
	);
	assert!(err.to_string().contains("decode"));
}

#[test]
fn undecoded_parity_rows_are_reported() {
	let engine = CountingEngine { skip_decode: true, ..Default::default() };
	let params = CodeParams::new(4, 2, 8).unwrap();

	let data = abcd();
	let parity = encode(4, 2, 8, &data).unwrap();
	let mut survivors = [&data[0..8], &data[16..24], &parity[0..8], &parity[8..16]].concat();

	assert_matches!(
		recover_with(&engine, &params, &mut survivors, &[0, 2, 4, 5]),
		Err(Error::EngineOperation { op: Operation::Decode, source: EngineError::RowsNotRecovered { ref rows, k: 4 }, .. }) => {
			assert_eq!(rows, &vec![0_u8, 2, 4, 5]);
		}
	);
}

#[test]
fn ring_holds_data_then_parity() {
	let data = abcd();
	let ring = encode_ring(4, 2, 8, &data).unwrap();
	let parity = encode(4, 2, 8, &data).unwrap();
	let params = CodeParams::new(4, 2, 8).unwrap();

	assert_eq!(ring.len(), 6);
	for (idx, segment) in ring.iter().enumerate() {
		assert_eq!(segment.index as usize, idx);
		assert_eq!(segment.is_parity(&params), idx >= 4);
	}
	itertools::assert_equal(ring.iter().take(4).map(AsRef::<[u8]>::as_ref), data.chunks_exact(8));
	itertools::assert_equal(ring.iter().skip(4).map(AsRef::<[u8]>::as_ref), parity.chunks_exact(8));
}

#[test]
fn every_survivor_subset_small_code() {
	use itertools::Itertools;

	let params = CodeParams::new(3, 3, 16).unwrap();
	let data = &BYTES[..params.data_len()];
	let ring = encode_ring_with(&GaloisEngine::new(), &params, data).unwrap();

	for subset in ring.iter().cloned().combinations(params.k()) {
		for ordered in subset.into_iter().permutations(params.k()) {
			let recovered = rebuild_with(&GaloisEngine::new(), &params, &ordered).unwrap();
			assert_eq!(&recovered[..], data);
		}
	}
}

#[test]
fn roundtrip_default_parameters() {
	let params = CodeParams::new(K, M, SEGMENT_SIZE).unwrap();
	let payload = &BYTES[..params.data_len()];
	let engine = GaloisEngine::new();

	let enc = |p: &CodeParams, d: &[u8]| encode_ring_with(&engine, p, d);
	let rec = |p: &CodeParams, s: &[Segment]| rebuild_with(&engine, p, s);

	roundtrip(enc, rec, payload, &params).unwrap();
	roundtrip_w_drop_closure::<_, _, _, SmallRng, _>(enc, rec, payload, &params, deterministic_drop_segments).unwrap();
	roundtrip_w_drop_closure::<_, _, _, SmallRng, _>(enc, rec, payload, &params, drop_data_first).unwrap();
}

macro_rules! simplicissimus {
	($name:ident: k: $k:literal, m: $m:literal, segment_size: $segment_size:literal) => {
		#[test]
		fn $name() {
			let params = CodeParams::new($k, $m, $segment_size).unwrap();
			let coder = SegmentCoder::new(params);
			let payload = &BYTES[..params.data_len()];
			let res = roundtrip_w_drop_closure::<_, _, _, SmallRng, _>(
				|_: &CodeParams, d: &[u8]| coder.encode_ring(d),
				|_: &CodeParams, s: &[Segment]| coder.rebuild(s),
				payload,
				&params,
				drop_random_max,
			);
			assert_matches!(res, Ok(()));
		}
	};
}

// Smallest possible code
simplicissimus!(case_0: k: 1, m: 1, segment_size: 1);

// Many parity segments per data segment
simplicissimus!(case_1: k: 2, m: 40, segment_size: 33);

// Full codeword
simplicissimus!(case_2: k: 200, m: 55, segment_size: 64);

// Single parity, odd segment size
simplicissimus!(case_3: k: 17, m: 1, segment_size: 7);

// Largest k
simplicissimus!(case_4: k: 254, m: 1, segment_size: 16);

#[test]
fn random_parameters() {
	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	for _ in 0..20 {
		let k = rng.gen_range(1..=60);
		let m = rng.gen_range(1..=40);
		let segment_size = rng.gen_range(1..=300);
		let params = CodeParams::new(k, m, segment_size).unwrap();
		let payload = &BYTES[..params.data_len()];

		let parity = encode_with(&GaloisEngine::new(), &params, payload).unwrap();
		assert_eq!(parity.len(), params.parity_len());

		let ring = payload.chunks_exact(segment_size).chain(parity.chunks_exact(segment_size)).collect::<Vec<_>>();
		let picked = rand::seq::index::sample(&mut rng, k + m, k).into_vec();
		let mut survivors = picked.iter().flat_map(|&idx| ring[idx].iter().copied()).collect::<Vec<_>>();
		let indices = picked.iter().map(|&idx| idx as u8).collect::<Vec<_>>();

		recover_with(&GaloisEngine::new(), &params, &mut survivors, &indices).unwrap();
		assert_eq!(&survivors[..], payload, "k={} m={} picked={:?}", k, m, picked);
	}
}

#[test]
fn sector_pads_and_trims() {
	let limits = SectorLimits::default();
	let sector = Sector::new(BYTES[..1000].to_vec()).unwrap();

	let params = sector.code_params(6, 3, &limits).unwrap();
	// ceil(1000 / 6) = 167, rounded up to 192
	assert_eq!(params.segment_size(), 192);

	let engine = GaloisEngine::new();
	let mut rng = SmallRng::from_seed(SMALL_RNG_SEED);
	let mut ring = sector.encode_with(&engine, &params).unwrap().into_iter().map(Some).collect::<Vec<_>>();
	drop_random_max(&mut ring, params.k(), params.m(), &mut rng);
	let survivors = survivors(ring, &mut rng);

	let rebuilt = Sector::rebuild_with(&engine, &params, sector.len(), &survivors).unwrap();
	assert_eq!(rebuilt, sector);
}

#[test]
fn sector_limits() {
	assert_matches!(Sector::new(vec![]), Err(Error::Precondition(PreconditionViolation::PayloadSizeIsZero)));

	let sector = Sector::new(vec![1; 100]).unwrap();
	let tight = SectorLimits { alignment: 1, max_segment_size: 10 };
	assert_matches!(sector.segment_size(10, &tight), Ok(10));
	assert_matches!(
		sector.segment_size(9, &tight),
		Err(Error::Precondition(PreconditionViolation::SegmentTooLarge { want: 12, max: 10 }))
	);
	assert_matches!(sector.segment_size(0, &tight), Err(Error::Precondition(PreconditionViolation::NoDataSegments)));

	let unaligned = SectorLimits { alignment: usize::MAX, max_segment_size: 1 << 20 };
	assert_matches!(
		sector.segment_size(3, &unaligned),
		Err(Error::Precondition(PreconditionViolation::SegmentTooLarge { want: usize::MAX, max: 1048576 }))
	);

	let params = CodeParams::new(2, 1, 8).unwrap();
	assert_matches!(
		sector.encode_with(&GaloisEngine::new(), &params),
		Err(Error::Precondition(PreconditionViolation::DataLengthMismatch { have: 100, want: 16 }))
	);
}

#[test]
fn quickcheck_roundtrip() {
	use quickcheck::{QuickCheck, TestResult};

	fn property(k: u8, m: u8, segment_size: u8, seed: u64) -> TestResult {
		let (k, m, segment_size) = (k as usize % 32 + 1, m as usize % 32 + 1, segment_size as usize + 1);
		let params = match CodeParams::new(k, m, segment_size) {
			Ok(params) => params,
			Err(_) => return TestResult::discard(),
		};
		let mut rng = SmallRng::seed_from_u64(seed);
		let offset = rng.gen_range(0..BYTES.len() - params.data_len());
		let payload = &BYTES[offset..][..params.data_len()];

		let coder = SegmentCoder::new(params);
		let mut ring = coder.encode_ring(payload).unwrap().into_iter().map(Some).collect::<Vec<_>>();
		drop_random_max(&mut ring, k, m, &mut rng);
		let (mut buffer, indices) = pack(&survivors(ring, &mut rng));

		TestResult::from_bool(coder.recover(&mut buffer, &indices).is_ok() && &buffer[..] == payload)
	}

	QuickCheck::new().tests(100).quickcheck(property as fn(u8, u8, u8, u64) -> TestResult);
}

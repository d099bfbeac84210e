use honggfuzz::fuzz;

use arbitrary::*;

use rand::prelude::*;

#[derive(Debug, Clone)]
struct RecoveryFeed {
	k: usize,
	m: usize,
	segment_size: usize,
	survivors: Vec<u8>,
	indices: Vec<u8>,
}

impl<'a> Arbitrary<'a> for RecoveryFeed {
	fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
		let k = u.int_in_range(0_usize..=260)?;
		let m = u.int_in_range(0_usize..=260)?;
		let segment_size = u.int_in_range(0_usize..=64)?;

		// mostly plausible index sets, sometimes garbage
		let indices = if bool::arbitrary(u)? {
			let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(u64::arbitrary(u)?);
			let total = (k + m).min(256);
			rand::seq::index::sample(&mut rng, total, k.min(total)).into_iter().map(|idx| idx as u8).collect()
		} else {
			Vec::<u8>::arbitrary(u)?
		};

		let survivors = u.bytes(u.len().min(k * segment_size))?.to_vec();

		Ok(Self { k, m, segment_size, survivors, indices })
	}
}

fn main() {
	// You have full control over the loop but
	// you're supposed to call `fuzz` ad vitam aeternam
	loop {
		fuzz!(|feed: RecoveryFeed| {
			let RecoveryFeed { k, m, segment_size, mut survivors, indices } = feed;
			let _ = erasure::recover(k, m, segment_size, &mut survivors[..], &indices[..]);
		});
	}
}

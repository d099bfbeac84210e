use honggfuzz::fuzz;

use arbitrary::*;

use erasure::{CodeParams, GaloisEngine};

#[derive(Debug, Clone, Copy)]
struct RoundtripFeed<'a> {
	k: usize,
	m: usize,
	data: &'a [u8],
}

impl<'a> Arbitrary<'a> for RoundtripFeed<'a> {
	fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
		let k = u.int_in_range(1..=254)?;
		let m = u.int_in_range(1..=255 - k)?;
		Ok(Self { k, m, data: u.bytes(u.len())? })
	}
}

fn main() {
	// You have full control over the loop but
	// you're supposed to call `fuzz` ad vitam aeternam
	loop {
		fuzz!(|feed: RoundtripFeed| {
			let segment_size = feed.data.len() / feed.k;
			let Ok(params) = CodeParams::new(feed.k, feed.m, segment_size) else { return };
			let payload = &feed.data[..params.data_len()];
			let engine = GaloisEngine::new();
			tester::roundtrip(
				|p: &CodeParams, d: &[u8]| erasure::encode_ring_with(&engine, p, d),
				|p: &CodeParams, s: &[erasure::Segment]| erasure::rebuild_with(&engine, p, s),
				payload,
				&params,
			)
			.expect("valid parameters always roundtrip. qed");
		});
	}
}

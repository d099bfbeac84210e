use honggfuzz::fuzz;

use arbitrary::*;

#[derive(Debug, Clone)]
struct SortFeed {
	rows: Vec<u8>,
	segment_size: usize,
}

impl<'a> Arbitrary<'a> for SortFeed {
	fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
		let segment_size = u.int_in_range(1_usize..=16)?;
		let mut seen = [false; 256];
		let rows = Vec::<u8>::arbitrary(u)?
			.into_iter()
			.filter(|&row| !std::mem::replace(&mut seen[row as usize], true))
			.collect();
		Ok(Self { rows, segment_size })
	}
}

fn main() {
	// You have full control over the loop but
	// you're supposed to call `fuzz` ad vitam aeternam
	loop {
		fuzz!(|feed: SortFeed| {
			let SortFeed { mut rows, segment_size } = feed;
			let mut buffer = rows.iter().flat_map(|&row| std::iter::repeat(row).take(segment_size)).collect::<Vec<_>>();

			erasure::sort_segments(&mut rows[..], &mut buffer[..], segment_size).expect("buffer matches rows. qed");

			assert!(rows.windows(2).all(|pair| pair[0] < pair[1]));
			for (row, segment) in rows.iter().zip(buffer.chunks_exact(segment_size)) {
				assert!(segment.iter().all(|byte| byte == row), "segment of row {} got mixed up", row);
			}
		});
	}
}

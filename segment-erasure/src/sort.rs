//! In-place sort of `(row, block)` pairs by row.
//!
//! Blocks are views into the caller's buffer, so reordering the views alone
//! would leave the buffer untouched. Every swap therefore exchanges the block
//! contents together with the rows, the views themselves never move.
//!
//! The sort is the work area merge sort: one half is merge sorted into a
//! scratch region of the same slice, the unsorted remainder is halved
//! repeatedly and merged in, and the last two or fewer elements are placed
//! by insertion. No auxiliary block storage is needed.

use tracing::trace;

use crate::engine::Block;
use crate::errors::*;
use crate::span::SegmentLayout;

struct Sorter<'s, 'a> {
	entries: &'s mut [Block<'a>],
	swaps: usize,
}

impl<'s, 'a> Sorter<'s, 'a> {
	fn row(&self, idx: usize) -> u8 {
		self.entries[idx].row
	}

	fn swap(&mut self, i: usize, j: usize) {
		if i == j {
			return;
		}
		let (lo, hi) = if i < j { (i, j) } else { (j, i) };
		let (head, tail) = self.entries.split_at_mut(hi);
		let (a, b) = (&mut head[lo], &mut tail[0]);
		a.data.swap_with_slice(b.data);
		std::mem::swap(&mut a.row, &mut b.row);
		self.swaps += 1;
	}

	/// Merge the sorted runs `i..m` and `j..n` into the work area starting at `w`,
	/// whose previous content ends up where the runs were.
	fn work_merge(&mut self, mut i: usize, m: usize, mut j: usize, n: usize, mut w: usize) {
		while i < m && j < n {
			let from = if self.row(i) < self.row(j) {
				i += 1;
				i - 1
			} else {
				j += 1;
				j - 1
			};
			self.swap(w, from);
			w += 1;
		}
		while i < m {
			self.swap(w, i);
			w += 1;
			i += 1;
		}
		while j < n {
			self.swap(w, j);
			w += 1;
			j += 1;
		}
	}

	/// Sort `l..u` and leave the result in the work area starting at `w`.
	fn work_sort(&mut self, mut l: usize, u: usize, mut w: usize) {
		if u - l > 1 {
			let m = l + (u - l) / 2;
			self.sort(l, m);
			self.sort(m, u);
			self.work_merge(l, m, m, u, w);
		} else {
			while l < u {
				self.swap(l, w);
				l += 1;
				w += 1;
			}
		}
	}

	fn sort(&mut self, l: usize, u: usize) {
		if u - l <= 1 {
			return;
		}

		let m = l + (u - l) / 2;
		let mut w = l + u - m;
		// sorted first half now lives in `w..u`
		self.work_sort(l, m, w);

		while w - l > 2 {
			let n = w;
			w = l + (n - l + 1) / 2;
			// sort the upper half of the unsorted prefix into its lower half
			self.work_sort(w, n, l);
			self.work_merge(l, l + n - w, n, u, w);
		}

		for n in (l + 1..=w).rev() {
			let mut m = n;
			while m < u && self.row(m) < self.row(m - 1) {
				self.swap(m, m - 1);
				m += 1;
			}
		}
	}
}

/// Length of the leading run of entries that already sit at their final position.
///
/// That is the ascending head whose rows are all below every row after it. For
/// a recovery the run is where each row equals its position.
fn settled_prefix(entries: &[Block<'_>]) -> usize {
	let n = entries.len();
	let head = 1 + entries.windows(2).take_while(|pair| pair[0].row < pair[1].row).count();
	if head >= n {
		return n;
	}
	let Some(rest_min) = entries[head..].iter().map(|entry| entry.row).min() else { return head };
	entries[..head].iter().take_while(|entry| entry.row < rest_min).count()
}

/// Sort `entries` ascending by row, moving each block's bytes along with its row.
///
/// All blocks must have the same length and rows must be pairwise distinct.
/// Returns the number of block swaps performed.
pub fn sort_blocks(entries: &mut [Block<'_>]) -> usize {
	debug_assert!(entries.windows(2).all(|pair| pair[0].data.len() == pair[1].data.len()));

	let n = entries.len();
	let settled = settled_prefix(entries);
	if settled + 1 >= n {
		trace!(n, "blocks already in row order");
		return 0;
	}

	let mut sorter = Sorter { entries, swaps: 0 };
	sorter.sort(settled, n);
	trace!(n, settled, swaps = sorter.swaps, "sorted blocks by row");
	sorter.swaps
}

/// Sort the segments of a flat `buffer` by their entry in `rows`.
///
/// `rows[i]` tags segment `i` of `buffer`, rows must be pairwise distinct. On
/// return both are reordered so that `rows` is ascending and every segment still
/// carries its original row.
pub fn sort_segments(rows: &mut [u8], buffer: &mut [u8], segment_size: usize) -> Result<usize> {
	if segment_size == 0 {
		return Err(PreconditionViolation::SegmentSizeIsZero.into());
	}
	let mut seen = [false; 256];
	for &row in rows.iter() {
		if std::mem::replace(&mut seen[row as usize], true) {
			return Err(PreconditionViolation::DuplicateIndex { index: row }.into());
		}
	}
	let layout = SegmentLayout::new(rows.len(), segment_size)?;
	layout.validate(buffer.len()).map_err(|_| PreconditionViolation::SurvivorLengthMismatch {
		have: buffer.len(),
		want: layout.byte_len(),
	})?;

	let mut entries = rows
		.iter()
		.zip(layout.segments_mut(buffer)?)
		.map(|(&row, data)| Block::new(row, data))
		.collect::<Vec<_>>();

	let swaps = sort_blocks(&mut entries);

	for (row, entry) in rows.iter_mut().zip(entries.iter()) {
		*row = entry.row;
	}
	Ok(swaps)
}

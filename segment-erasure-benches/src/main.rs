use color_eyre::Result;
use rand::rngs::SmallRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use segment_erasure::{CodeParams, GaloisEngine, Segment, SegmentCoder};
use segment_erasure_tester::{
	deterministic_drop_segments, drop_data_first, drop_random_max, roundtrip_w_drop_closure, DropFn, BYTES, K, M,
	SEGMENT_SIZE,
};

fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

	let strategies: [(&str, DropFn<SmallRng>); 3] = [
		("deterministic", deterministic_drop_segments),
		("data first", drop_data_first),
		("random", drop_random_max),
	];

	for (k, m, segment_size) in [(K, M, SEGMENT_SIZE), (1, 1, 64), (128, 127, 4096)] {
		let params = CodeParams::new(k, m, segment_size)?;
		let coder = SegmentCoder::with_engine(params, GaloisEngine::new());
		let payload = &BYTES[..params.data_len()];

		for (name, drop_fn) in strategies {
			roundtrip_w_drop_closure::<_, _, _, SmallRng, _>(
				|_: &CodeParams, data: &[u8]| coder.encode_ring(data),
				|_: &CodeParams, segments: &[Segment]| coder.rebuild(segments),
				payload,
				&params,
				drop_fn,
			)?;
			info!(k, m, segment_size, strategy = name, "roundtrip ok");
		}
	}

	Ok(())
}

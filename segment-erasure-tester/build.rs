use std::env;

use std::io::{Result, Write};
use std::path::PathBuf;

use fs_err::OpenOptions;
use rand::{self, distributions::Uniform, prelude::Distribution};

/// Enough for a full 255 segment codeword of 16 KiB segments.
const RAND_DATA_LEN: usize = 255 * 16 * 1024;

fn gen_rand_data() -> Result<()> {
	let mut rng = rand::thread_rng();
	let dice = Uniform::<u8>::new_inclusive(0, 255);
	let data = dice.sample_iter(&mut rng).take(RAND_DATA_LEN).collect::<Vec<_>>();

	let out = env::var("OUT_DIR").expect("OUT_DIR is set by cargo after process launch. qed");
	let dest = PathBuf::from(out).join("rand_data.bin");

	let mut f = OpenOptions::new().truncate(true).write(true).create(true).open(&dest)?;

	f.write_all(&data)?;

	f.flush()?;

	Ok(())
}

fn main() -> Result<()> {
	println!("cargo:rerun-if-changed=build.rs");
	gen_rand_data()
}

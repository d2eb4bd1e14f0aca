#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	anyhow::{Context, Result},
	log::debug,
	nes_chr_rip::{chr, stdoutRaw, DEFAULT_PALETTE},
	std::io::{self, BufWriter, Write},
};

fn main() -> Result<()> {
	env_logger::init();
	let stdin = &mut io::stdin().lock();
	let image = chr::decodeBank(stdin, &DEFAULT_PALETTE).context("reading CHR bank from stdin")?;
	let trailing = io::copy(stdin, &mut io::sink())?;
	debug!("decoded {} bytes, ignored {trailing} trailing", chr::BANK_LEN);
	let stdout = &mut BufWriter::new(stdoutRaw());
	image.writePng(&mut *stdout).context("writing PNG to stdout")?;
	stdout.flush().context("flushing stdout")?;
	Ok(())
}

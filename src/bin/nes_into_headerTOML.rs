#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	anyhow::{Context, Result},
	nes_chr_rip::{ines, stdoutRaw},
	serde::Serialize,
	std::io::{self, Write},
};

#[derive(Serialize)]
struct Metadata {
	isValid: bool,
	chrBanksOffset: u64,
	header: ines::Header,
}

fn main() -> Result<()> {
	env_logger::init();
	let header = ines::readHeader(&mut io::stdin().lock()).context("reading header from stdin")?;
	let metadata = &Metadata { isValid: header.isValid(), chrBanksOffset: header.chrBanksOffset(), header };
	stdoutRaw().write_all(toml::to_string(metadata)?.as_bytes())?;
	Ok(())
}

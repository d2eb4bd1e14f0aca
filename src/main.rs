#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	anyhow::{bail, Context, Result},
	clap::Parser,
	log::{error, info},
	nes_chr_rip::{ines, ripChrBanks, DEFAULT_PALETTE},
	std::{
		fs::File,
		io::{BufReader, BufWriter, Write},
		path::PathBuf,
	},
};

/// Rips the sprite and background tiles out of the CHR banks of an NES ROM,
/// one PNG sheet per bank.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
	/// Path to the .nes ROM file.
	#[clap(value_parser)]
	rom: PathBuf,
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();
	info!("{} {}, ripping CHR banks out of NES ROMs", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
	let path = args.rom.as_path();

	if !path.is_file() {
		bail!("{}: specified file does not exist", path.display());
	}
	let rom = &mut BufReader::new(File::open(path).with_context(|| format!("opening {}", path.display()))?);
	let outfileStem = path.file_stem().unwrap_or(path.as_os_str()).to_string_lossy().into_owned();

	let header = ines::readHeader(rom).with_context(|| format!("{}: reading header", path.display()))?;
	if !header.isValid() {
		error!("{:02X?} is not an iNES signature", header.signature);
		bail!("{}: not a valid NES ROM file", path.display());
	}
	info!("Valid NES ROM file");
	info!("PRG banks: {}", header.prgCount);
	info!("CHR banks: {}", header.chrCount);
	if header.chrCount == 0 {
		info!("No CHR banks in ROM file");
		return Ok(());
	}

	let count = ripChrBanks(rom, &header, &DEFAULT_PALETTE, |i, image| -> Result<()> {
		let outfile = format!("{outfileStem}_{i}.png");
		let png = &mut BufWriter::new(File::create(&outfile).with_context(|| format!("creating {outfile}"))?);
		image.writePng(&mut *png).with_context(|| format!("writing {outfile}"))?;
		png.flush().with_context(|| format!("flushing {outfile}"))?;
		info!("Wrote {outfile}");
		Ok(())
	})
	.with_context(|| format!("{}: ripping CHR banks", path.display()))?;
	info!("Done, {count} bank(s)");
	Ok(())
}

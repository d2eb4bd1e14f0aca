#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

pub type Rgb = [u8; 3];
pub type Palette = [Rgb; 4];

/// Black, light gray, gray, dark gray.
pub const DEFAULT_PALETTE: Palette = [[0, 0, 0], [211, 211, 211], [128, 128, 128], [169, 169, 169]];

pub mod ines {
	use {
		byteorder::ReadBytesExt,
		serde::Serialize,
		std::io::{self, Read},
	};

	pub const SIGNATURE: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];
	pub const FILE_HEADER_LEN: u64 = 16;
	pub const PRG_BANK_LEN: u64 = 16384;

	#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
	pub struct Header {
		pub signature: [u8; 4],
		pub prgCount: u8,
		pub chrCount: u8,
	}

	/// Reads the signature and both bank counts from the reader's current position.
	/// The signature is returned as found; see [`isValidSignature`].
	pub fn readHeader(reader: &mut impl Read) -> io::Result<Header> {
		let mut signature = [0; 4];
		reader.read_exact(&mut signature)?;
		Ok(Header { signature, prgCount: reader.read_u8()?, chrCount: reader.read_u8()? })
	}

	#[inline]
	pub fn isValidSignature(bytes: &[u8]) -> bool {
		bytes == SIGNATURE
	}

	impl Header {
		pub fn isValid(&self) -> bool {
			isValidSignature(&self.signature)
		}

		/// Offset of the first CHR bank from the start of the file.
		pub fn chrBanksOffset(&self) -> u64 {
			FILE_HEADER_LEN + PRG_BANK_LEN * u64::from(self.prgCount)
		}
	}

	#[cfg(test)]
	mod tests {
		use {super::*, std::io::ErrorKind};

		#[test]
		fn signature_matches_only_the_exact_magic() {
			assert!(isValidSignature(&[0x4E, 0x45, 0x53, 0x1A]));
			assert!(isValidSignature(b"NES\x1A"));
			for i in 0..SIGNATURE.len() {
				for flip in [0x01, 0x20, 0x80, 0xFF] {
					let mut bytes = SIGNATURE;
					bytes[i] ^= flip;
					assert!(!isValidSignature(&bytes), "{bytes:02X?}");
				}
			}
			assert!(!isValidSignature(&[0, 0, 0, 0]));
			assert!(!isValidSignature(b"nes\x1A"));
		}

		#[test]
		fn signature_of_other_length_is_invalid() {
			assert!(!isValidSignature(&[]));
			assert!(!isValidSignature(&SIGNATURE[..3]));
			assert!(!isValidSignature(&[0x4E, 0x45, 0x53, 0x1A, 0x00]));
		}

		#[test]
		fn reads_counts_after_signature() {
			let cursor = &mut io::Cursor::new([0x4E_u8, 0x45, 0x53, 0x1A, 0x02, 0x01, 0xAA]);
			let header = readHeader(cursor).unwrap();
			assert_eq!(header, Header { signature: SIGNATURE, prgCount: 2, chrCount: 1 });
			assert!(header.isValid());
			assert_eq!(cursor.position(), 6);
		}

		#[test]
		fn bad_signature_is_reported_not_raised() {
			let header = readHeader(&mut &[0_u8, 0, 0, 0, 0x05, 0x07][..]).unwrap();
			assert!(!header.isValid());
			assert_eq!((header.prgCount, header.chrCount), (5, 7));
		}

		#[test]
		fn short_header_is_an_eof_error() {
			for len in 0..6 {
				let bytes = &[0x4E_u8, 0x45, 0x53, 0x1A, 0x01, 0x01][..len];
				assert_eq!(readHeader(&mut &bytes[..]).unwrap_err().kind(), ErrorKind::UnexpectedEof);
			}
		}

		#[test]
		fn chr_banks_follow_prg_banks() {
			let header = |prgCount| Header { signature: SIGNATURE, prgCount, chrCount: 1 };
			assert_eq!(header(0).chrBanksOffset(), 16);
			assert_eq!(header(1).chrBanksOffset(), 16 + 16384);
			assert_eq!(header(u8::MAX).chrBanksOffset(), 16 + 16384 * 255);
		}
	}
}

pub mod chr {
	use {
		super::{Palette, Rgb},
		png::{BitDepth, ColorType},
		std::io::{self, Read, Write},
	};

	pub const TILE_SIZE: usize = 8;
	pub const TILE_LEN: usize = 2 * TILE_SIZE;
	pub const TILE_COLUMNS: usize = 16;
	pub const TILE_ROWS: usize = 32;
	pub const NUM_TILES: usize = TILE_COLUMNS * TILE_ROWS;
	pub const BANK_LEN: usize = NUM_TILES * TILE_LEN;

	pub type Tile = [[u8; TILE_SIZE]; TILE_SIZE];

	/// Combines the two bit planes of a tile into 2-bit colour indices,
	/// most significant bit leftmost.
	pub fn decodeTile(channelA: &[u8; TILE_SIZE], channelB: &[u8; TILE_SIZE]) -> Tile {
		let mut tile = [[0; TILE_SIZE]; TILE_SIZE];
		for (row, (&a, &b)) in tile.iter_mut().zip(channelA.iter().zip(channelB)) {
			let mut mask = 0x80_u8;
			for (shift, index) in (0..TILE_SIZE as u32).rev().zip(row.iter_mut()) {
				*index = ((a & mask) >> shift) + ((b & mask) >> shift) * 2;
				mask >>= 1;
			}
		}
		tile
	}

	/// Top-left pixel of the `n`th tile of a bank, row-major.
	#[inline]
	pub const fn tilePosition(n: usize) -> (usize, usize) {
		((n % TILE_COLUMNS) * TILE_SIZE, (n / TILE_COLUMNS) * TILE_SIZE)
	}

	pub trait DrawDestination {
		fn widthLog2(&self) -> usize;
		fn putpixel(&mut self, atIndex: usize, withValue: Rgb);

		/// Opaque copy, nothing of the destination shows through.
		fn drawTile(&mut self, x0: usize, y0: usize, tile: &Tile, palette: &Palette) {
			let widthLog2 = self.widthLog2();
			for (y, row) in tile.iter().enumerate() {
				let j = ((y0 + y) << widthLog2) + x0;
				for (x, &index) in row.iter().enumerate() {
					self.putpixel(j + x, palette[index as usize]);
				}
			}
		}
	}

	#[derive(Debug, Clone, PartialEq, Eq)]
	pub struct BankImage {
		data: Vec<Rgb>,
	}

	impl BankImage {
		pub const WIDTH: usize = TILE_COLUMNS * TILE_SIZE;
		pub const HEIGHT: usize = TILE_ROWS * TILE_SIZE;

		fn new() -> Self {
			Self { data: vec![[0; 3]; Self::WIDTH * Self::HEIGHT] }
		}

		#[inline]
		pub fn pixel(&self, x: usize, y: usize) -> Rgb {
			self.data[y * Self::WIDTH + x]
		}

		pub fn pixels(&self) -> &[Rgb] {
			&self.data
		}

		pub fn writePng(&self, writer: impl Write) -> Result<(), png::EncodingError> {
			let mut png = png::Encoder::new(writer, Self::WIDTH as _, Self::HEIGHT as _);
			png.set_color(ColorType::Rgb);
			png.set_depth(BitDepth::Eight);
			let mut writer = png.write_header()?;
			writer.write_image_data(&self.data.concat())?;
			writer.finish()
		}
	}

	impl DrawDestination for BankImage {
		#[inline(always)]
		fn widthLog2(&self) -> usize {
			Self::WIDTH.trailing_zeros() as _
		}
		#[inline(always)]
		fn putpixel(&mut self, atIndex: usize, withValue: Rgb) {
			self.data[atIndex] = withValue;
		}
	}

	/// Consumes exactly one bank from the reader, 8 bytes of channel A then 8 of channel B per tile.
	/// A short read fails the whole bank.
	pub fn decodeBank(reader: &mut impl Read, palette: &Palette) -> io::Result<BankImage> {
		let mut image = BankImage::new();
		let (mut channelA, mut channelB) = ([0; TILE_SIZE], [0; TILE_SIZE]);
		for n in 0..NUM_TILES {
			reader.read_exact(&mut channelA)?;
			reader.read_exact(&mut channelB)?;
			let (x, y) = tilePosition(n);
			image.drawTile(x, y, &decodeTile(&channelA, &channelB), palette);
		}
		Ok(image)
	}

}

use {
	log::{debug, info},
	std::{
		fs::File,
		io::{self, Read, Seek, SeekFrom},
	},
};

/// Seeks to the first CHR bank and decodes `header.chrCount` banks in file order,
/// handing each to `persist` before the next one is read.
/// Returns how many banks were persisted.
pub fn ripChrBanks<R, E>(
	rom: &mut R,
	header: &ines::Header,
	palette: &Palette,
	mut persist: impl FnMut(usize, chr::BankImage) -> Result<(), E>,
) -> Result<usize, E>
where
	R: Read + Seek,
	E: From<io::Error>,
{
	if header.chrCount == 0 {
		return Ok(0);
	}
	let offset = header.chrBanksOffset();
	debug!("first CHR bank at {offset:#X}");
	rom.seek(SeekFrom::Start(offset))?;
	for i in 0..header.chrCount as usize {
		info!("Processing CHR bank {i}");
		persist(i, chr::decodeBank(rom, palette)?)?;
	}
	Ok(header.chrCount as _)
}

#[cfg(unix)]
pub fn stdoutRaw() -> File {
	use std::os::unix::io::FromRawFd;
	unsafe { File::from_raw_fd(1) }
}

#[cfg(windows)]
pub fn stdoutRaw() -> File {
	use std::os::windows::io::{AsRawHandle, FromRawHandle};
	unsafe { File::from_raw_handle(io::stdout().as_raw_handle()) }
}

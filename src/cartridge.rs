use crate::common::*;
use crate::mapper::factory::NameTableMirroring;
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::vec::Vec;
use thiserror::Error;

pub const HEADER_SIZE: usize = 0x10;
/// PRG-ROM header unit.
pub const BANK_SIZE: usize = 0x4000;
/// CHR-ROM header unit, also the PRG-RAM unit.
pub const VBANK_SIZE: usize = 0x2000;

const MAGIC: &[u8] = b"NES\x1A";

#[derive(Debug, Error)]
pub enum CartridgeError {
  #[error("I/O error: {source}")]
  Io {
    #[from]
    source: io::Error,
  },
  #[error("image truncated in {section}: expected {expected} bytes, got {actual}")]
  Truncated {
    section: &'static str,
    expected: usize,
    actual: usize,
  },
  #[error("image has no PRG-ROM banks")]
  NoPrgRom,
}

#[derive(Debug, Clone)]
pub struct Cartridge {
  prg_rom: Vec<Byte>,
  chr_rom: Vec<Byte>,
  name_table_mirroring: NameTableMirroring,
  mapper_number: Byte,
  prg_ram_banks: usize,
  extended_ram: bool,
  battery: bool,
}

struct Header {
  banks: Byte,
  vbanks: Byte,
}

impl Cartridge {
  fn empty() -> Self {
    Self {
      prg_rom: vec![],
      chr_rom: vec![],
      name_table_mirroring: NameTableMirroring::Vertical,
      mapper_number: 0,
      prg_ram_banks: 1,
      extended_ram: false,
      battery: false,
    }
  }

  fn read_from_header(&mut self, header: &[Byte]) -> Result<Header, CartridgeError> {
    if &header[..4] != MAGIC {
      warn!(
        "Missing iNES magic number: {:#x}{:#x}{:#x}{:#x}",
        header[0], header[1], header[2], header[3]
      );
    }
    let banks = header[4];
    if banks == 0 {
      return Err(CartridgeError::NoPrgRom);
    }
    let vbanks = header[5];

    self.name_table_mirroring = if bit_eq(header[6], 0x1) {
      NameTableMirroring::Horizontal
    } else {
      NameTableMirroring::Vertical
    };
    self.mapper_number = ((header[6] >> 4) & 0xF) | (header[7] & 0xF0);
    self.battery = bit_eq(header[6], 0x2);
    // iNES 1.0 treats zero as one 8KB bank for compatibility.
    self.prg_ram_banks = std::cmp::max(header[8] as usize, 1);
    self.extended_ram = self.prg_ram_banks > 0 || self.battery;

    info!(
      "Load header finished. 16KB PRG-ROM Banks: {}, 8KB CHR-ROM Banks: {}",
      banks, vbanks
    );
    info!(
      "Name Table Mirroring: {:?}, Mapper: {}, PRG-RAM Banks: {}, Extended (CPU) RAM: {}",
      self.name_table_mirroring, self.mapper_number, self.prg_ram_banks, self.extended_ram
    );
    if bit_eq(header[6], 0x4) {
      warn!("Trainer flag set, trainer data is not skipped.");
    }
    if bit_eq(header[6], 0x8) {
      warn!("Four-screen VRAM is not supported, using header mirroring.");
    }
    Ok(Header { banks, vbanks })
  }

  pub fn load_from_data(data: &[u8]) -> Result<Self, CartridgeError> {
    Self::load_from_reader(data)
  }

  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
    info!("Reading ROM content from {}", path.as_ref().display());
    let file = File::open(path)?;
    Self::load_from_reader(BufReader::new(file))
  }

  pub fn load_from_reader<R: Read>(mut reader: R) -> Result<Self, CartridgeError> {
    let mut cart = Self::empty();
    let header = read_section(&mut reader, "header", HEADER_SIZE)?;
    let Header { banks, vbanks } = cart.read_from_header(&header)?;

    cart.prg_rom = read_section(&mut reader, "PRG-ROM", BANK_SIZE * banks as usize)?;
    if vbanks != 0 {
      cart.chr_rom = read_section(&mut reader, "CHR-ROM", VBANK_SIZE * vbanks as usize)?;
    } else {
      info!("Cartridge with CHR-RAM");
    }
    Ok(cart)
  }

  pub fn get_rom(&self) -> &[Byte] {
    &self.prg_rom
  }

  pub fn get_vrom(&self) -> &[Byte] {
    &self.chr_rom
  }

  pub fn get_mapper(&self) -> Byte {
    self.mapper_number
  }

  pub fn get_name_table_mirroring(&self) -> NameTableMirroring {
    self.name_table_mirroring
  }

  pub fn prg_ram_banks(&self) -> usize {
    self.prg_ram_banks
  }

  pub fn has_extended_ram(&self) -> bool {
    self.extended_ram
  }

  pub fn has_battery(&self) -> bool {
    self.battery
  }
}

fn read_section<R: Read>(
  reader: &mut R,
  section: &'static str,
  size: usize,
) -> Result<Vec<Byte>, CartridgeError> {
  let mut buf = Vec::with_capacity(size);
  reader.by_ref().take(size as u64).read_to_end(&mut buf)?;
  if buf.len() != size {
    return Err(CartridgeError::Truncated {
      section,
      expected: size,
      actual: buf.len(),
    });
  }
  Ok(buf)
}

/// Builds in-memory iNES images. Every 1KB of PRG and CHR starts with its own
/// 1KB bank index (little endian, two bytes) so tests can tell which bank an
/// access landed in.
#[cfg(test)]
pub(crate) mod test_rom {
  use super::*;

  pub fn header(mapper: Byte, banks: Byte, vbanks: Byte, flags6: Byte, ram_banks: Byte) -> Vec<Byte> {
    let mut header = vec![0; HEADER_SIZE];
    header[..4].copy_from_slice(MAGIC);
    header[4] = banks;
    header[5] = vbanks;
    header[6] = ((mapper & 0xF) << 4) | (flags6 & 0xF);
    header[7] = mapper & 0xF0;
    header[8] = ram_banks;
    header
  }

  pub fn tagged(size: usize) -> Vec<Byte> {
    (0..size)
      .map(|i| match i % KB {
        0 => (i / KB) as Byte,
        1 => ((i / KB) >> 8) as Byte,
        _ => (i % 251) as Byte,
      })
      .collect()
  }

  pub fn image(mapper: Byte, banks: Byte, vbanks: Byte) -> Vec<Byte> {
    let mut data = header(mapper, banks, vbanks, 0, 0);
    data.extend(tagged(BANK_SIZE * banks as usize));
    data.extend(tagged(VBANK_SIZE * vbanks as usize));
    data
  }

  pub fn cartridge(mapper: Byte, banks: Byte, vbanks: Byte) -> Cartridge {
    Cartridge::load_from_data(&image(mapper, banks, vbanks)).unwrap()
  }
}

#[cfg(test)]
mod tests {
  use super::test_rom::*;
  use super::*;

  #[test]
  fn load_header_fields() {
    let mut data = header(0x42, 2, 1, 0x3, 0);
    data.extend(tagged(2 * BANK_SIZE));
    data.extend(tagged(VBANK_SIZE));
    let cart = Cartridge::load_from_data(&data).unwrap();
    assert_eq!(cart.get_mapper(), 0x42);
    assert_eq!(cart.get_rom().len(), 0x8000);
    assert_eq!(cart.get_vrom().len(), 0x2000);
    assert_eq!(cart.get_name_table_mirroring(), NameTableMirroring::Horizontal);
    assert_eq!(cart.prg_ram_banks(), 1);
    assert!(cart.has_battery());
    assert!(cart.has_extended_ram());
  }

  #[test]
  fn vertical_mirroring_and_ram_banks() {
    let mut data = header(4, 1, 0, 0, 4);
    data.extend(tagged(BANK_SIZE));
    let cart = Cartridge::load_from_data(&data).unwrap();
    assert_eq!(cart.get_name_table_mirroring(), NameTableMirroring::Vertical);
    assert_eq!(cart.prg_ram_banks(), 4);
    assert!(!cart.has_battery());
    // Bank count is normalized first, so extended RAM is always reported.
    assert!(cart.has_extended_ram());
  }

  #[test]
  fn chr_ram_cartridge_has_empty_vrom() {
    let cart = cartridge(2, 4, 0);
    assert!(cart.get_vrom().is_empty());
    assert_eq!(cart.get_rom().len(), 4 * BANK_SIZE);
  }

  #[test]
  fn trailing_bytes_are_ignored() {
    let mut data = image(0, 1, 1);
    data.extend(vec![0xff; 100]);
    let cart = Cartridge::load_from_data(&data).unwrap();
    assert_eq!(cart.get_vrom().len(), VBANK_SIZE);
  }

  #[test]
  fn truncated_prg_is_fatal() {
    let mut data = image(0, 2, 0);
    data.truncate(HEADER_SIZE + BANK_SIZE);
    match Cartridge::load_from_data(&data) {
      Err(CartridgeError::Truncated { section, expected, actual }) => {
        assert_eq!(section, "PRG-ROM");
        assert_eq!(expected, 2 * BANK_SIZE);
        assert_eq!(actual, BANK_SIZE);
      }
      other => panic!("unexpected result {:?}", other.map(|c| c.get_mapper())),
    }
  }

  #[test]
  fn truncated_chr_and_header_are_fatal() {
    let mut data = image(3, 1, 2);
    data.pop();
    assert!(matches!(
      Cartridge::load_from_data(&data),
      Err(CartridgeError::Truncated { section: "CHR-ROM", .. })
    ));
    assert!(matches!(
      Cartridge::load_from_data(&data[..8]),
      Err(CartridgeError::Truncated { section: "header", .. })
    ));
  }

  #[test]
  fn zero_prg_banks_rejected() {
    let data = header(0, 0, 1, 0, 0);
    assert!(matches!(
      Cartridge::load_from_data(&data),
      Err(CartridgeError::NoPrgRom)
    ));
  }

  #[test]
  fn unsupported_mapper_still_loads() {
    let cart = cartridge(0x99, 1, 1);
    assert_eq!(cart.get_mapper(), 0x99);
  }

  #[test]
  fn missing_file_is_io_error() {
    assert!(matches!(
      Cartridge::load_from_file("assets/missing.nes"),
      Err(CartridgeError::Io { .. })
    ));
  }
}

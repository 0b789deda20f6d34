pub mod cn_rom;
pub mod factory;
pub mod n_rom;
pub mod sx_rom;
pub mod tx_rom;
pub mod ux_rom;

use log::warn;

use crate::cartridge::{Cartridge, VBANK_SIZE};
use crate::common::*;

use factory::NameTableMirroring;

pub type MapperType = u8;
pub const NROM: MapperType = 0;
pub const SXROM: MapperType = 1;
pub const UXROM: MapperType = 2;
pub const CNROM: MapperType = 3;
pub const TXROM: MapperType = 4;

/// Bank-switching view of a cartridge.
///
/// PRG addresses are in CPU space (0x6000-0xFFFF), CHR addresses in PPU
/// pattern space (0x0000-0x1FFF). Every call completes synchronously; the
/// mirroring and IRQ callbacks handed to the factory run inside the write or
/// CHR access that triggers them and must not call back into the mapper.
pub trait Mapper {
  fn write_prg(&mut self, addr: Address, value: Byte);
  fn read_prg(&self, addr: Address) -> Byte;
  fn write_chr(&mut self, addr: Address, value: Byte);
  /// Mutable because CHR accesses double as the scanline clock on TxROM.
  fn read_chr(&mut self, addr: Address) -> Byte;

  fn get_name_table_mirroring(&self) -> NameTableMirroring;

  fn is_prg_ram_enabled(&self) -> bool {
    true
  }

  fn is_prg_ram_write_protected(&self) -> bool {
    false
  }

  fn has_extended_ram(&self) -> bool;

  fn mapper_type(&self) -> MapperType;

  fn name(&self) -> &'static str;
}

/// CPU-side work RAM at 0x6000-0x7FFF.
pub(crate) struct PrgRam {
  ram: Vec<Byte>,
}

impl PrgRam {
  pub fn new(cart: &Cartridge) -> Self {
    let ram = if cart.has_extended_ram() {
      vec![0; cart.prg_ram_banks() * VBANK_SIZE]
    } else {
      vec![]
    };
    Self { ram }
  }

  #[inline]
  pub fn read(&self, addr: Address, enabled: bool) -> Byte {
    if !enabled || self.ram.is_empty() {
      return 0;
    }
    self.ram[(addr as usize - 0x6000) % self.ram.len()]
  }

  #[inline]
  pub fn write(&mut self, addr: Address, value: Byte, enabled: bool, write_protected: bool) {
    if !enabled || write_protected || self.ram.is_empty() {
      warn!("PRG-RAM write ignored at {:#x}", addr);
      return;
    }
    let len = self.ram.len();
    self.ram[(addr as usize - 0x6000) % len] = value;
  }
}

/// CHR-RAM used in place of CHR-ROM when the image carries none.
pub(crate) fn character_ram(cart: &Cartridge) -> Option<Vec<Byte>> {
  if cart.get_vrom().is_empty() {
    log::info!("Uses character RAM");
    Some(vec![0; VBANK_SIZE])
  } else {
    None
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::cartridge::test_rom;

  #[test]
  fn prg_ram_sized_from_header() {
    let mut data = test_rom::header(0, 1, 1, 0, 2);
    data.extend(test_rom::tagged(0x4000));
    data.extend(test_rom::tagged(0x2000));
    let cart = Cartridge::load_from_data(&data).unwrap();
    let mut ram = PrgRam::new(&cart);
    ram.write(0x7fff, 0x12, true, false);
    ram.write(0x6000, 0x34, true, false);
    assert_eq!(ram.read(0x7fff, true), 0x12);
    assert_eq!(ram.read(0x6000, true), 0x34);
    assert_eq!(ram.ram.len(), 2 * VBANK_SIZE);
  }

  #[test]
  fn prg_ram_flags() {
    let cart = test_rom::cartridge(0, 1, 1);
    let mut ram = PrgRam::new(&cart);
    ram.write(0x6010, 0x55, true, false);
    assert_eq!(ram.read(0x6010, false), 0);
    ram.write(0x6010, 0x66, true, true);
    ram.write(0x6010, 0x77, false, false);
    assert_eq!(ram.read(0x6010, true), 0x55);
  }
}

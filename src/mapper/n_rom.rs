use log::warn;

use crate::cartridge::{Cartridge, BANK_SIZE};
use crate::common::*;
use crate::mapper::Mapper;

use super::factory::NameTableMirroring;
use super::{character_ram, MapperType, PrgRam, NROM};

pub struct NRom<'a> {
  one_bank: bool,
  character_ram: Option<Vec<Byte>>,
  prg_ram: PrgRam,
  cart: &'a Cartridge,
}

impl<'a> NRom<'a> {
  pub fn new(cart: &'a Cartridge) -> Self {
    Self {
      one_bank: cart.get_rom().len() == BANK_SIZE,
      character_ram: character_ram(cart),
      prg_ram: PrgRam::new(cart),
      cart,
    }
  }
}

impl<'a> Mapper for NRom<'a> {
  #[inline]
  fn read_prg(&self, addr: Address) -> Byte {
    match addr {
      0x6000..=0x7fff => self.prg_ram.read(addr, true),
      0x8000..=0xffff => {
        if self.one_bank {
          self.cart.get_rom()[((addr - 0x8000) & 0x3FFF) as usize]
        } else {
          self.cart.get_rom()[(addr - 0x8000) as usize]
        }
      }
      _ => 0,
    }
  }

  #[inline]
  fn write_prg(&mut self, addr: Address, value: Byte) {
    match addr {
      0x6000..=0x7fff => self.prg_ram.write(addr, value, true, false),
      _ => warn!("ROM memory write attempt at {:#x}", addr),
    }
  }

  #[inline]
  fn read_chr(&mut self, addr: Address) -> Byte {
    match &self.character_ram {
      Some(ram) => ram[addr as usize],
      None => self.cart.get_vrom()[addr as usize],
    }
  }

  #[inline]
  fn write_chr(&mut self, addr: Address, value: Byte) {
    match &mut self.character_ram {
      Some(ram) => ram[addr as usize] = value,
      None => warn!("Attempting to write read-only CHR memory on {:#x}", addr),
    }
  }

  #[inline]
  fn has_extended_ram(&self) -> bool {
    self.cart.has_extended_ram()
  }

  #[inline]
  fn get_name_table_mirroring(&self) -> NameTableMirroring {
    self.cart.get_name_table_mirroring()
  }

  fn mapper_type(&self) -> MapperType {
    NROM
  }

  fn name(&self) -> &'static str {
    "NROM"
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cartridge::test_rom;
  use crate::mapper::test_util::{chr_tag, prg_tag};

  #[test]
  fn one_bank_is_mirrored() {
    let cart = test_rom::cartridge(NROM, 1, 1);
    let mapper = NRom::new(&cart);
    assert_eq!(prg_tag(&mapper, 0x8400), 1);
    assert_eq!(prg_tag(&mapper, 0xC400), 1);
    assert_eq!(mapper.read_prg(0xFFFC), cart.get_rom()[0x3FFC]);
  }

  #[test]
  fn two_banks_are_linear() {
    let cart = test_rom::cartridge(NROM, 2, 1);
    let mapper = NRom::new(&cart);
    assert_eq!(prg_tag(&mapper, 0xC000), 16);
    assert_eq!(mapper.read_prg(0xFFFC), cart.get_rom()[0x7FFC]);
  }

  #[test]
  fn rom_writes_dropped() {
    let cart = test_rom::cartridge(NROM, 2, 1);
    let mut mapper = NRom::new(&cart);
    let before = mapper.read_prg(0x8005);
    mapper.write_prg(0x8005, before.wrapping_add(1));
    assert_eq!(mapper.read_prg(0x8005), before);
    let chr = mapper.read_chr(0x0805);
    mapper.write_chr(0x0805, chr.wrapping_add(1));
    assert_eq!(mapper.read_chr(0x0805), chr);
    assert_eq!(chr_tag(&mut mapper, 0x0800), 2);
  }

  #[test]
  fn chr_ram_and_prg_ram() {
    let cart = test_rom::cartridge(NROM, 1, 0);
    let mut mapper = NRom::new(&cart);
    mapper.write_chr(0x1abc, 0x5a);
    assert_eq!(mapper.read_chr(0x1abc), 0x5a);
    mapper.write_prg(0x6123, 0xa5);
    assert_eq!(mapper.read_prg(0x6123), 0xa5);
    assert_eq!(mapper.read_prg(0x4020), 0);
  }
}

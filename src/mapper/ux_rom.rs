use crate::cartridge::{Cartridge, BANK_SIZE};
use crate::common::*;
use crate::mapper::Mapper;
use log::warn;

use super::factory::NameTableMirroring;
use super::{character_ram, MapperType, PrgRam, UXROM};

pub struct UxRom<'a> {
  select_prg: usize,
  character_ram: Option<Vec<Byte>>,
  prg_ram: PrgRam,
  cart: &'a Cartridge,
}

impl<'a> UxRom<'a> {
  pub fn new(cart: &'a Cartridge) -> Self {
    Self {
      select_prg: 0,
      character_ram: character_ram(cart),
      prg_ram: PrgRam::new(cart),
      cart,
    }
  }

  fn read_last_bank(&self, addr: Address) -> Byte {
    self.cart.get_rom()[self.cart.get_rom().len() - BANK_SIZE + addr as usize]
  }
}

impl<'a> Mapper for UxRom<'a> {
  fn read_prg(&self, addr: Address) -> Byte {
    match addr {
      0x6000..=0x7fff => self.prg_ram.read(addr, true),
      0x8000..=0xbfff => {
        self.cart.get_rom()[self.select_prg * BANK_SIZE + (addr & 0x3FFF) as usize]
      }
      0xc000..=0xffff => self.read_last_bank(addr & 0x3FFF),
      _ => 0,
    }
  }

  fn write_prg(&mut self, addr: Address, value: Byte) {
    match addr {
      0x6000..=0x7fff => self.prg_ram.write(addr, value, true, false),
      0x8000..=0xffff => {
        self.select_prg = value as usize % (self.cart.get_rom().len() / BANK_SIZE);
      }
      _ => {}
    }
  }

  fn read_chr(&mut self, addr: Address) -> Byte {
    match &self.character_ram {
      Some(ram) => ram[addr as usize],
      None => self.cart.get_vrom()[addr as usize],
    }
  }

  fn write_chr(&mut self, addr: Address, value: Byte) {
    match &mut self.character_ram {
      Some(ram) => ram[addr as usize] = value,
      None => warn!("Attempting to write read-only CHR memory on {:#x}", addr),
    }
  }

  fn has_extended_ram(&self) -> bool {
    self.cart.has_extended_ram()
  }

  fn get_name_table_mirroring(&self) -> NameTableMirroring {
    self.cart.get_name_table_mirroring()
  }

  fn mapper_type(&self) -> MapperType {
    UXROM
  }

  fn name(&self) -> &'static str {
    "UxROM"
  }
}

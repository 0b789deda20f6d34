use log::warn;

use crate::cartridge::{Cartridge, BANK_SIZE, VBANK_SIZE};
use crate::common::*;
use crate::mapper::Mapper;

use super::factory::NameTableMirroring;
use super::{character_ram, MapperType, PrgRam, CNROM};

pub struct CnRom<'a> {
  one_bank: bool,
  select_chr: usize,
  character_ram: Option<Vec<Byte>>,
  prg_ram: PrgRam,
  cart: &'a Cartridge,
}

impl<'a> CnRom<'a> {
  pub fn new(cart: &'a Cartridge) -> Self {
    Self {
      one_bank: cart.get_rom().len() == BANK_SIZE,
      select_chr: 0,
      character_ram: character_ram(cart),
      prg_ram: PrgRam::new(cart),
      cart,
    }
  }
}

impl<'a> Mapper for CnRom<'a> {
  fn read_prg(&self, addr: Address) -> Byte {
    match addr {
      0x6000..=0x7fff => self.prg_ram.read(addr, true),
      0x8000..=0xffff => {
        let target_addr = if !self.one_bank {
          addr - 0x8000
        } else {
          (addr - 0x8000) & 0x3FFF
        };
        self.cart.get_rom()[target_addr as usize]
      }
      _ => 0,
    }
  }

  fn write_prg(&mut self, addr: Address, value: Byte) {
    match addr {
      0x6000..=0x7fff => self.prg_ram.write(addr, value, true, false),
      0x8000..=0xffff => {
        let banks = std::cmp::max(self.cart.get_vrom().len() / VBANK_SIZE, 1);
        self.select_chr = (value & 0x3) as usize % banks;
      }
      _ => {}
    }
  }

  fn read_chr(&mut self, addr: Address) -> Byte {
    match &self.character_ram {
      Some(ram) => ram[addr as usize],
      None => self.cart.get_vrom()[addr as usize | (self.select_chr * VBANK_SIZE)],
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
    CNROM
  }

  fn name(&self) -> &'static str {
    "CNROM"
  }
}

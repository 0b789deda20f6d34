use log::{debug, warn};

use crate::cartridge::{Cartridge, BANK_SIZE};
use crate::common::{bit_eq, Address, Byte};
use crate::mapper::{character_ram, MapperType, PrgRam, SXROM};

use super::{
  factory::{MirrorCallback, NameTableMirroring},
  Mapper,
};

const CHR_BANK_SIZE: usize = 0x1000;

/**
 * MMC1 mapper
 */
pub struct SxRom<'a> {
  character_ram: Option<Vec<Byte>>,
  prg_ram: PrgRam,
  cart: &'a Cartridge,
  mirror_cb: MirrorCallback,
  mirroring: NameTableMirroring,

  mode_chr: Byte,
  mode_prg: Byte,

  temp_register: Byte,
  write_counter: u8,

  reg_prg: Byte,
  reg_chr0: Byte,
  reg_chr1: Byte,
  prg_ram_enabled: bool,

  first_bank_prg: usize,  // offset of rom
  second_bank_prg: usize, // offset of rom

  first_bank_chr: usize,  // offset of vrom or character ram
  second_bank_chr: usize, // offset of vrom or character ram
}

impl<'a> SxRom<'a> {
  pub fn new(cart: &'a Cartridge, mirror_cb: MirrorCallback) -> Self {
    let mut ret = Self {
      character_ram: character_ram(cart),
      prg_ram: PrgRam::new(cart),
      cart,
      mirror_cb,
      mirroring: cart.get_name_table_mirroring(),
      mode_chr: 0,
      mode_prg: 3,
      temp_register: 0,
      write_counter: 0,
      reg_prg: 0,
      reg_chr0: 0,
      reg_chr1: 0,
      prg_ram_enabled: true,

      first_bank_prg: 0,
      second_bank_prg: 0,
      first_bank_chr: 0,
      second_bank_chr: 0,
    };
    ret.calculate_prg_pointers();
    ret.calculate_chr_pointers();
    ret
  }

  fn chr_len(&self) -> usize {
    match &self.character_ram {
      Some(ram) => ram.len(),
      None => self.cart.get_vrom().len(),
    }
  }

  fn calculate_prg_pointers(&mut self) {
    let rom_len = self.cart.get_rom().len();
    let banks = rom_len / BANK_SIZE;
    if self.mode_prg <= 1 {
      // 32KB changeable, an odd trailing bank still forms a pair
      let pairs = (banks + 1) / 2;
      self.first_bank_prg = 2 * BANK_SIZE * ((self.reg_prg >> 1) as usize % pairs);
      self.second_bank_prg = (self.first_bank_prg + BANK_SIZE) % rom_len;
    } else if self.mode_prg == 2 {
      // first fixed, second switchable
      self.first_bank_prg = 0;
      self.second_bank_prg = BANK_SIZE * (self.reg_prg as usize % banks);
    } else {
      // first switchable, second fixed
      self.first_bank_prg = BANK_SIZE * (self.reg_prg as usize % banks);
      self.second_bank_prg = rom_len - BANK_SIZE;
    }
  }

  fn calculate_chr_pointers(&mut self) {
    let banks = std::cmp::max(self.chr_len() / CHR_BANK_SIZE, 2);
    if self.mode_chr == 0 {
      // one 8KB bank
      self.first_bank_chr = CHR_BANK_SIZE * ((self.reg_chr0 & 0x1e) as usize % banks);
      self.second_bank_chr = self.first_bank_chr + CHR_BANK_SIZE;
    } else {
      // two 4KB banks
      self.first_bank_chr = CHR_BANK_SIZE * (self.reg_chr0 as usize % banks);
      self.second_bank_chr = CHR_BANK_SIZE * (self.reg_chr1 as usize % banks);
    }
  }

  fn write_register(&mut self, addr: Address) {
    if addr <= 0x9fff {
      self.mirroring = match self.temp_register & 0x3 {
        0 => NameTableMirroring::OneScreenLower,
        1 => NameTableMirroring::OneScreenHigher,
        2 => NameTableMirroring::Vertical,
        _ => NameTableMirroring::Horizontal,
      };
      (self.mirror_cb)();

      self.mode_chr = (self.temp_register & 0x10) >> 4;
      self.mode_prg = (self.temp_register & 0xc) >> 2;
    } else if addr <= 0xbfff {
      self.reg_chr0 = self.temp_register;
    } else if addr <= 0xdfff {
      self.reg_chr1 = self.temp_register;
    } else {
      self.prg_ram_enabled = !bit_eq(self.temp_register, 0x10);
      debug!("PRG-RAM enabled: {}", self.prg_ram_enabled);
      self.reg_prg = self.temp_register & 0xf;
    }
    self.calculate_prg_pointers();
    self.calculate_chr_pointers();
  }
}

impl<'a> Mapper for SxRom<'a> {
  fn write_prg(&mut self, addr: Address, value: Byte) {
    if addr < 0x8000 {
      if addr >= 0x6000 {
        self.prg_ram.write(addr, value, self.prg_ram_enabled, false);
      }
      return;
    }
    if !bit_eq(value, 0x80) {
      // reset bit not set.
      self.temp_register = (self.temp_register >> 1) | ((value & 1) << 4);
      self.write_counter += 1;

      if self.write_counter == 5 {
        self.write_register(addr);
        self.temp_register = 0;
        self.write_counter = 0;
      }
    } else {
      // reset
      self.temp_register = 0;
      self.write_counter = 0;
      self.mode_prg = 3;
      self.calculate_prg_pointers();
    }
  }

  fn read_prg(&self, addr: Address) -> Byte {
    match addr {
      0x6000..=0x7fff => self.prg_ram.read(addr, self.prg_ram_enabled),
      0x8000..=0xbfff => self.cart.get_rom()[self.first_bank_prg + (addr & 0x3FFF) as usize],
      0xc000..=0xffff => self.cart.get_rom()[self.second_bank_prg + (addr & 0x3FFF) as usize],
      _ => 0,
    }
  }

  fn write_chr(&mut self, addr: Address, value: Byte) {
    let offset = if addr < CHR_BANK_SIZE as Address {
      self.first_bank_chr + addr as usize
    } else {
      self.second_bank_chr + (addr & 0xfff) as usize
    };
    match &mut self.character_ram {
      Some(ram) => ram[offset] = value,
      None => warn!("Attempting to write read-only CHR memory on {:#x}", addr),
    }
  }

  fn read_chr(&mut self, addr: Address) -> Byte {
    let offset = if addr < CHR_BANK_SIZE as Address {
      self.first_bank_chr + addr as usize
    } else {
      self.second_bank_chr + (addr & 0xfff) as usize
    };
    match &self.character_ram {
      Some(ram) => ram[offset],
      None => self.cart.get_vrom()[offset],
    }
  }

  fn get_name_table_mirroring(&self) -> NameTableMirroring {
    self.mirroring
  }

  fn is_prg_ram_enabled(&self) -> bool {
    self.prg_ram_enabled
  }

  fn has_extended_ram(&self) -> bool {
    self.cart.has_extended_ram()
  }

  fn mapper_type(&self) -> MapperType {
    SXROM
  }

  fn name(&self) -> &'static str {
    "SxROM"
  }
}

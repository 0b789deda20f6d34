use crate::{
  cartridge::Cartridge,
  common::{bit_eq, Address, Byte, KB},
};

use super::{
  character_ram,
  factory::{IRQCallback, MirrorCallback, NameTableMirroring},
  Mapper, MapperType, PrgRam, TXROM,
};
use log::{debug, warn};

const PRG_BANK_SIZE: usize = 8 * KB;
const CHR_BANK_SIZE: usize = KB;
/// Consecutive A12-low CHR accesses required before a rising edge counts.
const A12_LOW_THRESHOLD: u8 = 3;

/**
 * MMC3 mapper
 */
pub struct TxRom<'a> {
  cart: &'a Cartridge,
  mirror_cb: MirrorCallback,
  interrupt_cb: IRQCallback,
  mirroring: NameTableMirroring,

  target_register: usize,
  bank_register: [Byte; 8],
  prg_bank_mode: bool,
  chr_inversion: bool,

  prg_banks: [usize; 4],
  chr_banks: [usize; 8],
  character_ram: Option<Vec<Byte>>,

  irq_latch: Byte,
  irq_counter: Byte,
  irq_reload_pending: bool,
  irq_enable: bool,
  irq_active: bool,
  prev_a12: bool,
  a12_low_count: u8,

  prg_ram: PrgRam,
  prg_ram_enabled: bool,
  prg_ram_write_protect: bool,
}

impl<'a> TxRom<'a> {
  pub fn new(cart: &'a Cartridge, mirror_cb: MirrorCallback, interrupt_cb: IRQCallback) -> Self {
    let mut ret = TxRom {
      cart,
      mirror_cb,
      interrupt_cb,
      mirroring: cart.get_name_table_mirroring(),
      target_register: 0,
      bank_register: [0; 8],
      prg_bank_mode: false,
      chr_inversion: false,
      prg_banks: [0; 4],
      chr_banks: [0; 8],
      character_ram: character_ram(cart),
      irq_latch: 0,
      irq_counter: 0,
      irq_reload_pending: false,
      irq_enable: false,
      irq_active: false,
      prev_a12: false,
      a12_low_count: 0,
      prg_ram: PrgRam::new(cart),
      prg_ram_enabled: true,
      prg_ram_write_protect: false,
    };
    ret.update_banks();
    ret
  }

  /// Whether an IRQ has been raised and not yet acknowledged via 0xE000.
  pub fn irq_pending(&self) -> bool {
    self.irq_active
  }

  fn chr_len(&self) -> usize {
    match &self.character_ram {
      Some(ram) => ram.len(),
      None => self.cart.get_vrom().len(),
    }
  }

  fn update_banks(&mut self) {
    let prg_size = self.cart.get_rom().len();
    let last_bank = prg_size - PRG_BANK_SIZE;
    let second_last_bank = prg_size - 2 * PRG_BANK_SIZE;

    let prg_banks_total = prg_size / PRG_BANK_SIZE;
    let r6 = self.bank_register[6] as usize % prg_banks_total;
    let r7 = self.bank_register[7] as usize % prg_banks_total;

    if !self.prg_bank_mode {
      self.prg_banks[0] = r6 * PRG_BANK_SIZE;
      self.prg_banks[1] = r7 * PRG_BANK_SIZE;
      self.prg_banks[2] = second_last_bank;
    } else {
      self.prg_banks[0] = second_last_bank;
      self.prg_banks[1] = r7 * PRG_BANK_SIZE;
      self.prg_banks[2] = r6 * PRG_BANK_SIZE;
    }
    self.prg_banks[3] = last_bank;

    let chr_banks_total = self.chr_len() / CHR_BANK_SIZE;
    let mut r = [0usize; 6];
    for (i, reg) in r.iter_mut().enumerate() {
      *reg = self.bank_register[i] as usize % chr_banks_total;
    }

    // 2KB pairs go low unless inverted, 1KB banks take the other half.
    let (pairs, singles) = if !self.chr_inversion { (0, 4) } else { (4, 0) };
    // Ignore the lowest bit so pairs stay 2KB aligned.
    self.chr_banks[pairs] = (r[0] & !1) * CHR_BANK_SIZE;
    self.chr_banks[pairs + 1] = self.chr_banks[pairs] + CHR_BANK_SIZE;
    self.chr_banks[pairs + 2] = (r[1] & !1) * CHR_BANK_SIZE;
    self.chr_banks[pairs + 3] = self.chr_banks[pairs + 2] + CHR_BANK_SIZE;
    for i in 0..4 {
      self.chr_banks[singles + i] = r[2 + i] * CHR_BANK_SIZE;
    }
  }

  /// Scanline counter clocked by rising edges of PPU A12, filtered so that
  /// only an edge after a sustained low period counts.
  fn clock_irq(&mut self, addr: Address) {
    let a12 = bit_eq(addr, 0x1000);
    if !a12 && self.a12_low_count < A12_LOW_THRESHOLD {
      self.a12_low_count += 1;
    }
    if a12 && !self.prev_a12 && self.a12_low_count >= A12_LOW_THRESHOLD {
      if self.irq_counter == 0 || self.irq_reload_pending {
        self.irq_counter = self.irq_latch;
        self.irq_reload_pending = false;
      } else {
        self.irq_counter -= 1;
      }
      if self.irq_counter == 0 && self.irq_enable && !self.irq_active {
        self.irq_active = true;
        debug!("MMC3 IRQ raised");
        (self.interrupt_cb)();
      }
    }
    if a12 {
      self.a12_low_count = 0;
    }
    self.prev_a12 = a12;
  }
}

impl<'a> Mapper for TxRom<'a> {
  fn write_prg(&mut self, addr: Address, value: Byte) {
    if (0x6000..0x8000).contains(&addr) {
      self
        .prg_ram
        .write(addr, value, self.prg_ram_enabled, self.prg_ram_write_protect);
      return;
    }
    match addr & 0xe001 {
      0x8000 => {
        self.target_register = (value & 0x7) as usize;
        self.prg_bank_mode = bit_eq(value, 0x40);
        self.chr_inversion = bit_eq(value, 0x80);
        self.update_banks();
      }
      0x8001 => {
        self.bank_register[self.target_register] = value;
        self.update_banks();
      }
      0xa000 => {
        self.mirroring = if bit_eq(value, 0x01) {
          NameTableMirroring::Horizontal
        } else {
          NameTableMirroring::Vertical
        };
        (self.mirror_cb)();
      }
      0xa001 => {
        self.prg_ram_write_protect = bit_eq(value, 0x40);
        self.prg_ram_enabled = bit_eq(value, 0x80);
      }
      0xc000 => self.irq_latch = value,
      0xc001 => {
        self.irq_counter = 0;
        self.irq_reload_pending = true;
      }
      0xe000 => {
        self.irq_enable = false;
        // acknowledge pending interrupt
        self.irq_active = false;
      }
      0xe001 => self.irq_enable = true,
      _ => debug!("Ignored MMC3 write {:#x} at {:#x}", value, addr),
    }
  }

  fn read_prg(&self, addr: Address) -> Byte {
    let offset = (addr & 0x1fff) as usize;
    match addr {
      0x6000..=0x7fff => self.prg_ram.read(addr, self.prg_ram_enabled),
      0x8000..=0x9fff => self.cart.get_rom()[self.prg_banks[0] + offset],
      0xa000..=0xbfff => self.cart.get_rom()[self.prg_banks[1] + offset],
      0xc000..=0xdfff => self.cart.get_rom()[self.prg_banks[2] + offset],
      0xe000..=0xffff => self.cart.get_rom()[self.prg_banks[3] + offset],
      _ => 0,
    }
  }

  fn write_chr(&mut self, addr: Address, value: Byte) {
    self.clock_irq(addr);
    match &mut self.character_ram {
      Some(ram) => ram[addr as usize] = value,
      None => warn!("Read-only CHR memory write attempt at {:#x}", addr),
    }
  }

  fn read_chr(&mut self, addr: Address) -> Byte {
    self.clock_irq(addr);
    match &self.character_ram {
      Some(ram) => ram[addr as usize],
      None => {
        let bank = self.chr_banks[(addr >> 10) as usize];
        self.cart.get_vrom()[bank + (addr & 0x3ff) as usize]
      }
    }
  }

  fn get_name_table_mirroring(&self) -> NameTableMirroring {
    self.mirroring
  }

  fn is_prg_ram_enabled(&self) -> bool {
    self.prg_ram_enabled
  }

  fn is_prg_ram_write_protected(&self) -> bool {
    self.prg_ram_write_protect
  }

  fn has_extended_ram(&self) -> bool {
    self.cart.has_extended_ram()
  }

  fn mapper_type(&self) -> MapperType {
    TXROM
  }

  fn name(&self) -> &'static str {
    "TxROM"
  }
}

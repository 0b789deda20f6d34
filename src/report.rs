use std::fmt;

use serde::Serialize;

use crate::cartridge::Cartridge;
use crate::common::{Address, Byte};
use crate::mapper::factory::NameTableMirroring;
use crate::mapper::Mapper;

const RESET_VECTOR: Address = 0xFFFC;

#[derive(Debug, Serialize)]
pub struct CartridgeSummary {
  pub mapper: Byte,
  pub mapper_name: &'static str,
  pub prg_rom_size: usize,
  pub chr_rom_size: usize,
  pub chr_ram: bool,
  pub mirroring: NameTableMirroring,
  pub prg_ram_banks: usize,
  pub extended_ram: bool,
  pub battery: bool,
  pub reset_vector: Address,
  pub prg_dump: Vec<Byte>,
}

impl CartridgeSummary {
  /// Reads through the mapper, so banks reflect its power-on state.
  pub fn new(cart: &Cartridge, mapper: &dyn Mapper, dump_len: usize) -> Self {
    let reset_vector =
      mapper.read_prg(RESET_VECTOR) as Address | (mapper.read_prg(RESET_VECTOR + 1) as Address) << 8;
    let prg_dump = (0..dump_len.min(0x8000))
      .map(|i| mapper.read_prg(0x8000 + i as Address))
      .collect();
    Self {
      mapper: cart.get_mapper(),
      mapper_name: mapper.name(),
      prg_rom_size: cart.get_rom().len(),
      chr_rom_size: cart.get_vrom().len(),
      chr_ram: cart.get_vrom().is_empty(),
      mirroring: mapper.get_name_table_mirroring(),
      prg_ram_banks: cart.prg_ram_banks(),
      extended_ram: cart.has_extended_ram(),
      battery: cart.has_battery(),
      reset_vector,
      prg_dump,
    }
  }
}

impl fmt::Display for CartridgeSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Mapper:        {} ({})", self.mapper, self.mapper_name)?;
    writeln!(f, "PRG-ROM:       {} KB", self.prg_rom_size / 1024)?;
    if self.chr_ram {
      writeln!(f, "CHR:           8 KB RAM")?;
    } else {
      writeln!(f, "CHR-ROM:       {} KB", self.chr_rom_size / 1024)?;
    }
    writeln!(f, "Mirroring:     {:?}", self.mirroring)?;
    writeln!(f, "PRG-RAM banks: {}", self.prg_ram_banks)?;
    writeln!(f, "Extended RAM:  {}", self.extended_ram)?;
    writeln!(f, "Battery:       {}", self.battery)?;
    writeln!(f, "Reset vector:  {:#06x}", self.reset_vector)?;
    if !self.prg_dump.is_empty() {
      write!(f, "PRG @ 0x8000: ")?;
      for byte in &self.prg_dump {
        write!(f, " {:02x}", byte)?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cartridge::test_rom;
  use crate::mapper::factory::create_mapper;

  #[test]
  fn summary_reads_through_mapper() {
    let cart = test_rom::cartridge(4, 2, 0);
    let mapper = create_mapper(&cart, Box::new(|| {}), Box::new(|| {})).unwrap();
    let summary = CartridgeSummary::new(&cart, mapper.as_ref(), 4);
    assert_eq!(summary.mapper_name, "TxROM");
    assert!(summary.chr_ram);
    let rom = cart.get_rom();
    let expected = rom[0x7FFC] as Address | (rom[0x7FFD] as Address) << 8;
    assert_eq!(summary.reset_vector, expected);
    assert_eq!(summary.prg_dump, rom[..4].to_vec());

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["mapper"], 4);
    assert_eq!(json["mirroring"], "Vertical");
    assert!(summary.to_string().contains("TxROM"));
  }
}

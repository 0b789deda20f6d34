use serde::Serialize;

use crate::cartridge::Cartridge;
use crate::mapper::cn_rom::CnRom;
use crate::mapper::n_rom::NRom;
use crate::mapper::sx_rom::SxRom;
use crate::mapper::tx_rom::TxRom;
use crate::mapper::ux_rom::UxRom;
use crate::mapper::Mapper;

use super::{CNROM, NROM, SXROM, TXROM, UXROM};

/// Fired after the mapper changes its mirroring; the receiver re-reads
/// `Mapper::get_name_table_mirroring`.
pub type MirrorCallback = Box<dyn FnMut()>;
/// Fired when the mapper asserts its IRQ line.
pub type IRQCallback = Box<dyn FnMut()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NameTableMirroring {
  Horizontal,
  Vertical,
  OneScreenLower,
  OneScreenHigher,
}

/// Returns `None` for mapper ids without an implementation; the caller must
/// reject such a cartridge.
pub fn create_mapper<'a>(
  cartridge: &'a Cartridge,
  mirror_cb: MirrorCallback,
  irq_cb: IRQCallback,
) -> Option<Box<dyn Mapper + 'a>> {
  let mapper_type = cartridge.get_mapper();
  match mapper_type {
    NROM => Some(Box::new(NRom::new(cartridge))),
    SXROM => Some(Box::new(SxRom::new(cartridge, mirror_cb))),
    UXROM => Some(Box::new(UxRom::new(cartridge))),
    CNROM => Some(Box::new(CnRom::new(cartridge))),
    TXROM => Some(Box::new(TxRom::new(cartridge, mirror_cb, irq_cb))),
    _ => {
      log::error!("unsupported mapper type {}", mapper_type);
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cartridge::test_rom;

  fn build(mapper: u8) -> Option<&'static str> {
    let cart = test_rom::cartridge(mapper, 2, 1);
    create_mapper(&cart, Box::new(|| {}), Box::new(|| {})).map(|m| {
      assert_eq!(m.mapper_type(), mapper);
      m.name()
    })
  }

  #[test]
  fn dispatch_on_mapper_id() {
    assert_eq!(build(NROM), Some("NROM"));
    assert_eq!(build(SXROM), Some("SxROM"));
    assert_eq!(build(UXROM), Some("UxROM"));
    assert_eq!(build(CNROM), Some("CNROM"));
    assert_eq!(build(TXROM), Some("TxROM"));
  }

  #[test]
  fn unsupported_ids_yield_no_mapper() {
    for id in [5u8, 7, 9, 66, 0xff].iter() {
      assert_eq!(build(*id), None);
    }
  }
}

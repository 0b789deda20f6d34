pub mod cartridge;
pub mod common;
pub mod config;
pub mod logger;
pub mod mapper;
pub mod report;

pub type NesError = anyhow::Error;
pub type NesResult<T> = anyhow::Result<T, NesError>;

#[macro_use]
extern crate ini;
extern crate serde;

pub use cartridge::{Cartridge, CartridgeError};
pub use mapper::factory::{create_mapper, IRQCallback, MirrorCallback, NameTableMirroring};
pub use mapper::Mapper;

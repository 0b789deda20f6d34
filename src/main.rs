use anyhow::{anyhow, Context};
use clap::Parser;
use log::{info, LevelFilter};
use std::str::FromStr;

use nes_cart::{
  config::{OutputFormat, RuntimeConfig},
  create_mapper, logger,
  report::CartridgeSummary,
  Cartridge, NesResult,
};

#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Args {
  /// iNES image to inspect
  rom_path: String,

  #[clap(short, long, default_value = "assets/cartinfo.ini")]
  config: String,

  /// Print the summary as JSON
  #[clap(short, long)]
  json: bool,

  #[clap(short, long)]
  log_level: Option<String>,

  /// PRG bytes to dump from 0x8000
  #[clap(short, long)]
  dump: Option<usize>,
}

fn run(args: Args) -> NesResult<()> {
  let mut config = RuntimeConfig::load(&args.config)?;
  if let Some(level) = &args.log_level {
    config.log_level =
      LevelFilter::from_str(level).map_err(|_| anyhow!("unknown log level '{}'", level))?;
  }
  if args.json {
    config.output = OutputFormat::Json;
  }
  if let Some(dump) = args.dump {
    config.dump_len = dump;
  }
  log::set_max_level(config.log_level);

  let cart = Cartridge::load_from_file(&args.rom_path)
    .with_context(|| format!("failed to load {}", args.rom_path))?;
  let mapper = create_mapper(
    &cart,
    Box::new(|| info!("Name table mirroring changed")),
    Box::new(|| info!("IRQ raised")),
  )
  .ok_or_else(|| anyhow!("unsupported mapper {}", cart.get_mapper()))?;

  let summary = CartridgeSummary::new(&cart, mapper.as_ref(), config.dump_len);
  match config.output {
    OutputFormat::Text => print!("{}", summary),
    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
  }
  Ok(())
}

fn main() {
  // an already installed logger is kept
  let _ = logger::init(LevelFilter::Info);
  let args = Args::parse();
  if let Err(e) = run(args) {
    log::error!("{:#}", e);
    std::process::exit(1);
  }
}

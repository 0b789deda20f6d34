use log::{LevelFilter, Metadata, SetLoggerError};

struct SimpleLogger;

impl log::Log for SimpleLogger {
  fn enabled(&self, metadata: &Metadata) -> bool {
    metadata.level() <= log::max_level()
  }
  fn log(&self, rec: &log::Record) {
    if !self.enabled(rec.metadata()) {
      return;
    }
    let log_str = format!(
      "[{}] {}:{} {}",
      rec.level(),
      rec.file().unwrap_or("unknown file"),
      rec.line().unwrap_or(0),
      rec.args()
    );
    eprintln!("{}", log_str)
  }
  fn flush(&self) {}
}

/// Install the stderr logger. Fails if another logger is already set, which
/// tests hit routinely and may ignore.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
  log::set_boxed_logger(Box::new(SimpleLogger))?;
  log::set_max_level(level);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn second_init_is_rejected_but_harmless() {
    let _ = init(LevelFilter::Debug);
    assert!(init(LevelFilter::Info).is_err());
    log::info!("still logging after a rejected init");
  }
}

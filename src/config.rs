use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::anyhow;
use log::{info, LevelFilter};

use crate::NesResult;

type IniSections = HashMap<String, HashMap<String, Option<String>>>;

const DEFAULT_DUMP_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  Text,
  Json,
}

impl FromStr for OutputFormat {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "text" => Ok(OutputFormat::Text),
      "json" => Ok(OutputFormat::Json),
      other => Err(anyhow!("unknown output format '{}'", other)),
    }
  }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
  pub log_level: LevelFilter,
  pub output: OutputFormat,
  /// Number of PRG bytes from 0x8000 to include in the report.
  pub dump_len: usize,
}

impl Default for RuntimeConfig {
  fn default() -> Self {
    Self {
      log_level: LevelFilter::Info,
      output: OutputFormat::Text,
      dump_len: DEFAULT_DUMP_LEN,
    }
  }
}

fn lookup<'s>(sections: &'s IniSections, section: &str, key: &str) -> Option<&'s str> {
  sections
    .get(section)
    .and_then(|keys| keys.get(key))
    .and_then(|value| value.as_deref())
}

impl RuntimeConfig {
  /// Read an INI file. A missing file yields the defaults.
  pub fn load(path: &str) -> NesResult<Self> {
    if !Path::new(path).exists() {
      info!("No config at {}, using defaults", path);
      return Ok(Self::default());
    }
    let sections = ini!(safe path).map_err(|e| anyhow!("failed to parse {}: {}", path, e))?;
    Self::from_sections(&sections)
  }

  pub(crate) fn from_sections(sections: &IniSections) -> NesResult<Self> {
    let mut config = Self::default();
    if let Some(level) = lookup(sections, "log", "level") {
      config.log_level = LevelFilter::from_str(level.trim())
        .map_err(|_| anyhow!("unknown log level '{}'", level))?;
    }
    if let Some(format) = lookup(sections, "output", "format") {
      config.output = format.parse()?;
    }
    if let Some(dump) = lookup(sections, "output", "dump") {
      config.dump_len = dump
        .trim()
        .parse()
        .map_err(|e| anyhow!("invalid dump length '{}': {}", dump, e))?;
    }
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_when_sections_missing() {
    let sections = IniSections::new();
    let config = RuntimeConfig::from_sections(&sections).unwrap();
    assert_eq!(config.log_level, LevelFilter::Info);
    assert_eq!(config.output, OutputFormat::Text);
    assert_eq!(config.dump_len, DEFAULT_DUMP_LEN);
  }

  #[test]
  fn parse_all_keys() {
    let content = "[log]\nlevel = debug\n[output]\nformat = json\ndump = 4\n";
    let sections = inistr!(content);
    let config = RuntimeConfig::from_sections(&sections).unwrap();
    assert_eq!(config.log_level, LevelFilter::Debug);
    assert_eq!(config.output, OutputFormat::Json);
    assert_eq!(config.dump_len, 4);
  }

  #[test]
  fn reject_bad_values() {
    let content = "[output]\nformat = xml\n";
    let sections = inistr!(content);
    assert!(RuntimeConfig::from_sections(&sections).is_err());

    let content = "[log]\nlevel = loud\n";
    let sections = inistr!(content);
    assert!(RuntimeConfig::from_sections(&sections).is_err());
  }

  #[test]
  fn missing_file_uses_defaults() {
    let config = RuntimeConfig::load("does/not/exist.ini").unwrap();
    assert_eq!(config.output, OutputFormat::Text);
  }
}

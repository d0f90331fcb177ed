use anyhow::{Context, Result};
use cardledger_ingest::discovery::{DEFAULT_IMPORT_SUFFIX, DEFAULT_STATEMENT_PATTERN};
use cardledger_ingest::text_source::{DEFAULT_EXTRACT_COMMAND, DEFAULT_EXTRACT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::{cardledger_home, ensure_cardledger_home, home_dir};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanSection,
    pub extract: ExtractSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Folder searched by `cardledger scan` (default: ~/Downloads)
    pub folder: PathBuf,
    /// Regex the whole file name must match
    pub filename_pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSection {
    /// PDF-to-text tool, invoked as `<command> -layout -enc UTF-8 <pdf> <txt>`
    pub command: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Replaces the document extension in the output file name
    pub suffix: String,
}

impl Default for ScanSection {
    fn default() -> Self {
        let folder = home_dir()
            .map(|h| h.join("Downloads"))
            .unwrap_or_else(|_| PathBuf::from("."));
        Self {
            folder,
            filename_pattern: DEFAULT_STATEMENT_PATTERN.to_string(),
        }
    }
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            command: DEFAULT_EXTRACT_COMMAND.to_string(),
            timeout_secs: DEFAULT_EXTRACT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_IMPORT_SUFFIX.to_string(),
        }
    }
}

impl ExtractSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(cardledger_home()?.join("config.toml"))
}

/// Load `path` (or ~/.cardledger/config.toml). A missing file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !p.exists() {
        log::debug!("no config at {}; using defaults", p.display());
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => ensure_cardledger_home()?.join("config.toml"),
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg = parse_config("[extract]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(cfg.extract.timeout(), Duration::from_secs(5));
        assert_eq!(cfg.extract.command, "pdftotext");
        assert_eq!(cfg.output.suffix, "_ImportThis.csv");
        assert_eq!(cfg.scan.filename_pattern, DEFAULT_STATEMENT_PATTERN);
    }

    #[test]
    fn test_config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.scan.folder = PathBuf::from("/data/statements");
        cfg.output.suffix = ".import.csv".to_string();
        save_config(&cfg, &path).unwrap();

        assert_eq!(load_config(Some(&path)).unwrap(), cfg);
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg.extract.command, "pdftotext");
    }

    #[test]
    fn test_bad_config_is_error() {
        assert!(parse_config("[extract]\ntimeout_secs = \"soon\"\n").is_err());
    }
}

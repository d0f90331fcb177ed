use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home))
}

pub fn cardledger_home() -> Result<PathBuf> {
    Ok(home_dir()?.join(".cardledger"))
}

pub fn ensure_cardledger_home() -> Result<PathBuf> {
    let dir = cardledger_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

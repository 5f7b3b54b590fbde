use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$NESTEGG_HOME`, or `~/.nestegg`.
pub fn nestegg_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("NESTEGG_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".nestegg"))
}

pub fn ensure_nestegg_home() -> Result<PathBuf> {
    let dir = nestegg_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_data_path() -> Result<PathBuf> {
    Ok(ensure_nestegg_home()?.join("data.json"))
}

//! Utility helpers shared across aeagle.
//!
//! TOML loading, test-name extraction from source paths and the loose,
//! case-insensitive matching used for serial banners.

use anyhow::{Context, Result};
use log::error;
use serde::de::DeserializeOwned;
use std::{fs, path::Path};

/// Reads a TOML file into an arbitrary struct.
///
/// # Errors
///
/// Returns an error if the file cannot be read or data parsing fails.
pub fn read_toml_from_file<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read TOML file: {}", path.display()))?;
    let config: T = match toml::de::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse TOML file {}: {e}", path.display());
            return Err(e).with_context(|| format!("Invalid TOML in {}", path.display()));
        }
    };
    Ok(config)
}

/// 从文件路径获取测试名称
///
/// Returns the file stem when `path` carries the wanted extension.
pub fn get_test_name_from_path(path: &Path, extension: &str) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(extension) {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// True when `line` mentions `test` and `token`, ignoring case.
pub fn mentions(line: &str, test: &str, token: &str) -> bool {
    let lowercase = line.to_lowercase();
    lowercase.contains(&test.to_lowercase()) && lowercase.contains(&token.to_lowercase())
}

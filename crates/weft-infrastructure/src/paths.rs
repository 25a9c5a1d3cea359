//! Unified path management for weft files.
//!
//! ```text
//! ~/.config/weft/          # Config directory
//! └── config.toml          # Settings (see `config`)
//!
//! ~/.local/share/weft/     # Data directory
//! └── archive.json         # Default archive file
//! ```

use std::path::PathBuf;
use weft_core::{Result, WeftError};

const APP_DIR: &str = "weft";

pub struct WeftPaths;

impl WeftPaths {
    /// Returns the weft configuration directory (e.g. `~/.config/weft/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| WeftError::config("Cannot find config directory"))
    }

    /// Returns the weft data directory (e.g. `~/.local/share/weft/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| WeftError::config("Cannot find data directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Archive used when the settings name none.
    pub fn default_archive_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("archive.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_app_dirs() {
        if let (Ok(dir), Ok(file)) = (WeftPaths::config_dir(), WeftPaths::config_file()) {
            assert!(dir.ends_with("weft"));
            assert_eq!(file, dir.join("config.toml"));
        }
        if let Ok(archive) = WeftPaths::default_archive_file() {
            assert!(archive.ends_with("weft/archive.json"));
        }
    }
}

//! Settings file location
//!
//! The settings file is looked up in the working directory unless a path is
//! given explicitly.

use std::path::PathBuf;

/// File name of the editor settings
pub const CONFIG_FILE_NAME: &str = "sdtd-config.toml";

/// Returns the default settings path: `./sdtd-config.toml`, or the file named
/// by `SDTD_CONFIG` when that variable is set.
pub fn default_config_path() -> PathBuf {
    std::env::var_os("SDTD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

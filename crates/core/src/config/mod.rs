//! Editor settings
//!
//! Settings live in a TOML file and describe where the game's config files
//! are and how they are read and written back:
//!
//! ```toml
//! data_dir = "/games/7DaysToDie/Data/Config"
//! strict_extends = false
//! indent = 2
//! log_level = "info"
//! ```
//!
//! A missing file is created with defaults on first load.

mod loader;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;
use crate::loader::LoadOptions;
use crate::serializer::DEFAULT_INDENT;

pub use loader::{default_config_path, CONFIG_FILE_NAME};

/// Settings for loading and saving a game data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory holding the game's XML config files
    pub data_dir: PathBuf,

    pub blocks_file: String,
    pub items_file: String,
    pub materials_file: String,
    pub recipes_file: String,

    /// Spaces per indentation level when writing
    pub indent: usize,

    /// Fail loading when a block extends an unknown block
    pub strict_extends: bool,

    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            blocks_file: "blocks.xml".to_string(),
            items_file: "items.xml".to_string(),
            materials_file: "materials.xml".to_string(),
            recipes_file: "recipes.xml".to_string(),
            indent: DEFAULT_INDENT,
            strict_extends: false,
            log_level: "info".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load settings from `path`, creating a default file if it is missing.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded editor config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save(path)?;
            tracing::info!("Created default editor config at {:?}", path);
            Ok(default)
        }
    }

    /// Save settings to `path`, creating parent directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved editor config to {:?}", path);
        Ok(())
    }

    /// Replace these settings with the contents of `path`.
    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded editor config from {:?}", path);
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            strict_extends: self.strict_extends,
        }
    }

    pub fn blocks_path(&self) -> PathBuf {
        self.data_dir.join(&self.blocks_file)
    }

    pub fn items_path(&self) -> PathBuf {
        self.data_dir.join(&self.items_file)
    }

    pub fn materials_path(&self) -> PathBuf {
        self.data_dir.join(&self.materials_file)
    }

    pub fn recipes_path(&self) -> PathBuf {
        self.data_dir.join(&self.recipes_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialize_deserialize() {
        let config = EditorConfig {
            data_dir: PathBuf::from("/data"),
            strict_extends: true,
            ..EditorConfig::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: EditorConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: EditorConfig = toml::from_str("indent = 4").unwrap();
        assert_eq!(parsed.indent, 4);
        assert_eq!(parsed.blocks_file, "blocks.xml");
        assert!(!parsed.strict_extends);
    }

    #[test]
    fn test_paths_join_data_dir() {
        let config = EditorConfig {
            data_dir: PathBuf::from("/data"),
            ..EditorConfig::default()
        };
        assert_eq!(config.blocks_path(), PathBuf::from("/data/blocks.xml"));
        assert_eq!(config.recipes_path(), PathBuf::from("/data/recipes.xml"));
    }

    #[test]
    fn test_load_creates_default_then_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config, EditorConfig::default());
        assert!(path.exists());

        std::fs::write(&path, "strict_extends = true\n").unwrap();
        let mut config = config;
        config.reload(&path).unwrap();
        assert!(config.strict_extends);
        assert!(config.load_options().strict_extends);
    }
}

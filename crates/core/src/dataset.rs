//! A game data directory loaded as a whole
//!
//! Collections are loaded in dependency order: items and materials first, then
//! blocks, whose drops may name items. Only the blocks file is required.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::collection::Collection;
use crate::config::EditorConfig;
use crate::entities::{Block, Entity, Item, Material, RecipeList};
use crate::error::ConfigResult;
use crate::loader;
use crate::properties::MATERIAL;
use crate::serializer;

/// Every collection of one data directory
#[derive(Debug, Default)]
pub struct DataSet {
    pub items: Collection<Item>,
    pub materials: Collection<Material>,
    pub blocks: Collection<Block>,
    pub recipes: RecipeList,
}

/// Read a file that may legitimately be absent
fn read_optional(path: &Path) -> ConfigResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{:?} not found, starting empty", path);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the data directory described by `config`
    ///
    /// # Errors
    /// Fails if the blocks file cannot be read or any document is malformed.
    pub fn load(config: &EditorConfig) -> ConfigResult<Self> {
        let items = match read_optional(&config.items_path())? {
            Some(text) => loader::load_items(&text)?,
            None => Collection::new(),
        };
        let materials = match read_optional(&config.materials_path())? {
            Some(text) => loader::load_materials(&text)?,
            None => Collection::new(),
        };
        let recipes = match read_optional(&config.recipes_path())? {
            Some(text) => loader::load_recipes(&text)?,
            None => RecipeList::new(),
        };

        let text = std::fs::read_to_string(config.blocks_path())?;
        let blocks = loader::load_blocks(&text, &items, config.load_options())?;

        info!("Loaded data set from {:?}", config.data_dir);
        Ok(Self {
            items,
            materials,
            blocks,
            recipes,
        })
    }

    /// Write every collection back under `config.data_dir`
    ///
    /// An empty optional collection is only written if its file already
    /// exists, so saving never adds files the directory did not have.
    pub fn save(&self, config: &EditorConfig) -> ConfigResult<()> {
        let indent = config.indent;

        let items_path = config.items_path();
        if !self.items.is_empty() || items_path.exists() {
            serializer::save(&items_path, &serializer::items_document(&self.items), indent)?;
        }
        let materials_path = config.materials_path();
        if !self.materials.is_empty() || materials_path.exists() {
            serializer::save(
                &materials_path,
                &serializer::materials_document(&self.materials)?,
                indent,
            )?;
        }
        let recipes_path = config.recipes_path();
        if !self.recipes.is_empty() || recipes_path.exists() {
            serializer::save(&recipes_path, &serializer::recipes_document(&self.recipes), indent)?;
        }

        serializer::save(
            config.blocks_path(),
            &serializer::blocks_document(&self.blocks)?,
            indent,
        )
    }

    /// The material a block effectively uses, if it names a known one
    pub fn block_material(&self, block: &str) -> ConfigResult<Option<&Material>> {
        let material = self.blocks.get_property(block, MATERIAL)?;
        Ok(material.and_then(|name| self.materials.get(name)))
    }

    /// Blocks matching the bulk-edit filter, in save order
    ///
    /// # Arguments
    /// * `material` - Exact effective `Material` to match, if given
    /// * `name` - Case-insensitive substring of the block name, if given
    pub fn filter_blocks(&self, material: Option<&str>, name: Option<&str>) -> ConfigResult<Vec<&Block>> {
        let fragment = name.map(str::to_lowercase);

        let mut matches = Vec::new();
        for block in self.blocks.sorted() {
            if let Some(fragment) = &fragment {
                if !block.name().to_lowercase().contains(fragment.as_str()) {
                    continue;
                }
            }
            if let Some(material) = material {
                if self.blocks.get_property(block.name(), MATERIAL)? != Some(material) {
                    continue;
                }
            }
            matches.push(block);
        }
        Ok(matches)
    }

    /// Set (or reset, with `None`) one property on many blocks
    ///
    /// Stops at the first unknown block. Returns how many blocks changed.
    pub fn set_property_bulk<I, S>(&mut self, names: I, key: &str, value: Option<&str>) -> ConfigResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = 0;
        for name in names {
            if self.blocks.set_property(name.as_ref(), key, value)? {
                changed += 1;
            }
        }
        debug!("Set {} on {} blocks", key, changed);
        Ok(changed)
    }

    /// Rename an item and point block drops at the new name
    pub fn rekey_item(&mut self, old: &str, new: &str) -> ConfigResult<()> {
        self.items.rekey(old, new)?;
        for block in self.blocks.iter_mut() {
            block.drops_mut().retarget_items(old, new);
        }
        Ok(())
    }
}

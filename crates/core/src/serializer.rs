//! Canonical document output
//!
//! Every document starts with `<?xml version="1.0" encoding="utf-8"?>` and is
//! written as UTF-8 without a byte-order mark. Blocks and items are ordered by
//! id, materials and recipes by name.

use std::path::Path;

use tracing::info;

use crate::collection::Collection;
use crate::entities::{Block, Entity, Item, Material, RecipeList};
use crate::error::ConfigResult;
use crate::xml::{self, XmlElement};

/// Default indentation width, in spaces
pub const DEFAULT_INDENT: usize = 2;

pub fn blocks_document(blocks: &Collection<Block>) -> ConfigResult<XmlElement> {
    let mut root = XmlElement::new(Block::ROOT);
    for block in blocks.sorted() {
        root.children.push(block.to_element(blocks)?);
    }
    Ok(root)
}

pub fn materials_document(materials: &Collection<Material>) -> ConfigResult<XmlElement> {
    let mut root = XmlElement::new(Material::ROOT);
    for material in materials.sorted() {
        root.children.push(material.to_element()?);
    }
    Ok(root)
}

pub fn items_document(items: &Collection<Item>) -> XmlElement {
    let mut root = XmlElement::new(Item::ROOT);
    root.children = items.sorted().into_iter().map(Item::to_element).collect();
    root
}

pub fn recipes_document(recipes: &RecipeList) -> XmlElement {
    let mut root = XmlElement::new(RecipeList::ROOT);
    root.children = recipes.sorted().into_iter().map(|r| r.to_element()).collect();
    root
}

/// Serialize a document root to bytes
pub fn to_bytes(root: &XmlElement, indent: usize) -> ConfigResult<Vec<u8>> {
    xml::write_document(root, indent)
}

/// Serialize a document root to a string
pub fn to_string(root: &XmlElement, indent: usize) -> ConfigResult<String> {
    let bytes = to_bytes(root, indent)?;
    // The writer only ever emits UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write a document root to `path`, replacing any existing file
pub fn save<P: AsRef<Path>>(path: P, root: &XmlElement, indent: usize) -> ConfigResult<()> {
    let path = path.as_ref();
    let bytes = to_bytes(root, indent)?;
    std::fs::write(path, bytes)?;
    info!("Saved <{}> with {} entries to {:?}", root.name, root.children.len(), path);
    Ok(())
}

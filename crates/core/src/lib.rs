//! 7 Days to Die config data layer
//!
//! This crate loads the game's XML configuration (`blocks.xml`, `items.xml`,
//! `materials.xml`, `recipes.xml`) into in-memory collections, lets callers
//! query and edit properties with `Extends` inheritance applied, and writes
//! the collections back as game-compatible XML.
//!
//! Stored properties are sparse: an entity only keeps values that differ from
//! what its parent chain yields, so a load/save cycle of a saved document
//! reproduces it byte for byte.
//!
//! # Example
//!
//! ```no_run
//! use sdtd_config::{Collection, LoadOptions};
//!
//! let text = std::fs::read_to_string("blocks.xml")?;
//! let mut blocks = sdtd_config::load_blocks(&text, &Collection::new(), LoadOptions::default())?;
//! blocks.set_property("woodFrame", "Extends", Some("solidRebarFrame"))?;
//! let material = blocks.get_property("woodFrame", "Material")?;
//! # Ok::<(), sdtd_config::ConfigError>(())
//! ```

pub mod codec;
pub mod collection;
pub mod config;
pub mod dataset;
pub mod drops;
pub mod entities;
pub mod error;
pub mod loader;
pub mod properties;
pub mod resolve;
pub mod serializer;
pub mod xml;

// Re-export commonly used items
pub use collection::{Collection, EntityKey};
pub use config::EditorConfig;
pub use dataset::DataSet;
pub use drops::{Drop, DropTable, DropTarget};
pub use entities::{Block, Entity, Item, Material, PropertyEntity, Recipe, RecipeList};
pub use error::{ConfigError, ConfigResult};
pub use loader::{load_blocks, load_items, load_materials, load_recipes, LoadOptions};
pub use properties::{ListenerKey, PropertyChange, PropertyStore, EXTENDS, MATERIAL};
pub use xml::XmlElement;

//! Block definitions (`blocks.xml`)

use crate::codec::{self, EntityKind};
use crate::collection::Collection;
use crate::drops::DropTable;
use crate::error::ConfigResult;
use crate::properties::{PropertyStore, EXTENDS};
use crate::xml::XmlElement;

use super::{parse_id, Entity, PropertyEntity};

/// A single block
///
/// Properties are sparse overrides on top of the block named by `Extends`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    id: u32,
    name: String,
    properties: PropertyStore,
    drops: DropTable,
}

impl Block {
    /// Create a bare block with no properties, parent or drops
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            properties: PropertyStore::new(),
            drops: DropTable::new(),
        }
    }

    pub fn block_id(&self) -> u32 {
        self.id
    }

    /// Name of the block this one directly extends, without following it
    pub fn extends(&self) -> Option<&str> {
        self.properties.get(EXTENDS)
    }

    pub fn drops(&self) -> &DropTable {
        &self.drops
    }

    pub fn drops_mut(&mut self) -> &mut DropTable {
        &mut self.drops
    }

    /// Game-compatible `<block>` element.
    ///
    /// `blocks` is the collection this block belongs to; it is only used to
    /// look up inherited values for properties that are written in pairs.
    pub fn to_element(&self, blocks: &Collection<Block>) -> ConfigResult<XmlElement> {
        let mut element = XmlElement::new(Self::KIND)
            .with_attr("id", self.id.to_string())
            .with_attr("name", self.name.as_str());

        let properties = codec::unflatten(EntityKind::Block, &self.name, &self.properties, |key| {
            Ok(crate::resolve::resolve(blocks, self, key)?.map(str::to_string))
        })?;
        element.children.extend(properties);
        element.children.extend(self.drops.to_elements(&self.name));
        Ok(element)
    }
}

impl Entity for Block {
    const KIND: &'static str = "block";
    const ROOT: &'static str = "blocks";

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> Option<u32> {
        Some(self.id)
    }

    fn from_header(element: &XmlElement) -> Option<Self> {
        let id = parse_id(element)?;
        let name = element.attr("name")?;
        Some(Self::new(id, name))
    }

    fn rename(&mut self, name: String) {
        self.name = name;
    }

    fn retarget(&mut self, old: &str, new: &str) {
        if self.properties.get(EXTENDS) == Some(old) {
            self.properties.insert(EXTENDS, new);
        }
        self.drops.retarget_blocks(old, new);
    }

    fn parent(&self) -> Option<&str> {
        self.extends()
    }

    fn adopted(blocks: &mut Collection<Self>, names: &[String]) -> ConfigResult<()> {
        for name in names {
            blocks.prune_redundant(name)?;
            blocks.prune_descendants(name)?;
        }
        Ok(())
    }
}

impl PropertyEntity for Block {
    const INHERITS: bool = true;

    fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.properties
    }
}

//! Material definitions (`materials.xml`)

use crate::codec::{self, EntityKind};
use crate::error::ConfigResult;
use crate::properties::PropertyStore;
use crate::xml::XmlElement;

use super::{Entity, PropertyEntity};

/// A single material. Materials have no numeric id; the `id` attribute in the
/// game's XML holds the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    name: String,
    properties: PropertyStore,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: PropertyStore::new(),
        }
    }

    /// Game-compatible `<material>` element
    pub fn to_element(&self) -> ConfigResult<XmlElement> {
        let mut element = XmlElement::new(Self::KIND).with_attr("id", self.name.as_str());
        let properties = codec::unflatten(EntityKind::Material, &self.name, &self.properties, |key| {
            Ok(self.properties.get(key).map(str::to_string))
        })?;
        element.children = properties;
        Ok(element)
    }
}

impl Entity for Material {
    const KIND: &'static str = "material";
    const ROOT: &'static str = "materials";

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> Option<u32> {
        None
    }

    fn from_header(element: &XmlElement) -> Option<Self> {
        element.attr("id").map(Self::new)
    }

    fn rename(&mut self, name: String) {
        self.name = name;
    }
}

impl PropertyEntity for Material {
    fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.properties
    }
}

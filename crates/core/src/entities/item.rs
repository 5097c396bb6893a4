//! Item definitions (`items.xml`)
//!
//! Only the id and name of an item are modelled; blocks need nothing more to
//! resolve drop targets.

use crate::xml::XmlElement;

use super::{parse_id, Entity};

/// A single item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: u32,
    name: String,
}

impl Item {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Game-compatible `<item>` element
    pub fn to_element(&self) -> XmlElement {
        XmlElement::new(Self::KIND)
            .with_attr("id", self.id.to_string())
            .with_attr("name", self.name.as_str())
    }
}

impl Entity for Item {
    const KIND: &'static str = "item";
    const ROOT: &'static str = "items";

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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_round_trips_header() {
        let element = XmlElement::new("item")
            .with_attr("id", "40")
            .with_attr("name", "torch")
            .with_attr("ignored", "x");
        let item = Item::from_header(&element).unwrap();
        let expected = XmlElement::new("item")
            .with_attr("id", "40")
            .with_attr("name", "torch");
        assert_eq!(item.to_element(), expected);
    }
}

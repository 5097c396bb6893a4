//! Block drop events
//!
//! A block reacts to events (`Harvest`, `Destroy`, `Fall`, ...) by dropping
//! things. Each event maps to an ordered list of [`Drop`]s; events are written
//! in name order and drops within an event in the order they were added.

use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};
use crate::xml::XmlElement;

/// Count value marking a drop as structurally disabled
pub const DISABLED_COUNT: &str = "0";

const DEFAULT_COUNT: &str = "1";
const DEFAULT_PROBABILITY: f32 = 1.0;
const DEFAULT_STICK_CHANCE: f32 = 0.0;

/// What a drop produces, resolved by name when the drop is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Another block in the same collection
    Block(String),
    /// An item from the item collection
    Item(String),
    /// A name that matched neither, kept verbatim
    Literal(String),
}

impl DropTarget {
    pub fn name(&self) -> &str {
        match self {
            DropTarget::Block(name) | DropTarget::Item(name) | DropTarget::Literal(name) => name,
        }
    }
}

/// A single drop descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Drop {
    /// Count exactly as written in the source (may be a range such as `1,3`)
    pub count: String,
    /// Dropped block or item; `None` means the owning block itself
    pub target: Option<DropTarget>,
    pub probability: f32,
    pub stick_chance: f32,
    pub tool_category: Option<String>,
}

impl Default for Drop {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT.to_string(),
            target: None,
            probability: DEFAULT_PROBABILITY,
            stick_chance: DEFAULT_STICK_CHANCE,
            tool_category: None,
        }
    }
}

impl Drop {
    pub fn new(count: impl Into<String>, target: Option<DropTarget>) -> Self {
        Self {
            count: count.into(),
            target,
            ..Self::default()
        }
    }

    /// A zero-count drop is disabled and carries no other attributes
    pub fn is_disabled(&self) -> bool {
        self.count == DISABLED_COUNT
    }

    /// Read a `<drop>` element owned by `block`, returning its event name.
    ///
    /// `resolve` maps the `name` attribute to a block, item or literal target.
    pub fn from_element<F>(element: &XmlElement, block: &str, resolve: F) -> ConfigResult<(String, Self)>
    where
        F: FnOnce(&str) -> DropTarget,
    {
        let event = element
            .attr("event")
            .ok_or_else(|| ConfigError::MissingDropEvent {
                block: block.to_string(),
            })?
            .to_string();

        let drop = Drop {
            count: element.attr("count").unwrap_or(DEFAULT_COUNT).to_string(),
            target: element.attr("name").map(resolve),
            probability: parse_float(element, "prob", block)?.unwrap_or(DEFAULT_PROBABILITY),
            stick_chance: parse_float(element, "stick_chance", block)?
                .unwrap_or(DEFAULT_STICK_CHANCE),
            tool_category: element.attr("tool_category").map(str::to_string),
        };
        Ok((event, drop))
    }

    /// Write this drop as a `<drop>` element of `event` on block `owner`
    pub fn to_element(&self, event: &str, owner: &str) -> XmlElement {
        let mut element = XmlElement::new("drop")
            .with_attr("event", event)
            .with_attr("count", self.count.as_str());

        if self.is_disabled() {
            return element;
        }

        if let Some(target) = &self.target {
            let name = target.name();
            // Self-drop is the game's default
            if name != owner && name != "null" {
                element.push_attr("name", name);
            }
        }
        if self.probability != DEFAULT_PROBABILITY {
            element.push_attr("prob", self.probability.to_string());
        }
        if self.stick_chance != DEFAULT_STICK_CHANCE {
            element.push_attr("stick_chance", self.stick_chance.to_string());
        }
        if let Some(category) = &self.tool_category {
            element.push_attr("tool_category", category.as_str());
        }
        element
    }
}

fn parse_float(element: &XmlElement, attribute: &'static str, block: &str) -> ConfigResult<Option<f32>> {
    element
        .attr(attribute)
        .map(|value| {
            value
                .trim()
                .parse::<f32>()
                .map_err(|_| ConfigError::InvalidDropValue {
                    block: block.to_string(),
                    attribute,
                    value: value.to_string(),
                })
        })
        .transpose()
}

/// Per-block multimap of event name to drops
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropTable {
    events: BTreeMap<String, Vec<Drop>>,
}

impl DropTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a drop to `event`, creating the event on first use
    pub fn add_drop(&mut self, event: impl Into<String>, drop: Drop) {
        self.events.entry(event.into()).or_default().push(drop);
    }

    /// Drops of one event, in insertion order
    pub fn drops(&self, event: &str) -> &[Drop] {
        self.events.get(event).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable access to one event's drops
    pub fn drops_mut(&mut self, event: &str) -> Option<&mut Vec<Drop>> {
        self.events.get_mut(event)
    }

    /// Every `(event, drop)` pair in write order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Drop)> {
        self.events
            .iter()
            .flat_map(|(event, drops)| drops.iter().map(move |d| (event.as_str(), d)))
    }

    /// Total number of drops across all events
    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.events.values().all(Vec::is_empty)
    }

    pub fn to_elements(&self, owner: &str) -> Vec<XmlElement> {
        self.iter()
            .map(|(event, drop)| drop.to_element(event, owner))
            .collect()
    }

    /// Point block targets named `old` at `new`
    pub(crate) fn retarget_blocks(&mut self, old: &str, new: &str) {
        self.retarget(|target| match target {
            DropTarget::Block(name) if name == old => Some(DropTarget::Block(new.to_string())),
            _ => None,
        });
    }

    /// Point item targets named `old` at `new`
    pub(crate) fn retarget_items(&mut self, old: &str, new: &str) {
        self.retarget(|target| match target {
            DropTarget::Item(name) if name == old => Some(DropTarget::Item(new.to_string())),
            _ => None,
        });
    }

    fn retarget<F>(&mut self, replace: F)
    where
        F: Fn(&DropTarget) -> Option<DropTarget>,
    {
        for drop in self.events.values_mut().flatten() {
            if let Some(replacement) = drop.target.as_ref().and_then(&replace) {
                drop.target = Some(replacement);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(name: &str) -> DropTarget {
        DropTarget::Literal(name.to_string())
    }

    #[test]
    fn test_zero_count_suppresses_everything_else() {
        let drop = Drop {
            count: "0".into(),
            target: Some(literal("resourceWood")),
            probability: 0.5,
            stick_chance: 0.25,
            tool_category: Some("Disassemble".into()),
        };
        let element = drop.to_element("Destroy", "woodFrame");
        assert_eq!(
            element.attributes,
            vec![
                ("event".to_string(), "Destroy".to_string()),
                ("count".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_defaults_are_omitted() {
        let drop = Drop::new("1", Some(DropTarget::Block("woodFrame".into())));
        let element = drop.to_element("Harvest", "woodFrame");
        assert_eq!(element.attr("name"), None);
        assert_eq!(element.attr("prob"), None);
        assert_eq!(element.attr("stick_chance"), None);
        assert_eq!(element.attr("tool_category"), None);
    }

    #[test]
    fn test_non_default_attributes_are_written() {
        let drop = Drop {
            count: "1,3".into(),
            target: Some(literal("resourceWood")),
            probability: 0.5,
            stick_chance: 1.0,
            tool_category: Some("Disassemble".into()),
        };
        let element = drop.to_element("Destroy", "woodFrame");
        assert_eq!(element.attr("count"), Some("1,3"));
        assert_eq!(element.attr("name"), Some("resourceWood"));
        assert_eq!(element.attr("prob"), Some("0.5"));
        assert_eq!(element.attr("stick_chance"), Some("1"));
        assert_eq!(element.attr("tool_category"), Some("Disassemble"));
    }

    #[test]
    fn test_null_name_is_omitted() {
        let drop = Drop::new("1", Some(literal("null")));
        assert_eq!(drop.to_element("Fall", "sand").attr("name"), None);
    }

    #[test]
    fn test_from_element_defaults() {
        let element = XmlElement::new("drop").with_attr("event", "Harvest");
        let (event, drop) = Drop::from_element(&element, "stone", literal).unwrap();
        assert_eq!(event, "Harvest");
        assert_eq!(drop, Drop::default());
    }

    #[test]
    fn test_from_element_requires_event() {
        let element = XmlElement::new("drop").with_attr("count", "1");
        assert!(matches!(
            Drop::from_element(&element, "stone", literal),
            Err(ConfigError::MissingDropEvent { .. })
        ));
    }

    #[test]
    fn test_from_element_rejects_bad_probability() {
        let element = XmlElement::new("drop")
            .with_attr("event", "Harvest")
            .with_attr("prob", "often");
        assert!(matches!(
            Drop::from_element(&element, "stone", literal),
            Err(ConfigError::InvalidDropValue { attribute: "prob", .. })
        ));
    }

    #[test]
    fn test_table_orders_events_and_keeps_insertion_order() {
        let mut table = DropTable::new();
        table.add_drop("Harvest", Drop::new("2", Some(literal("b"))));
        table.add_drop("Destroy", Drop::new("1", Some(literal("x"))));
        table.add_drop("Harvest", Drop::new("1", Some(literal("a"))));

        let order: Vec<_> = table
            .iter()
            .map(|(event, drop)| (event, drop.target.as_ref().unwrap().name()))
            .collect();
        assert_eq!(order, vec![("Destroy", "x"), ("Harvest", "b"), ("Harvest", "a")]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.drops("Harvest").len(), 2);
        assert!(table.drops("Fall").is_empty());
    }

    #[test]
    fn test_retarget_only_touches_matching_kind() {
        let mut table = DropTable::new();
        table.add_drop("Harvest", Drop::new("1", Some(DropTarget::Block("old".into()))));
        table.add_drop("Harvest", Drop::new("1", Some(DropTarget::Item("old".into()))));

        table.retarget_blocks("old", "new");
        let targets: Vec<_> = table.drops("Harvest").iter().map(|d| d.target.clone()).collect();
        assert_eq!(
            targets,
            vec![
                Some(DropTarget::Block("new".into())),
                Some(DropTarget::Item("old".into())),
            ]
        );
    }
}

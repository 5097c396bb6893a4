//! Classed-property codec
//!
//! The game groups some properties under a class:
//!
//! ```xml
//! <property class="UpgradeBlock">
//!     <property name="ToBlock" value="woodFrameStrong"/>
//! </property>
//! ```
//!
//! Internally these are flattened to dotted keys (`UpgradeBlock.ToBlock`),
//! which either form of the game's XML accepts. A handful of properties do not
//! survive that treatment; their handling lives in the rule tables below so a
//! new quirk is one more table row.
//!
//! `RepairItems` puts the item name in the property *name*, so it is stored as
//! the pair `RepairBlock.Item` / `RepairBlock.ItemCount`. Only one repair item
//! can be represented: when a class lists several, the last one wins.

use crate::error::{ConfigError, ConfigResult};
use crate::properties::PropertyStore;
use crate::xml::XmlElement;

/// Flattened key holding the repair item's name
pub const REPAIR_ITEM: &str = "RepairBlock.Item";

/// Flattened key holding the repair item's count
pub const REPAIR_ITEM_COUNT: &str = "RepairBlock.ItemCount";

const PROPERTY: &str = "property";

/// Which kind of record a property belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Block,
    Material,
}

/// Read-side handling for a property class
#[derive(Debug)]
enum ClassRule {
    /// Child name and value become the values of two fixed keys
    NameValuePair {
        name_key: &'static str,
        value_key: &'static str,
    },
}

/// Read-side handling keyed on a property's own name
#[derive(Debug)]
enum NameRule {
    /// Copy an attribute into an extra property
    CopyParam {
        param: &'static str,
        into: &'static str,
    },
}

/// Write-side handling for a flattened key
#[derive(Debug)]
enum WriteRule {
    /// Emit nested under `class`, with the stored value as the child's name
    /// and `count_key` as the child's value
    Nest {
        class: &'static str,
        count_key: &'static str,
    },
    /// Only written together with `lead_key`
    PairedWith { lead_key: &'static str },
    /// Extra attributes for one specific entity
    EntityParams {
        entity: &'static str,
        params: &'static [(&'static str, &'static str)],
    },
    /// `type` attribute the engine needs to parse the value
    Typed(&'static str),
}

static CLASS_RULES: &[(&str, ClassRule)] = &[(
    "RepairItems",
    ClassRule::NameValuePair {
        name_key: REPAIR_ITEM,
        value_key: REPAIR_ITEM_COUNT,
    },
)];

static NAME_RULES: &[(&str, NameRule)] = &[(
    "CanPickup",
    NameRule::CopyParam {
        param: "param1",
        into: "PickupTarget",
    },
)];

static WRITE_RULES: &[(EntityKind, &str, WriteRule)] = &[
    (
        EntityKind::Block,
        REPAIR_ITEM,
        WriteRule::Nest {
            class: "RepairItems",
            count_key: REPAIR_ITEM_COUNT,
        },
    ),
    (
        EntityKind::Block,
        REPAIR_ITEM_COUNT,
        WriteRule::PairedWith {
            lead_key: REPAIR_ITEM,
        },
    ),
    // One corn variant stops growing without these
    (
        EntityKind::Block,
        "PlantGrowing.GrowOnTop",
        WriteRule::EntityParams {
            entity: "growableCornTop2",
            params: &[("param1", "3"), ("param2", "grownUpCornTop1")],
        },
    ),
    (EntityKind::Material, "Hardness", WriteRule::Typed("float")),
    (EntityKind::Material, "Mass", WriteRule::Typed("int")),
];

fn class_rule(class: &str) -> Option<&'static ClassRule> {
    CLASS_RULES.iter().find(|(c, _)| *c == class).map(|(_, r)| r)
}

fn name_rule(name: &str) -> Option<&'static NameRule> {
    NAME_RULES.iter().find(|(n, _)| *n == name).map(|(_, r)| r)
}

fn write_rule(kind: EntityKind, key: &str) -> Option<&'static WriteRule> {
    WRITE_RULES
        .iter()
        .find(|(k, n, _)| *k == kind && *n == key)
        .map(|(_, _, r)| r)
}

/// A flattened property write; `None` resets the property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    pub value: Option<String>,
}

impl Assignment {
    fn new(key: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            key: key.into(),
            value: value.map(str::to_string),
        }
    }
}

/// Flatten one top-level `<property>` element of `entity` into assignments,
/// in the order they should be applied.
///
/// `param1`/`param2` are ignored unless a rule names them.
pub fn flatten(property: &XmlElement, entity: &str) -> ConfigResult<Vec<Assignment>> {
    let mut out = Vec::new();
    match property.attr("class") {
        Some(class) => {
            for child in property.children_named(PROPERTY) {
                flatten_one(child, Some(class), entity, &mut out)?;
            }
        }
        None => flatten_one(property, None, entity, &mut out)?,
    }
    Ok(out)
}

fn flatten_one(
    property: &XmlElement,
    class: Option<&str>,
    entity: &str,
    out: &mut Vec<Assignment>,
) -> ConfigResult<()> {
    let name = property
        .attr("name")
        .ok_or_else(|| ConfigError::MissingPropertyName {
            entity: entity.to_string(),
        })?;
    let value = property.attr("value");

    if let Some(NameRule::CopyParam { param, into }) = name_rule(name) {
        if let Some(param_value) = property.attr(param) {
            out.push(Assignment::new(*into, Some(param_value)));
        }
    }

    match class {
        Some(class) => match class_rule(class) {
            Some(ClassRule::NameValuePair {
                name_key,
                value_key,
            }) => {
                out.push(Assignment::new(*name_key, Some(name)));
                out.push(Assignment::new(*value_key, value));
            }
            None => out.push(Assignment::new(format!("{class}.{name}"), value)),
        },
        None => out.push(Assignment::new(name, value)),
    }
    Ok(())
}

/// Expand a property store back into `<property>` elements, in key order.
///
/// `effective` resolves a key through inheritance; it is used to pair up keys
/// that are written together when only one of them is overridden locally.
pub fn unflatten<F>(
    kind: EntityKind,
    entity: &str,
    store: &PropertyStore,
    effective: F,
) -> ConfigResult<Vec<XmlElement>>
where
    F: Fn(&str) -> ConfigResult<Option<String>>,
{
    let mut out = Vec::new();
    for (key, value) in store.iter() {
        let element = match write_rule(kind, key) {
            Some(WriteRule::Nest { class, count_key }) => {
                let count = effective(count_key)?;
                nested(class, value, count.as_deref())
            }
            Some(WriteRule::PairedWith { lead_key }) => {
                if store.contains(lead_key) {
                    continue;
                }
                // Lead is inherited: write the pair here so the local value survives
                let Some(lead) = effective(lead_key)? else {
                    continue;
                };
                match write_rule(kind, lead_key) {
                    Some(WriteRule::Nest { class, .. }) => nested(class, &lead, Some(value)),
                    _ => continue,
                }
            }
            Some(WriteRule::EntityParams { entity: target, params }) if *target == entity => {
                let mut element = plain(key, value);
                for (param, param_value) in params.iter() {
                    element.push_attr(*param, *param_value);
                }
                element
            }
            Some(WriteRule::Typed(ty)) => plain(key, value).with_attr("type", *ty),
            _ => plain(key, value),
        };
        out.push(element);
    }
    Ok(out)
}

fn plain(key: &str, value: &str) -> XmlElement {
    XmlElement::new(PROPERTY)
        .with_attr("name", key)
        .with_attr("value", value)
}

fn nested(class: &str, name: &str, value: Option<&str>) -> XmlElement {
    let mut child = XmlElement::new(PROPERTY).with_attr("name", name);
    if let Some(value) = value {
        child.push_attr("value", value);
    }
    let mut parent = XmlElement::new(PROPERTY).with_attr("class", class);
    parent.children.push(child);
    parent
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str, value: &str) -> XmlElement {
        XmlElement::new("property")
            .with_attr("name", name)
            .with_attr("value", value)
    }

    fn classed(class: &str, children: Vec<XmlElement>) -> XmlElement {
        let mut element = XmlElement::new("property").with_attr("class", class);
        element.children = children;
        element
    }

    fn store(pairs: &[(&str, &str)]) -> PropertyStore {
        let mut store = PropertyStore::new();
        for (k, v) in pairs {
            store.insert(*k, *v);
        }
        store
    }

    fn no_inheritance(store: &PropertyStore) -> impl Fn(&str) -> ConfigResult<Option<String>> + '_ {
        move |key| Ok(store.get(key).map(str::to_string))
    }

    #[test]
    fn test_flatten_plain() {
        let out = flatten(&prop("Material", "wood"), "woodFrame").unwrap();
        assert_eq!(out, vec![Assignment::new("Material", Some("wood"))]);
    }

    #[test]
    fn test_flatten_class_to_dotted_keys() {
        let element = classed(
            "UpgradeBlock",
            vec![prop("ToBlock", "woodFrameStrong"), prop("ItemCount", "10")],
        );
        let out = flatten(&element, "woodFrame").unwrap();
        assert_eq!(
            out,
            vec![
                Assignment::new("UpgradeBlock.ToBlock", Some("woodFrameStrong")),
                Assignment::new("UpgradeBlock.ItemCount", Some("10")),
            ]
        );
    }

    #[test]
    fn test_flatten_repair_items() {
        let element = classed("RepairItems", vec![prop("woodFrame", "5")]);
        let out = flatten(&element, "woodFrameStrong").unwrap();
        assert_eq!(
            out,
            vec![
                Assignment::new(REPAIR_ITEM, Some("woodFrame")),
                Assignment::new(REPAIR_ITEM_COUNT, Some("5")),
            ]
        );
    }

    #[test]
    fn test_flatten_can_pickup_param() {
        let element = prop("CanPickup", "true").with_attr("param1", "torch");
        let out = flatten(&element, "candleWall").unwrap();
        assert_eq!(
            out,
            vec![
                Assignment::new("PickupTarget", Some("torch")),
                Assignment::new("CanPickup", Some("true")),
            ]
        );
    }

    #[test]
    fn test_flatten_ignores_other_params() {
        let element = prop("Model", "Door/door").with_attr("param1", "main_mesh");
        let out = flatten(&element, "doorWood").unwrap();
        assert_eq!(out, vec![Assignment::new("Model", Some("Door/door"))]);
    }

    #[test]
    fn test_flatten_missing_name() {
        let element = XmlElement::new("property").with_attr("value", "1");
        assert!(matches!(
            flatten(&element, "stone"),
            Err(ConfigError::MissingPropertyName { .. })
        ));

        let nested = classed("UpgradeBlock", vec![element]);
        assert!(matches!(
            flatten(&nested, "stone"),
            Err(ConfigError::MissingPropertyName { .. })
        ));
    }

    #[test]
    fn test_unflatten_repair_pair() {
        let s = store(&[(REPAIR_ITEM, "woodFrame"), (REPAIR_ITEM_COUNT, "5")]);
        let out = unflatten(EntityKind::Block, "woodFrameStrong", &s, no_inheritance(&s)).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].attr("class"), Some("RepairItems"));
        assert_eq!(out[0].children.len(), 1);
        assert_eq!(out[0].children[0].attr("name"), Some("woodFrame"));
        assert_eq!(out[0].children[0].attr("value"), Some("5"));
    }

    #[test]
    fn test_unflatten_count_with_inherited_item() {
        let s = store(&[(REPAIR_ITEM_COUNT, "8")]);
        let effective = |key: &str| -> ConfigResult<Option<String>> {
            Ok(match key {
                REPAIR_ITEM => Some("woodFrame".to_string()),
                _ => s.get(key).map(str::to_string),
            })
        };
        let out = unflatten(EntityKind::Block, "child", &s, effective).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].children[0].attr("name"), Some("woodFrame"));
        assert_eq!(out[0].children[0].attr("value"), Some("8"));
    }

    #[test]
    fn test_unflatten_corn_quirk_only_for_named_entity() {
        let s = store(&[("PlantGrowing.GrowOnTop", "growableCornTop1")]);

        let corn = unflatten(EntityKind::Block, "growableCornTop2", &s, no_inheritance(&s)).unwrap();
        assert_eq!(corn[0].attr("param1"), Some("3"));
        assert_eq!(corn[0].attr("param2"), Some("grownUpCornTop1"));

        let other = unflatten(EntityKind::Block, "growableCornTop1", &s, no_inheritance(&s)).unwrap();
        assert_eq!(other[0].attr("param1"), None);
        assert_eq!(other[0].attributes.len(), 2);
    }

    #[test]
    fn test_unflatten_material_types() {
        let s = store(&[("Hardness", "1.5"), ("Mass", "20"), ("Stepsound", "wood")]);
        let out = unflatten(EntityKind::Material, "Mwood", &s, no_inheritance(&s)).unwrap();

        assert_eq!(out[0].attr("name"), Some("Hardness"));
        assert_eq!(out[0].attr("type"), Some("float"));
        assert_eq!(out[1].attr("name"), Some("Mass"));
        assert_eq!(out[1].attr("type"), Some("int"));
        assert_eq!(out[2].attr("type"), None);
    }

    #[test]
    fn test_material_rules_do_not_apply_to_blocks() {
        let s = store(&[("Mass", "20")]);
        let out = unflatten(EntityKind::Block, "stone", &s, no_inheritance(&s)).unwrap();
        assert_eq!(out[0].attr("type"), None);
    }
}

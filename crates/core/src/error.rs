//! Error types for loading, editing and saving configuration data

use quick_xml::events::attributes::AttrError;

/// Error type for data layer operations
///
/// Unresolved references (an `Extends` parent, a drop target or a material
/// name that is not in the collection) are deliberately not represented here:
/// they resolve to `None` or to a literal fallback instead.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write a data file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not well-formed XML
    #[error("Failed to parse XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An element carries a malformed attribute
    #[error("Malformed XML attribute: {0}")]
    XmlAttribute(#[from] AttrError),

    /// Failed to parse the editor's TOML settings
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize the editor's TOML settings
    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The document has no root element
    #[error("Document has no root element")]
    MissingRoot,

    /// Two top-level elements share a name within one collection
    #[error("Duplicate {kind} name: {name}")]
    DuplicateEntityName { kind: &'static str, name: String },

    /// A `<property>` element has no `name` attribute
    #[error("Property on {entity} is missing a name")]
    MissingPropertyName { entity: String },

    /// A `<drop>` element has no `event` attribute
    #[error("Drop on {block} is missing an event name")]
    MissingDropEvent { block: String },

    /// A numeric drop attribute could not be parsed
    #[error("Invalid {attribute} value on drop of {block}: {value}")]
    InvalidDropValue {
        block: String,
        attribute: &'static str,
        value: String,
    },

    /// Following `Extends` leads back to an entity already visited
    #[error("Inheritance cycle: {}", chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },

    /// An `Extends` parent is missing while strict checking is enabled
    #[error("{entity} extends unknown block {parent}")]
    UnresolvedExtends { entity: String, parent: String },

    /// An operation named an entity that is not in the collection
    #[error("{kind} not found: {name}")]
    EntityNotFound { kind: &'static str, name: String },

    /// A rekey target name is already used by another entity
    #[error("{kind} name already in use: {name}")]
    NameTaken { kind: &'static str, name: String },
}

/// Result type for data layer operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_chain() {
        let err = ConfigError::InheritanceCycle {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Inheritance cycle: a -> b -> a");
    }

    #[test]
    fn test_duplicate_name_message() {
        let err = ConfigError::DuplicateEntityName {
            kind: "block",
            name: "woodFrame".into(),
        };
        assert_eq!(err.to_string(), "Duplicate block name: woodFrame");
    }
}

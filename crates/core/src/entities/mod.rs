//! Configuration record types
//!
//! Blocks, items and materials live in name-keyed [`Collection`]s. Recipes
//! may share names and are kept in a plain [`RecipeList`] instead.
//!
//! [`Collection`]: crate::collection::Collection

pub mod block;
pub mod item;
pub mod material;
pub mod recipe;

pub use block::Block;
pub use item::Item;
pub use material::Material;
pub use recipe::{Recipe, RecipeList};

use crate::collection::Collection;
use crate::error::ConfigResult;
use crate::properties::PropertyStore;
use crate::xml::XmlElement;

/// A named record that can be stored in a [`Collection`]
///
/// [`Collection`]: crate::collection::Collection
pub trait Entity: Sized {
    /// Element name of a single record (e.g. `block`)
    const KIND: &'static str;

    /// Root element name of a document of records (e.g. `blocks`)
    const ROOT: &'static str;

    /// Unique name, used as the lookup key
    fn name(&self) -> &str;

    /// Numeric id, for kinds that have one
    fn id(&self) -> Option<u32>;

    /// Build a bare record from a top-level element's attributes.
    ///
    /// Returns `None` when a required attribute is missing or unparseable;
    /// such elements are skipped rather than reported.
    fn from_header(element: &XmlElement) -> Option<Self>;

    /// Change the record's name. Only [`Collection::rekey`] calls this, so the
    /// name index never falls out of step.
    ///
    /// [`Collection::rekey`]: crate::collection::Collection::rekey
    fn rename(&mut self, name: String);

    /// Rewrite by-name references to a sibling that was renamed
    fn retarget(&mut self, _old: &str, _new: &str) {}

    /// Name of the sibling this record inherits from, for kinds that inherit
    fn parent(&self) -> Option<&str> {
        None
    }

    /// Called after a rename made `names` start inheriting from the renamed
    /// record, which they referred to before it existed under that name.
    fn adopted(_collection: &mut Collection<Self>, _names: &[String]) -> ConfigResult<()> {
        Ok(())
    }
}

/// A record carrying a sparse property store
pub trait PropertyEntity: Entity {
    /// Whether `Extends` is followed when resolving properties
    const INHERITS: bool = false;

    fn properties(&self) -> &PropertyStore;

    /// Raw store access. Edits made here skip the minimal-store rules; go
    /// through [`Collection::set_property`] instead.
    ///
    /// [`Collection::set_property`]: crate::collection::Collection::set_property
    fn properties_mut(&mut self) -> &mut PropertyStore;
}

/// Parse the `id` attribute as a `u32`
pub(crate) fn parse_id(element: &XmlElement) -> Option<u32> {
    element.attr("id")?.trim().parse().ok()
}

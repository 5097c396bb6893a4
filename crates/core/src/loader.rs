//! Two-pass document loading
//!
//! Properties and drops may name entities that appear later in the file, so
//! loading first registers a bare entity (id and name) for every top-level
//! element, then replays each element's `<property>` and `<drop>` children
//! once every name is known.
//!
//! Elements missing a required id or name are skipped. Duplicate names,
//! nameless properties and `Extends` cycles abort the load.

use tracing::{debug, info, warn};

use crate::codec;
use crate::collection::Collection;
use crate::drops::{Drop, DropTarget};
use crate::entities::{Block, Entity, Item, Material, PropertyEntity, RecipeList};
use crate::error::{ConfigError, ConfigResult};
use crate::xml::{self, XmlElement};

/// Options controlling how permissive loading is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fail when a block extends a block that is not in the document
    pub strict_extends: bool,
}

/// Pass 1: register a bare entity for every well-formed top-level element
fn register<'d, T: Entity>(root: &'d XmlElement) -> ConfigResult<(Collection<T>, Vec<(String, &'d XmlElement)>)> {
    if root.name != T::ROOT {
        debug!("Expected <{}> root, found <{}>", T::ROOT, root.name);
    }

    let mut collection = Collection::new();
    let mut pending = Vec::new();
    let mut skipped = 0usize;

    for element in root.children_named(T::KIND) {
        let Some(entity) = T::from_header(element) else {
            skipped += 1;
            continue;
        };
        let name = entity.name().to_string();
        collection.insert(entity)?;
        pending.push((name, element));
    }

    if skipped > 0 {
        debug!("Skipped {} malformed <{}> elements", skipped, T::KIND);
    }
    Ok((collection, pending))
}

/// Pass 2 helper: replay an element's `<property>` children through the codec
fn apply_properties<T: PropertyEntity>(
    collection: &mut Collection<T>,
    name: &str,
    element: &XmlElement,
) -> ConfigResult<()> {
    for property in element.children_named("property") {
        for assignment in codec::flatten(property, name)? {
            collection.load_property(name, &assignment.key, assignment.value.as_deref())?;
        }
    }
    Ok(())
}

/// Resolve a drop's `name` to a block, then an item, else keep it literally
fn resolve_target(blocks: &Collection<Block>, items: &Collection<Item>, name: &str) -> DropTarget {
    if blocks.contains(name) {
        DropTarget::Block(name.to_string())
    } else if items.contains(name) {
        DropTarget::Item(name.to_string())
    } else {
        DropTarget::Literal(name.to_string())
    }
}

/// Load blocks from the text of a `blocks.xml` document
///
/// `items` is used to resolve drop targets that are not blocks.
pub fn load_blocks(text: &str, items: &Collection<Item>, options: LoadOptions) -> ConfigResult<Collection<Block>> {
    let root = xml::parse_document(text)?;
    load_blocks_from(&root, items, options)
}

/// Load blocks from an already parsed document
pub fn load_blocks_from(
    root: &XmlElement,
    items: &Collection<Item>,
    options: LoadOptions,
) -> ConfigResult<Collection<Block>> {
    let (mut blocks, pending) = register::<Block>(root)?;

    for (name, element) in &pending {
        apply_properties(&mut blocks, name, element)?;

        for drop_element in element.children_named("drop") {
            let (event, drop) = Drop::from_element(drop_element, name, |target| {
                resolve_target(&blocks, items, target)
            })?;
            if let Some(block) = blocks.get_mut(name) {
                block.drops_mut().add_drop(event, drop);
            }
        }
    }

    check_parents(&blocks, options)?;

    // Overrides applied before their parent was filled in may be redundant
    let pruned = blocks.normalize()?;
    if pruned > 0 {
        debug!("Pruned {} inherited overrides", pruned);
    }

    info!("Loaded {} blocks", blocks.len());
    Ok(blocks)
}

fn check_parents(blocks: &Collection<Block>, options: LoadOptions) -> ConfigResult<()> {
    for block in blocks.iter() {
        let Some(parent) = block.extends() else {
            continue;
        };
        if blocks.contains(parent) {
            continue;
        }
        if options.strict_extends {
            return Err(ConfigError::UnresolvedExtends {
                entity: block.name().to_string(),
                parent: parent.to_string(),
            });
        }
        warn!("{} extends unknown block {}", block.name(), parent);
    }
    Ok(())
}

/// Load materials from the text of a `materials.xml` document
pub fn load_materials(text: &str) -> ConfigResult<Collection<Material>> {
    let root = xml::parse_document(text)?;
    load_materials_from(&root)
}

pub fn load_materials_from(root: &XmlElement) -> ConfigResult<Collection<Material>> {
    let (mut materials, pending) = register::<Material>(root)?;
    for (name, element) in &pending {
        apply_properties(&mut materials, name, element)?;
    }
    info!("Loaded {} materials", materials.len());
    Ok(materials)
}

/// Load items from the text of an `items.xml` document
pub fn load_items(text: &str) -> ConfigResult<Collection<Item>> {
    let root = xml::parse_document(text)?;
    load_items_from(&root)
}

pub fn load_items_from(root: &XmlElement) -> ConfigResult<Collection<Item>> {
    let (items, _) = register::<Item>(root)?;
    info!("Loaded {} items", items.len());
    Ok(items)
}

/// Load recipes from the text of a `recipes.xml` document
pub fn load_recipes(text: &str) -> ConfigResult<RecipeList> {
    let root = xml::parse_document(text)?;
    let recipes = RecipeList::from_element(&root);
    info!("Loaded {} recipes", recipes.len());
    Ok(recipes)
}

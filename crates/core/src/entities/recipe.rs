//! Recipes (`recipes.xml`)
//!
//! Unlike the other kinds, recipes have no id and several may share a name,
//! so they are kept in a list instead of a keyed collection.

use tracing::debug;

use crate::xml::XmlElement;

/// A single recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub name: String,
}

impl Recipe {
    pub const KIND: &'static str = "recipe";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn from_element(element: &XmlElement) -> Option<Self> {
        element.attr("name").map(Self::new)
    }

    pub fn to_element(&self) -> XmlElement {
        XmlElement::new(Self::KIND).with_attr("name", self.name.as_str())
    }
}

/// Every recipe in a document, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeList {
    recipes: Vec<Recipe>,
}

impl RecipeList {
    pub const ROOT: &'static str = "recipes";

    pub fn new() -> Self {
        Self::default()
    }

    /// Read every `<recipe>` under `root`; unnamed ones are skipped
    pub fn from_element(root: &XmlElement) -> Self {
        let mut list = Self::new();
        for element in root.children_named(Recipe::KIND) {
            match Recipe::from_element(element) {
                Some(recipe) => list.push(recipe),
                None => debug!("Skipping recipe without a name"),
            }
        }
        list
    }

    pub fn push(&mut self, recipe: Recipe) {
        self.recipes.push(recipe);
    }

    /// All recipes named `name`
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Recipe> {
        self.recipes.iter().filter(move |r| r.name == name)
    }

    /// Remove every recipe named `name`, returning how many were removed
    pub fn remove_named(&mut self, name: &str) -> usize {
        let before = self.recipes.len();
        self.recipes.retain(|r| r.name != name);
        before - self.recipes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    /// Recipes sorted by name; equal names keep document order
    pub fn sorted(&self) -> Vec<&Recipe> {
        let mut sorted: Vec<&Recipe> = self.recipes.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_names_are_kept() {
        let mut root = XmlElement::new("recipes");
        for name in ["plank", "arrow", "plank"] {
            root.children.push(XmlElement::new("recipe").with_attr("name", name));
        }
        root.children.push(XmlElement::new("recipe"));

        let list = RecipeList::from_element(&root);
        assert_eq!(list.len(), 3);
        assert_eq!(list.named("plank").count(), 2);

        let names: Vec<_> = list.sorted().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["arrow", "plank", "plank"]);
    }

    #[test]
    fn test_remove_named() {
        let mut list = RecipeList::new();
        list.push(Recipe::new("plank"));
        list.push(Recipe::new("plank"));
        list.push(Recipe::new("arrow"));
        assert_eq!(list.remove_named("plank"), 2);
        assert_eq!(list.len(), 1);
    }
}

//! The loaded set of entity definitions.

use indexmap::IndexMap;

use entdef_core::{definition::EntityDefinition, identifier::Id};

/// Entity definitions of one loaded file set, in declaration order.
///
/// Each definition's index is its 1-based position. Name lookup is exact and
/// case-sensitive; when a point and a brush class share a name, the one
/// declared first is found.
#[derive(Debug, Clone, Default)]
pub struct DefinitionCatalog {
    definitions: Vec<EntityDefinition>,
    by_name: IndexMap<Id, usize>,
}

impl DefinitionCatalog {
    /// Takes ownership of `definitions` and assigns their indices.
    pub fn new(mut definitions: Vec<EntityDefinition>) -> Self {
        let mut by_name = IndexMap::with_capacity(definitions.len());
        for (position, definition) in definitions.iter_mut().enumerate() {
            definition.set_index(position + 1);
            by_name.entry(definition.name()).or_insert(position);
        }
        Self {
            definitions,
            by_name,
        }
    }

    pub fn get(&self, name: &str) -> Option<&EntityDefinition> {
        self.position(name).map(|position| &self.definitions[position])
    }

    /// Mutable lookup, used to track how many entities use a definition.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut EntityDefinition> {
        self.position(name)
            .map(move |position| &mut self.definitions[position])
    }

    /// Looks up a definition by its 1-based index.
    pub fn by_index(&self, index: usize) -> Option<&EntityDefinition> {
        index
            .checked_sub(1)
            .and_then(|position| self.definitions.get(position))
    }

    pub fn point_definitions(&self) -> impl Iterator<Item = &EntityDefinition> {
        self.definitions.iter().filter(|definition| definition.is_point())
    }

    pub fn brush_definitions(&self) -> impl Iterator<Item = &EntityDefinition> {
        self.definitions.iter().filter(|definition| definition.is_brush())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntityDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(&Id::new(name)).copied()
    }
}

impl<'a> IntoIterator for &'a DefinitionCatalog {
    type Item = &'a EntityDefinition;
    type IntoIter = std::slice::Iter<'a, EntityDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.iter()
    }
}

#[cfg(test)]
mod tests {
    use entdef_core::{color::Color, geometry::BoundingBox};

    use super::*;

    fn point(name: &str) -> EntityDefinition {
        EntityDefinition::new_point(
            Id::new(name),
            Color::default(),
            "",
            Vec::new(),
            BoundingBox::default_point(),
            None,
        )
    }

    fn brush(name: &str) -> EntityDefinition {
        EntityDefinition::new_brush(Id::new(name), Color::default(), "", Vec::new())
    }

    #[test]
    fn test_indices_are_one_based() {
        let catalog = DefinitionCatalog::new(vec![point("light"), brush("func_wall")]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("light").unwrap().index(), 1);
        assert_eq!(catalog.get("func_wall").unwrap().index(), 2);
        assert_eq!(catalog.by_index(2).unwrap().name(), "func_wall");
        assert!(catalog.by_index(0).is_none());
        assert!(catalog.by_index(3).is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let catalog = DefinitionCatalog::new(vec![point("light")]);
        assert!(catalog.get("Light").is_none());
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_shared_name_finds_first() {
        let catalog = DefinitionCatalog::new(vec![point("trigger"), brush("trigger")]);
        assert!(catalog.get("trigger").unwrap().is_point());
        assert_eq!(catalog.point_definitions().count(), 1);
        assert_eq!(catalog.brush_definitions().count(), 1);
    }

    #[test]
    fn test_usage_tracking() {
        let mut catalog = DefinitionCatalog::new(vec![point("light")]);
        catalog.get_mut("light").unwrap().increment_usage();
        assert_eq!(catalog.get("light").unwrap().usage_count(), 1);
    }
}

//! Resolved entity definitions.
//!
//! An [`EntityDefinition`] is the final, inheritance-resolved description of a
//! placeable entity class. Definitions are built once by the definition factory
//! and only their catalog index and usage count change afterwards.

use crate::{
    attribute::{AttributeDefinition, SPAWNFLAGS},
    color::Color,
    geometry::BoundingBox,
    identifier::Id,
    model::ModelDefinition,
};

/// Variant-specific payload of an entity definition.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityDefinitionKind {
    /// An entity placed at a point, drawn with a box or a model.
    Point {
        bounds: BoundingBox,
        model_definition: Option<ModelDefinition>,
    },
    /// An entity made of brushes.
    Brush,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityDefinition {
    index: usize,
    name: Id,
    color: Color,
    description: String,
    usage_count: usize,
    attributes: Vec<AttributeDefinition>,
    kind: EntityDefinitionKind,
}

impl EntityDefinition {
    /// Creates a point entity definition.
    pub fn new_point(
        name: Id,
        color: Color,
        description: impl Into<String>,
        attributes: Vec<AttributeDefinition>,
        bounds: BoundingBox,
        model_definition: Option<ModelDefinition>,
    ) -> Self {
        Self::new(
            name,
            color,
            description.into(),
            attributes,
            EntityDefinitionKind::Point {
                bounds,
                model_definition,
            },
        )
    }

    /// Creates a brush entity definition.
    pub fn new_brush(
        name: Id,
        color: Color,
        description: impl Into<String>,
        attributes: Vec<AttributeDefinition>,
    ) -> Self {
        Self::new(
            name,
            color,
            description.into(),
            attributes,
            EntityDefinitionKind::Brush,
        )
    }

    fn new(
        name: Id,
        color: Color,
        description: String,
        attributes: Vec<AttributeDefinition>,
        kind: EntityDefinitionKind,
    ) -> Self {
        Self {
            index: 0,
            name,
            color,
            description,
            usage_count: 0,
            attributes,
            kind,
        }
    }

    /// Catalog index; `0` until the owning catalog assigns one.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn usage_count(&self) -> usize {
        self.usage_count
    }

    pub fn increment_usage(&mut self) {
        self.usage_count += 1;
    }

    pub fn decrement_usage(&mut self) {
        self.usage_count = self.usage_count.saturating_sub(1);
    }

    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.attributes
    }

    /// Looks up an attribute by its case-sensitive name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|attribute| attribute.name() == name)
    }

    /// Returns the `spawnflags` attribute if it is declared as flags.
    pub fn spawnflags(&self) -> Option<&AttributeDefinition> {
        self.attribute(SPAWNFLAGS)
            .filter(|attribute| attribute.flag_options().is_some())
    }

    pub fn kind(&self) -> &EntityDefinitionKind {
        &self.kind
    }

    pub fn is_point(&self) -> bool {
        matches!(self.kind, EntityDefinitionKind::Point { .. })
    }

    pub fn is_brush(&self) -> bool {
        matches!(self.kind, EntityDefinitionKind::Brush)
    }

    /// Bounds of a point entity.
    pub fn bounds(&self) -> Option<BoundingBox> {
        match &self.kind {
            EntityDefinitionKind::Point { bounds, .. } => Some(*bounds),
            EntityDefinitionKind::Brush => None,
        }
    }

    /// Model definition of a point entity.
    pub fn model_definition(&self) -> Option<&ModelDefinition> {
        match &self.kind {
            EntityDefinitionKind::Point {
                model_definition, ..
            } => model_definition.as_ref(),
            EntityDefinitionKind::Brush => None,
        }
    }
}

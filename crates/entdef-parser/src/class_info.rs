//! Intermediate class records produced by the format parsers.
//!
//! A [`ClassInfo`] holds everything one class declaration says about itself,
//! before inheritance is resolved. Every optional field stays `None` until the
//! declaration sets it, so the resolver can tell inherited values apart from
//! declared ones.

use std::{fmt, path::PathBuf};

use entdef_core::{
    attribute::AttributeDefinition, color::Color, geometry::BoundingBox, identifier::Id,
    location::Location, model::ModelDefinition,
};

/// The declared kind of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Point,
    Brush,
    /// A class that only exists to be inherited from.
    Base,
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClassKind::Point => "point",
            ClassKind::Brush => "brush",
            ClassKind::Base => "base",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub(crate) kind: ClassKind,
    pub(crate) name: Id,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<Color>,
    pub(crate) size: Option<BoundingBox>,
    pub(crate) model_definition: Option<ModelDefinition>,
    pub(crate) attributes: Vec<AttributeDefinition>,
    pub(crate) superclass_names: Vec<Id>,
    pub(crate) location: Location,
    pub(crate) file: Option<PathBuf>,
}

impl ClassInfo {
    pub fn new(kind: ClassKind, name: impl Into<Id>, location: Location) -> Self {
        Self {
            kind,
            name: name.into(),
            description: None,
            color: None,
            size: None,
            model_definition: None,
            attributes: Vec::new(),
            superclass_names: Vec::new(),
            location,
            file: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_size(mut self, size: BoundingBox) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_model_definition(mut self, model_definition: ModelDefinition) -> Self {
        self.model_definition = Some(model_definition);
        self
    }

    /// Appends an attribute, ignoring it if the name is already taken.
    pub fn with_attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.add_attribute(attribute);
        self
    }

    pub fn with_superclass(mut self, name: impl Into<Id>) -> Self {
        self.superclass_names.push(name.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Appends an attribute unless one with the same name exists.
    ///
    /// Returns `false` and drops `attribute` if the name is already taken.
    pub fn add_attribute(&mut self, attribute: AttributeDefinition) -> bool {
        if self.attribute(attribute.name()).is_some() {
            return false;
        }
        self.attributes.push(attribute);
        true
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn size(&self) -> Option<BoundingBox> {
        self.size
    }

    pub fn model_definition(&self) -> Option<&ModelDefinition> {
        self.model_definition.as_ref()
    }

    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.attributes
    }

    pub fn attribute(&self, name: Id) -> Option<&AttributeDefinition> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name() == name)
    }

    pub(crate) fn attribute_mut(&mut self, name: Id) -> Option<&mut AttributeDefinition> {
        self.attributes
            .iter_mut()
            .find(|attribute| attribute.name() == name)
    }

    pub fn superclass_names(&self) -> &[Id] {
        &self.superclass_names
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Line of the declaration; later lines win over earlier redeclarations.
    pub fn line(&self) -> usize {
        self.location.line()
    }

    pub fn file(&self) -> Option<&std::path::Path> {
        self.file.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use entdef_core::attribute::AttributeCommon;

    use super::*;

    fn string(name: &str, default: &str) -> AttributeDefinition {
        AttributeDefinition::String {
            common: AttributeCommon::new(name),
            default: Some(default.to_string()),
        }
    }

    #[test]
    fn test_add_attribute_rejects_duplicate_names() {
        let mut class = ClassInfo::new(ClassKind::Point, "info_null", Location::new(1, 1));

        assert!(class.add_attribute(string("target", "first")));
        assert!(!class.add_attribute(string("target", "second")));
        assert!(class.add_attribute(string("Target", "other case")));

        assert_eq!(class.attributes().len(), 2);
        assert_eq!(
            class
                .attribute(Id::new("target"))
                .and_then(AttributeDefinition::default_value_text),
            Some("first".to_string())
        );
    }

    #[test]
    fn test_builder_leaves_unset_fields_empty() {
        let class = ClassInfo::new(ClassKind::Base, "Targetname", Location::new(3, 1))
            .with_superclass("Angle");

        assert!(class.description().is_none());
        assert!(class.color().is_none());
        assert!(class.size().is_none());
        assert!(class.model_definition().is_none());
        assert_eq!(class.superclass_names(), &[Id::new("Angle")]);
        assert_eq!(class.line(), 3);
    }
}

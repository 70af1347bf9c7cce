//! Builds entity definitions from resolved class records.

use log::trace;

use entdef_core::{color::Color, definition::EntityDefinition, geometry::BoundingBox};

use crate::class_info::{ClassInfo, ClassKind};

/// Creates the definition of one resolved class.
///
/// Returns `None` for base classes. Unset descriptions become empty, unset
/// colors become `default_color`, and point classes without a size get
/// [`BoundingBox::default_point`].
pub fn create_definition(class: &ClassInfo, default_color: Color) -> Option<EntityDefinition> {
    let color = class.color.unwrap_or(default_color);
    let description = class.description.clone().unwrap_or_default();

    let definition = match class.kind {
        ClassKind::Point => EntityDefinition::new_point(
            class.name,
            color,
            description,
            class.attributes.clone(),
            class.size.unwrap_or_else(BoundingBox::default_point),
            class.model_definition.clone(),
        ),
        ClassKind::Brush => EntityDefinition::new_brush(
            class.name,
            color,
            description,
            class.attributes.clone(),
        ),
        ClassKind::Base => return None,
    };

    trace!(name = class.name.to_string(), kind = class.kind.to_string(); "Created entity definition");
    Some(definition)
}

/// Creates definitions for every point and brush class, in input order.
pub fn create_definitions(classes: &[ClassInfo], default_color: Color) -> Vec<EntityDefinition> {
    classes
        .iter()
        .filter_map(|class| create_definition(class, default_color))
        .collect()
}

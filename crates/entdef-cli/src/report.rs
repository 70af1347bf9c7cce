//! Plain-text catalog report.

use std::fmt::{self, Write};

use entdef::{
    DefinitionCatalog,
    attribute::AttributeDefinition,
    definition::{EntityDefinition, EntityDefinitionKind},
};

/// Renders every definition with its attributes.
///
/// ```text
/// @point 1 light "Non-displayed light."
///     color 0 1 0 1
///     bounds (-8 -8 -8) (8 8 8)
///     light: integer = 300 "Brightness"
///     spawnflags: flags
///         1 "Start off"
/// ```
pub fn render_catalog(catalog: &DefinitionCatalog) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for definition in catalog {
        render_definition(&mut out, definition)?;
    }
    Ok(out)
}

fn render_definition(out: &mut String, definition: &EntityDefinition) -> fmt::Result {
    let kind = if definition.is_point() {
        "point"
    } else {
        "brush"
    };
    write!(out, "@{kind} {} {}", definition.index(), definition.name())?;
    if !definition.description().is_empty() {
        write!(out, " {:?}", first_line(definition.description()))?;
    }
    writeln!(out)?;
    writeln!(out, "    color {}", definition.color())?;

    if let EntityDefinitionKind::Point {
        bounds,
        model_definition,
    } = definition.kind()
    {
        writeln!(out, "    bounds {bounds}")?;
        if let Some(model) = model_definition {
            writeln!(out, "    model {model}")?;
        }
    }

    for attribute in definition.attributes() {
        render_attribute(out, attribute)?;
    }
    Ok(())
}

fn render_attribute(out: &mut String, attribute: &AttributeDefinition) -> fmt::Result {
    write!(out, "    {}: {}", attribute.name(), attribute.kind())?;
    if let Some(default) = attribute.default_value_text() {
        write!(out, " = {default}")?;
    }
    if !attribute.short_description().is_empty() {
        write!(out, " {:?}", attribute.short_description())?;
    }
    if attribute.is_read_only() {
        out.push_str(" (read-only)");
    }
    writeln!(out)?;

    if let Some(options) = attribute.choice_options() {
        for option in options {
            writeln!(out, "        {} {:?}", option.value(), option.description())?;
        }
    }
    if let Some(options) = attribute.flag_options() {
        for option in options {
            let marker = if option.is_default() { " *" } else { "" };
            writeln!(
                out,
                "        {} {:?}{marker}",
                option.value(),
                option.short_description()
            )?;
        }
    }
    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}

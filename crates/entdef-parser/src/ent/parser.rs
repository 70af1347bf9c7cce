//! Parser for ENT class elements.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{debug, info};

use entdef_core::{
    attribute::{AttributeCommon, AttributeDefinition, ChoiceOption, FlagOption},
    color::Color,
    geometry::{BoundingBox, Vec3},
    identifier::Id,
    location::Location,
    model::ModelDefinition,
};

use crate::{
    DefinitionParser,
    class_info::{ClassInfo, ClassKind},
    cursor::Snapshot,
    el::Termination,
    ent::xml::{self, XmlAttribute, XmlElement},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError, Result},
    file_system::normalize_path,
    model::parse_model_definition,
    typed_default::{TypedKind, typed_attribute},
};

const ROOT_ELEMENT: &str = "classes";

/// Parser for ENT definition files.
pub struct EntParser<'src> {
    source: &'src str,
    default_color: Color,
    path: Option<PathBuf>,
}

impl<'src> EntParser<'src> {
    pub fn new(source: &'src str, default_color: Color) -> Self {
        Self {
            source,
            default_color,
            path: None,
        }
    }

    /// Sets the path reported with diagnostics and class records.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(normalize_path(path.as_ref()));
        self
    }

    fn parse_root(
        &self,
        root: &XmlElement<'_>,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<Vec<ClassInfo>> {
        if root.name != ROOT_ELEMENT {
            return Err(Diagnostic::error(format!(
                "expected `<{ROOT_ELEMENT}>` as the document root, found `<{}>`",
                root.name
            ))
            .with_code(ErrorCode::E103)
            .with_location(root.location)
            .with_label(root.span, "document root"));
        }

        let templates = self.parse_list_templates(root, diagnostics);

        let mut classes = Vec::new();
        for element in root.elements() {
            let kind = match element.name {
                "point" => ClassKind::Point,
                "group" => ClassKind::Brush,
                "list" => continue,
                _ => {
                    self.warn(
                        diagnostics,
                        ErrorCode::E209,
                        element,
                        format!("unexpected element `<{}>` is ignored", element.name),
                    );
                    continue;
                }
            };
            if let Some(class) = self.parse_class(kind, element, &templates, diagnostics)? {
                classes.push(class);
            }
        }
        Ok(classes)
    }

    /// Collect every `<list>` so classes may use templates declared after them
    fn parse_list_templates(
        &self,
        root: &XmlElement<'_>,
        diagnostics: &mut DiagnosticCollector,
    ) -> HashMap<String, Vec<ChoiceOption>> {
        let mut templates = HashMap::new();
        let mut declared: HashMap<&str, Location> = HashMap::new();
        for list in root.elements().filter(|element| element.name == "list") {
            let Some(name) = self.required(list, "name", diagnostics) else {
                continue;
            };

            let mut options = Vec::new();
            for item in list.elements() {
                if item.name != "item" {
                    self.warn(
                        diagnostics,
                        ErrorCode::E209,
                        item,
                        format!("unexpected element `<{}>` in list `{name}`", item.name),
                    );
                    continue;
                }
                let (Some(caption), Some(value)) = (
                    self.required(item, "name", diagnostics),
                    self.required(item, "value", diagnostics),
                ) else {
                    continue;
                };
                options.push(ChoiceOption::new(value, caption));
            }

            debug!(list = name, options = options.len(); "Registered choice template");
            templates.insert(name.to_string(), options);
            if let Some(first) = declared.insert(name, list.location) {
                self.warn(
                    diagnostics,
                    ErrorCode::E201,
                    list,
                    format!("duplicate list `{name}` replaces the one at {first}"),
                );
            }
        }
        templates
    }

    fn parse_class(
        &self,
        kind: ClassKind,
        element: &XmlElement<'_>,
        templates: &HashMap<String, Vec<ChoiceOption>>,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<Option<ClassInfo>> {
        let Some(name) = self.required(element, "name", diagnostics) else {
            return Ok(None);
        };

        let mut class = ClassInfo::new(kind, Id::new(name), element.location);
        class.file = self.path.clone();

        let description = element.text();
        if !description.is_empty() {
            class.description = Some(description);
        }

        if let Some(color) = element.attribute("color") {
            class.color = self.parse_color(color, diagnostics);
        }

        if kind == ClassKind::Point {
            if let Some(bounds) = element.attribute("box") {
                class.size = self.parse_box(bounds, diagnostics);
            }
            if let Some(model) = element.attribute("model") {
                class.model_definition = Some(self.parse_model(model, diagnostics)?);
            }
        }

        let mut declared = HashMap::new();
        for child in element.elements() {
            self.parse_attribute(&mut class, child, templates, &mut declared, diagnostics);
        }

        debug!(name = name, kind = kind.to_string(); "Parsed class");
        Ok(Some(class))
    }

    fn parse_attribute(
        &self,
        class: &mut ClassInfo,
        element: &XmlElement<'_>,
        templates: &HashMap<String, Vec<ChoiceOption>>,
        declared: &mut HashMap<Id, Location>,
        diagnostics: &mut DiagnosticCollector,
    ) {
        let Some(key) = self.required(element, "key", diagnostics) else {
            return;
        };

        if element.name == "flag" {
            self.parse_flag(class, key, element, declared, diagnostics);
            return;
        }

        let common = AttributeCommon::new(key)
            .with_short_description(element.attribute_value("name").unwrap_or_default())
            .with_long_description(element.text());
        let default = element.attribute_value("value").map(str::to_string);

        let typed_kind = match element.name {
            "integer" => Some(TypedKind::Integer),
            "real" => Some(TypedKind::Float),
            "boolean" => Some(TypedKind::Boolean),
            _ => None,
        };
        let attribute = match (typed_kind, element.name) {
            (Some(kind), _) => typed_attribute(kind, common, default.as_deref()).unwrap_or_else(
                |invalid| {
                    self.warn(diagnostics, ErrorCode::E202, element, invalid.message);
                    invalid.attribute
                },
            ),
            (None, "string") => AttributeDefinition::String { common, default },
            (None, "target") => AttributeDefinition::TargetDestination { common },
            (None, "targetname") => AttributeDefinition::TargetSource { common },
            (None, name) => match templates.get(name) {
                Some(options) => AttributeDefinition::Choice {
                    common,
                    options: options.clone(),
                    default,
                },
                None => AttributeDefinition::Unknown { common, default },
            },
        };

        let name = attribute.name();
        if class.add_attribute(attribute) {
            declared.insert(name, element.location);
        } else {
            self.warn(
                diagnostics,
                ErrorCode::E201,
                element,
                format!(
                    "duplicate attribute `{key}` is ignored, keeping the declaration{}",
                    declared_at(declared, name)
                ),
            );
        }
    }

    /// `<flag key="spawnflags" name="..." bit="n"/>` adds bit `1 << n` to a flags attribute
    fn parse_flag(
        &self,
        class: &mut ClassInfo,
        key: &str,
        element: &XmlElement<'_>,
        declared: &mut HashMap<Id, Location>,
        diagnostics: &mut DiagnosticCollector,
    ) {
        let Some(bit) = self.required(element, "bit", diagnostics) else {
            return;
        };
        let Some(value) = bit
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|bit| 1_i32.checked_shl(bit))
        else {
            self.warn(
                diagnostics,
                ErrorCode::E210,
                element,
                format!("invalid flag bit '{bit}' for attribute `{key}`"),
            );
            return;
        };

        let option = FlagOption::new(
            value,
            element.attribute_value("name").unwrap_or_default(),
            element.text(),
            false,
        );

        let name = Id::new(key);
        match class.attribute_mut(name) {
            Some(AttributeDefinition::Flags { options, .. }) => {
                if options.iter().any(|existing| existing.value() == value) {
                    self.warn(
                        diagnostics,
                        ErrorCode::E201,
                        element,
                        format!("duplicate flag bit {value} of `{key}` is ignored"),
                    );
                } else {
                    options.push(option);
                }
            }
            Some(_) => self.warn(
                diagnostics,
                ErrorCode::E201,
                element,
                format!(
                    "flag of `{key}` conflicts with the non-flags attribute{} and is ignored",
                    declared_at(declared, name)
                ),
            ),
            None => {
                class.add_attribute(AttributeDefinition::Flags {
                    common: AttributeCommon::new(name),
                    options: vec![option],
                });
                declared.insert(name, element.location);
            }
        }
    }

    fn parse_color(
        &self,
        attribute: &XmlAttribute<'_>,
        diagnostics: &mut DiagnosticCollector,
    ) -> Option<Color> {
        match Color::parse(&attribute.value) {
            Ok(color) => Some(color),
            Err(err) => {
                self.warn_value(diagnostics, attribute, err.to_string());
                None
            }
        }
    }

    /// `box="minx miny minz maxx maxy maxz"`
    fn parse_box(
        &self,
        attribute: &XmlAttribute<'_>,
        diagnostics: &mut DiagnosticCollector,
    ) -> Option<BoundingBox> {
        let values: Option<Vec<f32>> = attribute
            .value
            .split_whitespace()
            .map(|value| value.parse().ok())
            .collect();
        match values.as_deref() {
            Some(&[x1, y1, z1, x2, y2, z2]) => Some(BoundingBox::repaired(
                Vec3::new(x1, y1, z1),
                Vec3::new(x2, y2, z2),
            )),
            _ => {
                self.warn_value(
                    diagnostics,
                    attribute,
                    format!(
                        "invalid box '{}', expected six numbers",
                        attribute.value
                    ),
                );
                None
            }
        }
    }

    /// Model attributes are parsed as standalone text and relocated into the document
    fn parse_model(
        &self,
        attribute: &XmlAttribute<'_>,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<ModelDefinition> {
        let relocate = |diagnostic: Diagnostic| {
            diagnostic
                .relocated(attribute.value_location, attribute.value_span)
                .with_file(self.path.as_ref())
        };

        let mut model_diagnostics = DiagnosticCollector::new();
        let parsed = parse_model_definition(
            &attribute.value,
            Snapshot::start(),
            Termination::Document,
            None,
            &mut model_diagnostics,
        );
        for diagnostic in model_diagnostics.into_diagnostics() {
            diagnostics.emit(relocate(diagnostic));
        }
        parsed.map(|parsed| parsed.definition).map_err(relocate)
    }

    /// Look up a required attribute, warning when it is missing
    fn required<'e>(
        &self,
        element: &'e XmlElement<'_>,
        name: &str,
        diagnostics: &mut DiagnosticCollector,
    ) -> Option<&'e str> {
        let value = element.attribute_value(name);
        if value.is_none() {
            self.warn(
                diagnostics,
                ErrorCode::E208,
                element,
                format!(
                    "`<{}>` is missing the `{name}` attribute and is ignored",
                    element.name
                ),
            );
        }
        value
    }

    fn warn(
        &self,
        diagnostics: &mut DiagnosticCollector,
        code: ErrorCode,
        element: &XmlElement<'_>,
        message: impl Into<String>,
    ) {
        diagnostics.emit(
            Diagnostic::warning(message)
                .with_code(code)
                .with_location(element.location)
                .with_file(self.path.as_ref())
                .with_label(element.span, code.description()),
        );
    }

    fn warn_value(
        &self,
        diagnostics: &mut DiagnosticCollector,
        attribute: &XmlAttribute<'_>,
        message: impl Into<String>,
    ) {
        diagnostics.emit(
            Diagnostic::warning(message)
                .with_code(ErrorCode::E210)
                .with_location(attribute.value_location)
                .with_file(self.path.as_ref())
                .with_label(attribute.value_span, ErrorCode::E210.description()),
        );
    }
}

/// ` at <location>` of the first declaration of `name`, if known
fn declared_at(declared: &HashMap<Id, Location>, name: Id) -> String {
    declared
        .get(&name)
        .map(|location| format!(" at {location}"))
        .unwrap_or_default()
}

impl DefinitionParser for EntParser<'_> {
    fn default_color(&self) -> Color {
        self.default_color
    }

    fn parse_class_infos(
        &mut self,
        diagnostics: &mut DiagnosticCollector,
    ) -> std::result::Result<Vec<ClassInfo>, ParseError> {
        let file = self.path.as_ref().map(|path| path.display().to_string());
        info!(file:?; "Parsing ENT definitions");

        let with_file = |diagnostic: Diagnostic| diagnostic.with_file(self.path.as_ref());
        let Some(root) = xml::parse_document(self.source).map_err(with_file)? else {
            return Ok(Vec::new());
        };
        let classes = self.parse_root(&root, diagnostics).map_err(with_file)?;

        debug!(classes = classes.len(); "Parsed ENT classes");
        Ok(classes)
    }
}

#[cfg(test)]
mod tests {
    use entdef_core::attribute::AttributeKind;

    use super::*;

    fn parse(source: &str) -> (Vec<ClassInfo>, DiagnosticCollector) {
        let mut diagnostics = DiagnosticCollector::new();
        let classes = EntParser::new(source, Color::default())
            .parse_class_infos(&mut diagnostics)
            .unwrap_or_else(|err| panic!("Expected parsing to succeed, but got error: {err}"));
        (classes, diagnostics)
    }

    fn codes(diagnostics: &DiagnosticCollector) -> Vec<ErrorCode> {
        diagnostics
            .diagnostics()
            .iter()
            .filter_map(Diagnostic::code)
            .collect()
    }

    #[test]
    fn test_point_and_group() {
        let (classes, diagnostics) = parse(
            r#"<?xml version="1.0"?>
<classes>
<point name="light" color="0 1 0" box="8 8 8 -8 -8 -8">
Non-displayed light.
<integer key="light" name="Brightness" value="300">Light intensity</integer>
<real key="wait" name="Wait" value="0.5"/>
<boolean key="start_on" name="Start on" value="1"/>
<string key="message" name="Message"/>
<target key="target" name="Target"/>
<targetname key="targetname" name="Name"/>
<sound key="noise" name="Sound" value="misc/null.wav"/>
</point>
<group name="func_wall" color="0 .5 .8">A wall.</group>
</classes>"#,
        );

        assert!(diagnostics.is_empty());
        assert_eq!(classes.len(), 2);

        let light = &classes[0];
        assert_eq!(light.kind(), ClassKind::Point);
        assert_eq!(light.line(), 3);
        assert_eq!(light.description(), Some("Non-displayed light."));
        assert_eq!(light.color(), Some(Color::from_channels(0.0, 1.0, 0.0)));
        assert_eq!(light.size(), Some(BoundingBox::default_point()));

        let kinds: Vec<AttributeKind> = light
            .attributes()
            .iter()
            .map(AttributeDefinition::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                AttributeKind::Integer,
                AttributeKind::Float,
                AttributeKind::Boolean,
                AttributeKind::String,
                AttributeKind::TargetDestination,
                AttributeKind::TargetSource,
                AttributeKind::Unknown,
            ]
        );
        let brightness = light.attribute(Id::new("light")).unwrap();
        assert_eq!(brightness.short_description(), "Brightness");
        assert_eq!(brightness.long_description(), "Light intensity");
        assert_eq!(brightness.default_value_text().as_deref(), Some("300"));

        let wall = &classes[1];
        assert_eq!(wall.kind(), ClassKind::Brush);
        assert_eq!(wall.description(), Some("A wall."));
        assert!(wall.attributes().is_empty());
    }

    #[test]
    fn test_list_templates_and_flags() {
        let (classes, diagnostics) = parse(
            r#"<classes>
<point name="light">
<style key="style" name="Appearance" value="1"/>
<flag key="spawnflags" name="Start off" bit="0"/>
<flag key="spawnflags" name="Hidden" bit="3">Not drawn</flag>
</point>
<list name="style">
<item name="Normal" value="0"/>
<item name="Flicker" value="1"/>
</list>
</classes>"#,
        );

        assert!(diagnostics.is_empty());
        let class = &classes[0];

        let style = class.attribute(Id::new("style")).unwrap();
        let options = style.choice_options().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].value(), "1");
        assert_eq!(options[1].description(), "Flicker");
        assert_eq!(style.default_value_text().as_deref(), Some("1"));

        let spawnflags = class.attribute(Id::new("spawnflags")).unwrap();
        assert!(spawnflags.is_spawnflags());
        let values: Vec<i32> = spawnflags
            .flag_options()
            .unwrap()
            .iter()
            .map(FlagOption::value)
            .collect();
        assert_eq!(values, vec![1, 8]);
        assert_eq!(spawnflags.flag(8).unwrap().long_description(), "Not drawn");
    }

    #[test]
    fn test_duplicates_cite_first_declaration() {
        let (classes, diagnostics) = parse(
            r#"<classes>
<point name="item">
<string key="k" name="First"/>
<string key="k" name="Second"/>
<flag key="k" name="Bit" bit="0"/>
</point>
<list name="style"><item name="Normal" value="0"/></list>
<list name="style"><item name="Flicker" value="1"/></list>
</classes>"#,
        );

        let class = &classes[0];
        assert_eq!(class.attributes().len(), 1);
        assert_eq!(class.attribute(Id::new("k")).unwrap().short_description(), "First");
        assert_eq!(
            codes(&diagnostics),
            vec![ErrorCode::E201, ErrorCode::E201, ErrorCode::E201]
        );

        let messages: Vec<&str> = diagnostics
            .diagnostics()
            .iter()
            .map(Diagnostic::message)
            .collect();
        assert_eq!(messages[0], "duplicate list `style` replaces the one at line 7, column 1");
        assert_eq!(
            messages[1],
            "duplicate attribute `k` is ignored, keeping the declaration at line 3, column 1"
        );
        assert_eq!(
            messages[2],
            "flag of `k` conflicts with the non-flags attribute at line 3, column 1 and is ignored"
        );
    }

    #[test]
    fn test_missing_required_attributes() {
        let (classes, diagnostics) = parse(
            r#"<classes>
<point color="1 0 0"/>
<point name="item">
<integer name="No key"/>
<flag key="spawnflags" name="Broken" bit="x"/>
</point>
<unknown/>
</classes>"#,
        );

        assert_eq!(classes.len(), 1);
        assert!(classes[0].attributes().is_empty());
        assert_eq!(
            codes(&diagnostics),
            vec![ErrorCode::E208, ErrorCode::E208, ErrorCode::E210, ErrorCode::E209]
        );
    }

    #[test]
    fn test_invalid_values() {
        let (classes, diagnostics) = parse(
            r#"<classes>
<point name="item" color="bright" box="1 2 3">
<integer key="count" value="many"/>
</point>
</classes>"#,
        );

        let class = &classes[0];
        assert_eq!(class.color(), None);
        assert_eq!(class.size(), None);
        let count = class.attribute(Id::new("count")).unwrap();
        assert_eq!(count.kind(), AttributeKind::Unknown);
        assert_eq!(count.default_value_text().as_deref(), Some("many"));
        assert_eq!(
            codes(&diagnostics),
            vec![ErrorCode::E210, ErrorCode::E210, ErrorCode::E202]
        );
    }

    #[test]
    fn test_model_attribute() {
        let (classes, diagnostics) = parse(
            r#"<classes>
<point name="item_armor" model="{{ spawnflags == 1 -&gt; &quot;:progs/a.mdl&quot;, &quot;:progs/b.mdl&quot; }}"/>
</classes>"#,
        );
        assert!(diagnostics.is_empty());
        assert!(classes[0].model_definition().is_some());
    }

    #[test]
    fn test_legacy_model_attribute_is_relocated() {
        let (classes, diagnostics) = parse(
            "<classes>\n<point name=\"item\" model='\":progs/a.mdl\" 1'/>\n</classes>",
        );

        assert!(classes[0].model_definition().is_some());
        let diagnostic = &diagnostics.diagnostics()[0];
        assert_eq!(diagnostic.code(), Some(ErrorCode::E203));
        let location = diagnostic.location().unwrap();
        assert_eq!((location.line(), location.column()), (2, 27));
    }

    #[test]
    fn test_empty_document() {
        let (classes, diagnostics) = parse("");
        assert!(classes.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_wrong_root_fails() {
        let mut diagnostics = DiagnosticCollector::new();
        let err = EntParser::new("<entities/>", Color::default())
            .with_path("defs/quake.ent")
            .parse_class_infos(&mut diagnostics)
            .unwrap_err();

        let diagnostic = &err.diagnostics()[0];
        assert_eq!(diagnostic.code(), Some(ErrorCode::E103));
        assert_eq!(diagnostic.file(), Some(Path::new("defs/quake.ent")));
    }

    #[test]
    fn test_malformed_xml_fails() {
        let mut diagnostics = DiagnosticCollector::new();
        let result = EntParser::new("<classes><point name=\"a\"></classes>", Color::default())
            .parse_class_infos(&mut diagnostics);
        assert!(result.is_err());
    }
}

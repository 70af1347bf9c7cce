//! Parser for `/*QUAKED` definitions.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{debug, info};

use entdef_core::{
    attribute::{AttributeCommon, AttributeDefinition, ChoiceOption, FlagOption, SPAWNFLAGS},
    color::Color,
    geometry::{BoundingBox, Vec3},
    identifier::Id,
    location::Location,
};

use crate::{
    DefinitionParser,
    class_info::{ClassInfo, ClassKind},
    def::lexer::{DefLexer, DefToken, DefTokenKind, Newlines},
    el::Termination,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError, Result},
    file_system::normalize_path,
    model::parse_model_definition,
};

/// Word in a flag list that reserves a bit without declaring an option.
const RESERVED_FLAG: &str = "-";

/// Where the attributes and the model of one class were first declared.
#[derive(Debug, Default)]
struct Declarations {
    attributes: HashMap<Id, Location>,
    model: Option<Location>,
}

impl Declarations {
    /// ` at <location>` of the first declaration of attribute `name`, if known
    fn attribute_at(&self, name: Id) -> String {
        self.attributes
            .get(&name)
            .map(|location| format!(" at {location}"))
            .unwrap_or_default()
    }
}

/// Parser for DEF definition files.
pub struct DefParser<'src> {
    lexer: DefLexer<'src>,
    default_color: Color,
    path: Option<PathBuf>,
}

impl<'src> DefParser<'src> {
    pub fn new(source: &'src str, default_color: Color) -> Self {
        Self {
            lexer: DefLexer::new(source),
            default_color,
            path: None,
        }
    }

    /// Sets the path reported with diagnostics and class records.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(normalize_path(path.as_ref()));
        self
    }

    /// Parse one definition after its `/*QUAKED` marker
    fn parse_class(
        &mut self,
        location: Location,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<ClassInfo> {
        let name = self.next(Newlines::Significant)?;
        if !matches!(name.kind, DefTokenKind::Word | DefTokenKind::Integer) {
            return Err(unexpected_token(&name, "class name"));
        }

        let mut class = ClassInfo::new(ClassKind::Base, Id::new(name.text), location);
        class.file = self.path.clone();

        if self.peek(Newlines::Significant)?.kind == DefTokenKind::OpenParen {
            self.parse_header(&mut class, diagnostics)?;
        } else {
            self.finish_header_line()?;
        }

        if self.lexer.at_block_start() {
            self.parse_block(&mut class, diagnostics)?;
        }

        let description = self.lexer.read_description()?.trim();
        if !description.is_empty() {
            class.description = Some(description.to_string());
        }

        debug!(name = name.text, kind = class.kind.to_string(); "Parsed definition");
        Ok(class)
    }

    /// Parse `(r g b) (min) (max) flags...` or `(r g b) ? flags...`
    fn parse_header(
        &mut self,
        class: &mut ClassInfo,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<()> {
        let [r, g, b] = self.parse_triple()?;
        class.color = Some(Color::from_channels(r, g, b));

        let token = self.peek(Newlines::Significant)?;
        match token.kind {
            DefTokenKind::OpenParen => {
                let min = Vec3::from(self.parse_triple()?);
                let max = Vec3::from(self.parse_triple()?);
                class.kind = ClassKind::Point;
                class.size = Some(BoundingBox::repaired(min, max));
            }
            DefTokenKind::Question => {
                self.next(Newlines::Significant)?;
                class.kind = ClassKind::Brush;
            }
            _ => return Err(unexpected_token(&token, "bounding box or `?`")),
        }

        let mut options = Vec::new();
        let mut declared_any = false;
        for index in 0.. {
            let token = self.peek(Newlines::Significant)?;
            match token.kind {
                DefTokenKind::Word | DefTokenKind::Integer | DefTokenKind::Decimal => {
                    self.next(Newlines::Significant)?;
                }
                DefTokenKind::Newline => {
                    self.next(Newlines::Significant)?;
                    break;
                }
                DefTokenKind::EndDefinition | DefTokenKind::Eof => break,
                _ => return Err(unexpected_token(&token, "flag name or end of line")),
            }

            declared_any = true;
            if token.text == RESERVED_FLAG {
                continue;
            }
            match 1_i32.checked_shl(index) {
                Some(bit) => options.push(FlagOption::new(bit, token.text, "", false)),
                None => self.warn(
                    diagnostics,
                    ErrorCode::E210,
                    &token,
                    format!("flag `{}` does not fit into 32 bits and is ignored", token.text),
                ),
            }
        }

        if declared_any {
            class.add_attribute(AttributeDefinition::Flags {
                common: AttributeCommon::new(SPAWNFLAGS),
                options,
            });
        }
        Ok(())
    }

    /// A base class header is only its name
    fn finish_header_line(&mut self) -> Result<()> {
        let token = self.peek(Newlines::Significant)?;
        match token.kind {
            DefTokenKind::Newline => {
                self.next(Newlines::Significant)?;
                Ok(())
            }
            DefTokenKind::EndDefinition | DefTokenKind::Eof => Ok(()),
            _ => Err(unexpected_token(&token, "color or end of line")),
        }
    }

    fn parse_triple(&mut self) -> Result<[f32; 3]> {
        self.expect(DefTokenKind::OpenParen, "`(`")?;
        let mut values = [0.0; 3];
        for value in &mut values {
            let token = self.next(Newlines::Significant)?;
            *value = match token.kind {
                DefTokenKind::Integer | DefTokenKind::Decimal => token
                    .text
                    .parse()
                    .map_err(|_| unexpected_token(&token, "number"))?,
                _ => return Err(unexpected_token(&token, "number")),
            };
        }
        self.expect(DefTokenKind::CloseParen, "`)`")?;
        Ok(values)
    }

    fn parse_block(
        &mut self,
        class: &mut ClassInfo,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<()> {
        self.expect(DefTokenKind::OpenBrace, "`{`")?;

        // Header flags are declared by the definition line itself.
        let mut declared = Declarations::default();
        for attribute in class.attributes() {
            declared.attributes.insert(attribute.name(), class.location());
        }

        loop {
            let token = self.next(Newlines::Skipped)?;
            match token.kind {
                DefTokenKind::CloseBrace => return Ok(()),
                DefTokenKind::Semicolon => {}
                DefTokenKind::Word => match token.text.to_ascii_lowercase().as_str() {
                    "choice" => self.parse_choice(class, &token, &mut declared, diagnostics)?,
                    "model" => self.parse_model(class, &token, &mut declared, diagnostics)?,
                    "default" => self.parse_default(class, &token, &mut declared, diagnostics)?,
                    "base" => self.parse_base(class)?,
                    _ => {
                        self.warn(
                            diagnostics,
                            ErrorCode::E204,
                            &token,
                            format!("unknown statement `{}` is ignored", token.text),
                        );
                        self.skip_statement()?;
                    }
                },
                _ => return Err(unexpected_token(&token, "statement or `}`")),
            }
        }
    }

    /// Parse `choice "key" ((value, "caption") ...);`
    fn parse_choice(
        &mut self,
        class: &mut ClassInfo,
        keyword: &DefToken<'src>,
        declared: &mut Declarations,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<()> {
        let key = self.expect(DefTokenKind::String, "choice key")?;
        self.expect(DefTokenKind::OpenParen, "`(`")?;

        let mut options = Vec::new();
        while self.eat(DefTokenKind::CloseParen)?.is_none() {
            self.expect(DefTokenKind::OpenParen, "`(` or `)`")?;
            let value = self.next(Newlines::Skipped)?;
            if !matches!(
                value.kind,
                DefTokenKind::Integer | DefTokenKind::Decimal | DefTokenKind::Word | DefTokenKind::String
            ) {
                return Err(unexpected_token(&value, "choice value"));
            }
            self.eat(DefTokenKind::Comma)?;
            let caption = self.expect(DefTokenKind::String, "choice caption")?;
            self.expect(DefTokenKind::CloseParen, "`)`")?;
            options.push(ChoiceOption::new(value.text, caption.text));
        }
        self.eat(DefTokenKind::Semicolon)?;

        let attribute = AttributeDefinition::Choice {
            common: AttributeCommon::new(key.text),
            options,
            default: None,
        };
        let name = attribute.name();
        if class.add_attribute(attribute) {
            declared.attributes.insert(name, keyword.location);
        } else {
            self.warn(
                diagnostics,
                ErrorCode::E201,
                keyword,
                format!(
                    "duplicate attribute `{name}` is ignored, keeping the declaration{}",
                    declared.attribute_at(name)
                ),
            );
        }
        Ok(())
    }

    /// Parse `model(...);`
    fn parse_model(
        &mut self,
        class: &mut ClassInfo,
        keyword: &DefToken<'src>,
        declared: &mut Declarations,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<()> {
        self.expect(DefTokenKind::OpenParen, "`(`")?;
        let parsed = parse_model_definition(
            self.lexer.source(),
            self.lexer.snapshot(),
            Termination::Embedded,
            self.path.as_deref(),
            diagnostics,
        )?;
        self.lexer.restore(parsed.end);
        self.expect(DefTokenKind::CloseParen, "`)`")?;
        self.eat(DefTokenKind::Semicolon)?;

        if let Some(first) = declared.model.replace(keyword.location) {
            self.warn(
                diagnostics,
                ErrorCode::E201,
                keyword,
                format!("duplicate model definition replaces the one at {first}"),
            );
        }
        class.model_definition = Some(parsed.definition);
        Ok(())
    }

    /// Parse `default("key", value);`
    ///
    /// Sets the default of a declared choice or string attribute, or declares
    /// a string attribute when the key is new.
    fn parse_default(
        &mut self,
        class: &mut ClassInfo,
        keyword: &DefToken<'src>,
        declared: &mut Declarations,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<()> {
        self.expect(DefTokenKind::OpenParen, "`(`")?;
        let key = self.expect(DefTokenKind::String, "attribute key")?;
        self.expect(DefTokenKind::Comma, "`,`")?;
        let value = self.next(Newlines::Skipped)?;
        if !matches!(
            value.kind,
            DefTokenKind::Integer | DefTokenKind::Decimal | DefTokenKind::Word | DefTokenKind::String
        ) {
            return Err(unexpected_token(&value, "default value"));
        }
        self.expect(DefTokenKind::CloseParen, "`)`")?;
        self.eat(DefTokenKind::Semicolon)?;

        let name = Id::new(key.text);
        let literal = Some(value.text.to_string());
        let Some(attribute) = class.attribute_mut(name) else {
            class.add_attribute(AttributeDefinition::String {
                common: AttributeCommon::new(name),
                default: literal,
            });
            declared.attributes.insert(name, keyword.location);
            return Ok(());
        };

        match attribute {
            AttributeDefinition::String { default, .. }
            | AttributeDefinition::Unknown { default, .. }
            | AttributeDefinition::Choice { default, .. } => *default = literal,
            _ => {
                let kind = attribute.kind();
                self.warn(
                    diagnostics,
                    ErrorCode::E204,
                    keyword,
                    format!("default for {kind} attribute `{name}` is ignored"),
                );
            }
        }
        Ok(())
    }

    /// Parse `base("name");`
    fn parse_base(&mut self, class: &mut ClassInfo) -> Result<()> {
        self.expect(DefTokenKind::OpenParen, "`(`")?;
        let name = self.expect(DefTokenKind::String, "base class name")?;
        self.expect(DefTokenKind::CloseParen, "`)`")?;
        self.eat(DefTokenKind::Semicolon)?;
        class.superclass_names.push(Id::new(name.text));
        Ok(())
    }

    /// Skip to the end of an unknown statement
    fn skip_statement(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            let token = self.peek(Newlines::Skipped)?;
            match token.kind {
                DefTokenKind::OpenParen => depth += 1,
                DefTokenKind::CloseParen => depth = depth.saturating_sub(1),
                DefTokenKind::Semicolon if depth == 0 => {
                    self.next(Newlines::Skipped)?;
                    return Ok(());
                }
                DefTokenKind::CloseBrace if depth == 0 => return Ok(()),
                DefTokenKind::EndDefinition | DefTokenKind::Eof => {
                    return Err(unexpected_token(&token, "`;`"));
                }
                _ => {}
            }
            self.next(Newlines::Skipped)?;
        }
    }

    fn next(&mut self, newlines: Newlines) -> Result<DefToken<'src>> {
        self.lexer.next_token(newlines)
    }

    fn peek(&mut self, newlines: Newlines) -> Result<DefToken<'src>> {
        self.lexer.peek_token(newlines)
    }

    fn expect(&mut self, kind: DefTokenKind, expected: &str) -> Result<DefToken<'src>> {
        let newlines = if kind == DefTokenKind::Newline {
            Newlines::Significant
        } else {
            Newlines::Skipped
        };
        let token = self.next(newlines)?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected_token(&token, expected))
        }
    }

    /// Consume the next token if it is of `kind`
    fn eat(&mut self, kind: DefTokenKind) -> Result<Option<DefToken<'src>>> {
        let token = self.peek(Newlines::Skipped)?;
        if token.kind != kind {
            return Ok(None);
        }
        self.next(Newlines::Skipped)?;
        Ok(Some(token))
    }

    fn warn(
        &self,
        diagnostics: &mut DiagnosticCollector,
        code: ErrorCode,
        token: &DefToken<'_>,
        message: impl Into<String>,
    ) {
        diagnostics.emit(
            Diagnostic::warning(message)
                .with_code(code)
                .with_location(token.location)
                .with_file(self.path.as_ref())
                .with_label(token.span, code.description()),
        );
    }
}

impl DefinitionParser for DefParser<'_> {
    fn default_color(&self) -> Color {
        self.default_color
    }

    fn parse_class_infos(
        &mut self,
        diagnostics: &mut DiagnosticCollector,
    ) -> std::result::Result<Vec<ClassInfo>, ParseError> {
        let file = self.path.as_ref().map(|path| path.display().to_string());
        info!(file:?; "Parsing DEF definitions");

        let mut classes = Vec::new();
        while let Some(start) = self.lexer.skip_to_definition() {
            let class = self
                .parse_class(start.location(), diagnostics)
                .map_err(|diagnostic| diagnostic.with_file(self.path.as_ref()))?;
            classes.push(class);
        }

        debug!(classes = classes.len(); "Parsed DEF classes");
        Ok(classes)
    }
}

fn unexpected_token(token: &DefToken<'_>, expected: &str) -> Diagnostic {
    let (code, found) = match token.kind {
        DefTokenKind::Eof => (ErrorCode::E101, "end of input".to_string()),
        DefTokenKind::Newline | DefTokenKind::EndDefinition => {
            (ErrorCode::E100, token.kind.to_string())
        }
        DefTokenKind::String => (ErrorCode::E100, format!("string \"{}\"", token.text)),
        _ => (ErrorCode::E100, format!("`{}`", token.text)),
    };
    Diagnostic::error(format!("expected {expected}, found {found}"))
        .with_code(code)
        .with_location(token.location)
        .with_label(token.span, format!("expected {expected}"))
}

#[cfg(test)]
mod tests {
    use entdef_core::attribute::AttributeKind;

    use super::*;

    fn parse(source: &str) -> (Vec<ClassInfo>, DiagnosticCollector) {
        let mut diagnostics = DiagnosticCollector::new();
        let classes = DefParser::new(source, Color::default())
            .parse_class_infos(&mut diagnostics)
            .unwrap_or_else(|err| panic!("Expected parsing to succeed, but got error: {err}"));
        (classes, diagnostics)
    }

    fn flag_values(class: &ClassInfo) -> Vec<(i32, String)> {
        class
            .attribute(Id::new(SPAWNFLAGS))
            .and_then(AttributeDefinition::flag_options)
            .unwrap_or_default()
            .iter()
            .map(|option| (option.value(), option.short_description().to_string()))
            .collect()
    }

    #[test]
    fn test_point_definition() {
        let (classes, diagnostics) = parse(
            "/*QUAKED light (0 1 0) (8 8 8) (-8 -8 -8) START_OFF\nNon-displayed light.\n*/",
        );

        assert!(diagnostics.is_empty());
        let class = &classes[0];
        assert_eq!(class.kind(), ClassKind::Point);
        assert_eq!(class.name(), "light");
        assert_eq!(class.color(), Some(Color::from_channels(0.0, 1.0, 0.0)));
        assert_eq!(class.size(), Some(BoundingBox::default_point()));
        assert_eq!(class.description(), Some("Non-displayed light."));
        assert_eq!(flag_values(class), vec![(1, "START_OFF".to_string())]);
    }

    #[test]
    fn test_brush_definition_with_reserved_flags() {
        let (classes, _) = parse(
            "/*QUAKED func_door (0 .5 .8) ? START_OPEN - DOOR_DONT_LINK GOLD_KEY\n*/",
        );

        let class = &classes[0];
        assert_eq!(class.kind(), ClassKind::Brush);
        assert_eq!(class.size(), None);
        assert_eq!(class.description(), None);
        assert_eq!(
            flag_values(class),
            vec![
                (1, "START_OPEN".to_string()),
                (4, "DOOR_DONT_LINK".to_string()),
                (8, "GOLD_KEY".to_string()),
            ]
        );
    }

    #[test]
    fn test_header_closed_on_same_line() {
        let (classes, _) = parse("/*QUAKED func_wall (0 .5 .8) ? TOGGLE*/");
        assert_eq!(flag_values(&classes[0]), vec![(1, "TOGGLE".to_string())]);
    }

    #[test]
    fn test_base_definition_and_surrounding_code() {
        let (classes, diagnostics) = parse(
            r#"
void() monster_use = { };

/*QUAKED Monster
{
base("Targetname");
}
Common monster keys.
*/

void() monster_army = { };
/*QUAKED monster_army (1 0 0) (-16 -16 -24) (16 16 40) AMBUSH
{
base("Monster");
}
*/
"#,
        );

        assert!(diagnostics.is_empty());
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].kind(), ClassKind::Base);
        assert_eq!(classes[0].description(), Some("Common monster keys."));
        assert_eq!(classes[0].superclass_names().to_vec(), vec![Id::new("Targetname")]);
        assert_eq!(classes[0].line(), 4);
        assert_eq!(classes[1].superclass_names().to_vec(), vec![Id::new("Monster")]);
    }

    #[test]
    fn test_block_statements() {
        let (classes, diagnostics) = parse(
            r#"/*QUAKED light (0 1 0) (-8 -8 -8) (8 8 8)
{
choice "style"
 (
  (0, "normal")
  (1 "flicker")
 );
default("style", "1");
default("light", 300);
model({ "path": ":progs/flame.mdl" });
}
A light.
*/"#,
        );

        assert!(diagnostics.is_empty());
        let class = &classes[0];
        assert!(class.attribute(Id::new(SPAWNFLAGS)).is_none());

        let style = class.attribute(Id::new("style")).unwrap();
        let options = style.choice_options().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].description(), "flicker");
        assert_eq!(style.default_value_text().as_deref(), Some("1"));

        let light = class.attribute(Id::new("light")).unwrap();
        assert_eq!(light.kind(), AttributeKind::String);
        assert_eq!(light.default_value_text().as_deref(), Some("300"));

        assert!(class.model_definition().is_some());
        assert_eq!(class.description(), Some("A light."));
    }

    #[test]
    fn test_block_warnings() {
        let (classes, diagnostics) = parse(
            r#"/*QUAKED item (0 0 1) (-8 -8 -8) (8 8 8) SUSPENDED
{
default("spawnflags", 1);
sound("items/pickup.wav");
model(":progs/a.mdl");
model(":progs/b.mdl");
}
*/"#,
        );

        let codes: Vec<ErrorCode> = diagnostics
            .diagnostics()
            .iter()
            .filter_map(Diagnostic::code)
            .collect();
        assert_eq!(codes, vec![ErrorCode::E204, ErrorCode::E204, ErrorCode::E201]);
        assert_eq!(
            diagnostics.diagnostics()[2].message(),
            "duplicate model definition replaces the one at line 5, column 1"
        );
        assert_eq!(
            classes[0].model_definition().unwrap().to_string(),
            "\":progs/b.mdl\""
        );
    }

    #[test]
    fn test_duplicate_attributes_cite_first_declaration() {
        let (classes, diagnostics) = parse(
            r#"/*QUAKED light (0 1 0) (-8 -8 -8) (8 8 8) START_OFF
{
choice "style" ((0 "normal"));
default("wait", 1);
choice "style" ((1 "flicker"));
choice "wait" ((0 "never"));
choice "spawnflags" ((1 "on"));
}
*/"#,
        );

        let style = classes[0].attribute(Id::new("style")).unwrap();
        assert_eq!(style.choice_options().unwrap()[0].description(), "normal");

        let messages: Vec<&str> = diagnostics
            .diagnostics()
            .iter()
            .map(Diagnostic::message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "duplicate attribute `style` is ignored, keeping the declaration at line 3, column 1",
                "duplicate attribute `wait` is ignored, keeping the declaration at line 4, column 1",
                "duplicate attribute `spawnflags` is ignored, keeping the declaration at line 1, column 1",
            ]
        );
        assert_eq!(diagnostics.warning_count(), 3);
    }

    #[test]
    fn test_unterminated_definition_fails() {
        let mut diagnostics = DiagnosticCollector::new();
        let err = DefParser::new("/*QUAKED light (0 1 0) ?\nno end", Color::default())
            .with_path("maps/quake.def")
            .parse_class_infos(&mut diagnostics)
            .unwrap_err();

        let diagnostic = &err.diagnostics()[0];
        assert_eq!(diagnostic.code(), Some(ErrorCode::E001));
        assert_eq!(diagnostic.file(), Some(Path::new("maps/quake.def")));
    }

    #[test]
    fn test_malformed_header_fails() {
        let mut diagnostics = DiagnosticCollector::new();
        let err = DefParser::new("/*QUAKED light (0 1 0 (-8 -8 -8)\n*/", Color::default())
            .parse_class_infos(&mut diagnostics)
            .unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_empty_input() {
        let (classes, diagnostics) = parse("");
        assert!(classes.is_empty());
        assert!(diagnostics.is_empty());
    }
}

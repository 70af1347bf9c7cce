//! Recursive descent parser for FGD documents.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, info};

use entdef_core::{
    attribute::{AttributeCommon, AttributeDefinition, ChoiceOption, FlagOption},
    color::Color,
    geometry::{BoundingBox, Vec3},
    identifier::Id,
    location::Location,
};

use crate::{
    DefinitionParser,
    class_info::{ClassInfo, ClassKind},
    el::Termination,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError, Result},
    fgd::lexer::{FgdLexer, FgdToken, FgdTokenKind},
    file_system::{DiskFileSystem, FileSystem, normalize_path},
    include::{IncludeStack, resolve_include_path},
    model::parse_model_definition,
    typed_default::{TypedKind, typed_attribute},
};

/// Header options that only matter to other editors; they are skipped silently.
const EDITOR_OPTIONS: &[&str] = &[
    "animator",
    "axis",
    "cylinder",
    "decal",
    "frustum",
    "halfgridsnap",
    "iconsprite",
    "instance",
    "keyframe",
    "light",
    "lightcone",
    "lightprop",
    "line",
    "obb",
    "offset",
    "overlay",
    "quadbounds",
    "sidelist",
    "sphere",
    "sprite",
    "sweptplayerhull",
    "vecline",
    "wirebox",
    "worldtext",
];

/// Parser for FGD definition files.
///
/// # Example
///
/// ```
/// # use entdef_core::color::Color;
/// # use entdef_parser::{DefinitionParser, FgdParser, error::DiagnosticCollector};
/// let source = r#"@PointClass size(-8 -8 -8, 8 8 8) = info_null : "Removed on load" []"#;
///
/// let mut diagnostics = DiagnosticCollector::new();
/// let definitions = FgdParser::new(source, Color::default())
///     .parse_definitions(&mut diagnostics)
///     .unwrap();
/// assert_eq!(definitions[0].name(), "info_null");
/// ```
pub struct FgdParser<'src> {
    lexer: FgdLexer<'src>,
    default_color: Color,
    path: Option<PathBuf>,
    file_system: Arc<dyn FileSystem>,
}

impl<'src> FgdParser<'src> {
    pub fn new(source: &'src str, default_color: Color) -> Self {
        Self {
            lexer: FgdLexer::new(source),
            default_color,
            path: None,
            file_system: Arc::new(DiskFileSystem),
        }
    }

    /// Sets the path of the document, which anchors relative includes.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(normalize_path(path.as_ref()));
        self
    }

    /// Sets the file system included files are read from.
    pub fn with_file_system(mut self, file_system: Arc<dyn FileSystem>) -> Self {
        self.file_system = file_system;
        self
    }

    fn parse_document(
        &mut self,
        includes: &mut IncludeStack,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<Vec<ClassInfo>> {
        self.parse_directives(includes, diagnostics)
            .map_err(|diagnostic| match diagnostic.file() {
                Some(_) => diagnostic,
                None => diagnostic.with_file(self.path.as_ref()),
            })
    }

    fn parse_directives(
        &mut self,
        includes: &mut IncludeStack,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<Vec<ClassInfo>> {
        let mut classes = Vec::new();
        loop {
            let token = self.next()?;
            match token.kind {
                FgdTokenKind::Eof => return Ok(classes),
                FgdTokenKind::Word if token.text.starts_with('@') => {
                    self.parse_directive(&token, includes, diagnostics, &mut classes)?;
                }
                _ => return Err(unexpected_token(&token, "`@` directive")),
            }
        }
    }

    fn parse_directive(
        &mut self,
        directive: &FgdToken<'src>,
        includes: &mut IncludeStack,
        diagnostics: &mut DiagnosticCollector,
        classes: &mut Vec<ClassInfo>,
    ) -> Result<()> {
        let name = directive.text[1..].to_ascii_lowercase();
        let kind = match name.as_str() {
            "pointclass" | "npcclass" | "keyframeclass" | "moveclass" | "filterclass" => {
                ClassKind::Point
            }
            "solidclass" => ClassKind::Brush,
            "baseclass" | "main" => ClassKind::Base,
            "include" => {
                let path = self.expect(FgdTokenKind::String, "include path")?;
                classes.extend(self.parse_include(&path, includes, diagnostics)?);
                return Ok(());
            }
            "mapsize" => return self.skip_group(FgdTokenKind::OpenParen, FgdTokenKind::CloseParen),
            "materialexclusion" | "autovisgroup" => {
                debug!(directive = directive.text; "Skipping editor directive");
                return self.skip_bracketed_directive();
            }
            _ => {
                return Err(Diagnostic::error(format!(
                    "unknown directive `{}`",
                    directive.text
                ))
                .with_code(ErrorCode::E102)
                .with_location(directive.location)
                .with_label(directive.span, ErrorCode::E102.description())
                .with_help("expected `@PointClass`, `@SolidClass`, `@BaseClass` or `@include`"));
            }
        };

        let class = self.parse_class(kind, directive, diagnostics)?;
        classes.push(class);
        Ok(())
    }

    fn parse_include(
        &mut self,
        path_token: &FgdToken<'src>,
        includes: &mut IncludeStack,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<Vec<ClassInfo>> {
        let path = resolve_include_path(self.path.as_deref(), path_token.text);

        if includes.contains(&path) {
            diagnostics.emit(
                Diagnostic::error(format!(
                    "skipping recursively included file `{}`",
                    path.display()
                ))
                .with_code(ErrorCode::E300)
                .with_location(path_token.location)
                .with_file(self.path.as_ref())
                .with_label(path_token.span, "included again here"),
            );
            return Ok(Vec::new());
        }

        let contents = match self.file_system.open_file(&path) {
            Ok(contents) => contents,
            Err(error) => {
                diagnostics.emit(
                    Diagnostic::error(format!("failed to include file: {error}"))
                        .with_code(ErrorCode::E301)
                        .with_location(path_token.location)
                        .with_file(self.path.as_ref())
                        .with_label(path_token.span, ErrorCode::E301.description()),
                );
                return Ok(Vec::new());
            }
        };

        let source = String::from_utf8_lossy(&contents);
        let mut parser = FgdParser::new(&*source, self.default_color)
            .with_path(&path)
            .with_file_system(Arc::clone(&self.file_system));
        includes.with_file(path, |includes| {
            parser.parse_document(includes, diagnostics)
        })
    }

    /// Parse a class declaration
    ///
    /// Syntax: `@XClass option(...)* = name [: "description"] [ attributes ]`
    fn parse_class(
        &mut self,
        kind: ClassKind,
        directive: &FgdToken<'src>,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<ClassInfo> {
        let mut class = ClassInfo::new(kind, Id::new(""), directive.location);
        class.file = self.path.clone();

        let mut seen_options = HashMap::new();
        loop {
            let token = self.next()?;
            match token.kind {
                FgdTokenKind::Equals => break,
                FgdTokenKind::Word => {
                    self.parse_class_option(&mut class, &token, &mut seen_options, diagnostics)?;
                }
                _ => return Err(unexpected_token(&token, "class option or `=`")),
            }
        }

        let name = self.next()?;
        if !matches!(
            name.kind,
            FgdTokenKind::Word | FgdTokenKind::Integer | FgdTokenKind::Decimal
        ) {
            return Err(unexpected_token(&name, "class name"));
        }
        class.name = Id::new(name.text);

        if self.eat(FgdTokenKind::Colon)?.is_some() {
            class.description = self.parse_optional_string()?;
        }

        self.parse_class_body(&mut class, diagnostics)?;
        debug!(name = name.text, kind = kind.to_string(); "Parsed class");
        Ok(class)
    }

    fn parse_class_option(
        &mut self,
        class: &mut ClassInfo,
        option: &FgdToken<'src>,
        seen_options: &mut HashMap<&'static str, Location>,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<()> {
        let name = option.text.to_ascii_lowercase();
        let has_arguments = self.peek()?.kind == FgdTokenKind::OpenParen;

        match name.as_str() {
            "base" if has_arguments => {
                self.next()?;
                while self.eat(FgdTokenKind::CloseParen)?.is_none() {
                    let base = self.next()?;
                    if !matches!(base.kind, FgdTokenKind::Word | FgdTokenKind::Integer) {
                        return Err(unexpected_token(&base, "base class name"));
                    }
                    class.superclass_names.push(Id::new(base.text));
                    if self.eat(FgdTokenKind::Comma)?.is_none() {
                        self.expect(FgdTokenKind::CloseParen, "`,` or `)`")?;
                        break;
                    }
                }
            }
            "color" if has_arguments => {
                self.next()?;
                let mut channels = [0.0; 3];
                for channel in &mut channels {
                    *channel = self.parse_number()?;
                    self.eat(FgdTokenKind::Comma)?;
                }
                self.expect(FgdTokenKind::CloseParen, "`)`")?;
                self.note_option("color", option, seen_options, diagnostics);
                let [r, g, b] = channels;
                class.color = Some(Color::from_channels(r, g, b));
            }
            "size" if has_arguments => {
                self.next()?;
                let first = self.parse_vector()?;
                let size = if self.eat(FgdTokenKind::Comma)?.is_some() {
                    BoundingBox::repaired(first, self.parse_vector()?)
                } else {
                    BoundingBox::from_size(first)
                };
                self.expect(FgdTokenKind::CloseParen, "`,` or `)`")?;
                self.note_option("size", option, seen_options, diagnostics);
                class.size = Some(size);
            }
            "model" | "studio" | "studioprop" if has_arguments => {
                self.next()?;
                if self.eat(FgdTokenKind::CloseParen)?.is_some() {
                    debug!(option = option.text; "Ignoring model option without arguments");
                    return Ok(());
                }
                let parsed = parse_model_definition(
                    self.lexer.source(),
                    self.lexer.snapshot(),
                    Termination::Embedded,
                    self.path.as_deref(),
                    diagnostics,
                )?;
                self.lexer.restore(parsed.end);
                self.expect(FgdTokenKind::CloseParen, "`)`")?;
                self.note_option("model", option, seen_options, diagnostics);
                class.model_definition = Some(parsed.definition);
            }
            _ if EDITOR_OPTIONS.contains(&name.as_str()) => {
                debug!(option = option.text; "Skipping editor option");
                if has_arguments {
                    self.skip_group(FgdTokenKind::OpenParen, FgdTokenKind::CloseParen)?;
                }
            }
            _ => {
                self.warn(
                    diagnostics,
                    ErrorCode::E204,
                    option,
                    format!("unknown class option `{}` is ignored", option.text),
                );
                if has_arguments {
                    self.skip_group(FgdTokenKind::OpenParen, FgdTokenKind::CloseParen)?;
                }
            }
        }
        Ok(())
    }

    /// Record a header option, warning when it was already given
    fn note_option(
        &self,
        key: &'static str,
        option: &FgdToken<'src>,
        seen_options: &mut HashMap<&'static str, Location>,
        diagnostics: &mut DiagnosticCollector,
    ) {
        if let Some(first) = seen_options.insert(key, option.location) {
            self.warn(
                diagnostics,
                ErrorCode::E201,
                option,
                format!("duplicate `{key}` option replaces the one at {first}"),
            );
        }
    }

    fn parse_class_body(
        &mut self,
        class: &mut ClassInfo,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<()> {
        self.expect(FgdTokenKind::OpenBracket, "`[`")?;

        let mut declared: HashMap<Id, Location> = HashMap::new();
        loop {
            let token = self.next()?;
            match token.kind {
                FgdTokenKind::CloseBracket => return Ok(()),
                FgdTokenKind::Word => {
                    let Some(attribute) = self.parse_attribute(&token, diagnostics)? else {
                        continue;
                    };
                    let name = attribute.name();
                    if class.add_attribute(attribute) {
                        declared.insert(name, token.location);
                    } else {
                        let first = declared
                            .get(&name)
                            .map(|location| format!(" at {location}"))
                            .unwrap_or_default();
                        self.warn(
                            diagnostics,
                            ErrorCode::E201,
                            &token,
                            format!(
                                "duplicate attribute `{name}` is ignored, keeping the declaration{first}"
                            ),
                        );
                    }
                }
                _ => return Err(unexpected_token(&token, "attribute name or `]`")),
            }
        }
    }

    /// Parse an attribute declaration after its name
    ///
    /// Syntax: `name(type) [readonly] [: "short" [: default [: "long"]]] [= [ options ]]`
    ///
    /// Returns `None` for input and output declarations, which are skipped.
    fn parse_attribute(
        &mut self,
        name: &FgdToken<'src>,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<Option<AttributeDefinition>> {
        let is_io = name.text.eq_ignore_ascii_case("input") || name.text.eq_ignore_ascii_case("output");
        if is_io && self.peek()?.kind == FgdTokenKind::Word {
            self.skip_io_declaration()?;
            return Ok(None);
        }

        self.expect(FgdTokenKind::OpenParen, "`(`")?;
        let type_name = self.expect(FgdTokenKind::Word, "attribute type")?;
        self.expect(FgdTokenKind::CloseParen, "`)`")?;

        let mut read_only = false;
        loop {
            let token = self.peek()?;
            if token.kind != FgdTokenKind::Word {
                break;
            }
            if token.text.eq_ignore_ascii_case("readonly") {
                read_only = true;
            } else if !token.text.eq_ignore_ascii_case("report") {
                break;
            }
            self.next()?;
        }

        let (mut short, mut default, mut long) = (None, None, None);
        if self.eat(FgdTokenKind::Colon)?.is_some() {
            short = self.parse_optional_string()?;
            if self.eat(FgdTokenKind::Colon)?.is_some() {
                default = self.parse_default_value()?;
                if self.eat(FgdTokenKind::Colon)?.is_some() {
                    long = self.parse_optional_string()?;
                }
            }
        }
        let has_options = self.eat(FgdTokenKind::Equals)?.is_some();

        let common = AttributeCommon::new(name.text)
            .with_short_description(short.unwrap_or_default())
            .with_long_description(long.unwrap_or_default())
            .with_read_only(read_only);

        let typed_kind = match type_name.text.to_ascii_lowercase().as_str() {
            "integer" => Some(TypedKind::Integer),
            "float" => Some(TypedKind::Float),
            "boolean" => Some(TypedKind::Boolean),
            "string" => {
                return self.finish_attribute(has_options, AttributeDefinition::String { common, default });
            }
            "choices" => {
                let options = if has_options {
                    self.parse_choice_options()?
                } else {
                    Vec::new()
                };
                return Ok(Some(AttributeDefinition::Choice {
                    common,
                    options,
                    default,
                }));
            }
            "flags" => {
                let options = if has_options {
                    self.parse_flag_options()?
                } else {
                    Vec::new()
                };
                return Ok(Some(AttributeDefinition::Flags { common, options }));
            }
            "target_source" => {
                return self.finish_attribute(has_options, AttributeDefinition::TargetSource { common });
            }
            "target_destination" => {
                return self
                    .finish_attribute(has_options, AttributeDefinition::TargetDestination { common });
            }
            _ => None,
        };

        let attribute = match typed_kind {
            Some(kind) => typed_attribute(kind, common, default.as_deref()).unwrap_or_else(|invalid| {
                self.warn(diagnostics, ErrorCode::E202, name, invalid.message);
                invalid.attribute
            }),
            None => AttributeDefinition::Unknown { common, default },
        };
        self.finish_attribute(has_options, attribute)
    }

    /// Skip an option list given to an attribute whose type takes none
    fn finish_attribute(
        &mut self,
        has_options: bool,
        attribute: AttributeDefinition,
    ) -> Result<Option<AttributeDefinition>> {
        if has_options {
            let name = attribute.name().to_string();
            debug!(attribute = name; "Skipping options of an attribute without options");
            self.skip_group(FgdTokenKind::OpenBracket, FgdTokenKind::CloseBracket)?;
        }
        Ok(Some(attribute))
    }

    /// Parse `[ value : "caption" ... ]`
    fn parse_choice_options(&mut self) -> Result<Vec<ChoiceOption>> {
        self.expect(FgdTokenKind::OpenBracket, "`[`")?;
        let mut options = Vec::new();
        loop {
            let value = self.next()?;
            match value.kind {
                FgdTokenKind::CloseBracket => return Ok(options),
                FgdTokenKind::Integer
                | FgdTokenKind::Decimal
                | FgdTokenKind::Word
                | FgdTokenKind::String => {
                    self.expect(FgdTokenKind::Colon, "`:`")?;
                    let caption = self.parse_optional_string()?.unwrap_or_default();
                    options.push(ChoiceOption::new(value.text, caption));
                }
                _ => return Err(unexpected_token(&value, "choice value or `]`")),
            }
        }
    }

    /// Parse `[ bit : "short" [: 0|1 [: "long"]] ... ]`
    fn parse_flag_options(&mut self) -> Result<Vec<FlagOption>> {
        self.expect(FgdTokenKind::OpenBracket, "`[`")?;
        let mut options = Vec::new();
        loop {
            let value = self.next()?;
            match value.kind {
                FgdTokenKind::CloseBracket => return Ok(options),
                FgdTokenKind::Integer => {
                    let bit = value
                        .text
                        .parse::<i32>()
                        .map_err(|_| unexpected_token(&value, "flag value"))?;
                    self.expect(FgdTokenKind::Colon, "`:`")?;
                    let short = self.parse_optional_string()?.unwrap_or_default();

                    let mut is_default = false;
                    let mut long = String::new();
                    if self.eat(FgdTokenKind::Colon)?.is_some() {
                        let default = self.expect(FgdTokenKind::Integer, "flag default")?;
                        is_default = default.text != "0";
                        if self.eat(FgdTokenKind::Colon)?.is_some() {
                            long = self.parse_optional_string()?.unwrap_or_default();
                        }
                    }
                    options.push(FlagOption::new(bit, short, long, is_default));
                }
                _ => return Err(unexpected_token(&value, "flag value or `]`")),
            }
        }
    }

    /// Skip `input Name(type) [: "description"]`
    fn skip_io_declaration(&mut self) -> Result<()> {
        self.expect(FgdTokenKind::Word, "input or output name")?;
        self.skip_group(FgdTokenKind::OpenParen, FgdTokenKind::CloseParen)?;
        if self.eat(FgdTokenKind::Colon)?.is_some() {
            self.parse_optional_string()?;
        }
        Ok(())
    }

    /// Skip an editor directive up to and including its bracketed block
    fn skip_bracketed_directive(&mut self) -> Result<()> {
        loop {
            let token = self.peek()?;
            match token.kind {
                FgdTokenKind::OpenBracket => {
                    return self.skip_group(FgdTokenKind::OpenBracket, FgdTokenKind::CloseBracket);
                }
                FgdTokenKind::Eof => return Err(unexpected_token(&token, "`[`")),
                _ => {
                    self.next()?;
                }
            }
        }
    }

    /// Skip a balanced group that starts at the next token
    fn skip_group(&mut self, open: FgdTokenKind, close: FgdTokenKind) -> Result<()> {
        self.expect(open, &open.to_string())?;
        let mut depth = 1;
        while depth > 0 {
            let token = self.next()?;
            match token.kind {
                kind if kind == open => depth += 1,
                kind if kind == close => depth -= 1,
                FgdTokenKind::Eof => return Err(unexpected_token(&token, &close.to_string())),
                _ => {}
            }
        }
        Ok(())
    }

    /// Parse an optional string with `+` continuations
    fn parse_optional_string(&mut self) -> Result<Option<String>> {
        let Some(first) = self.eat(FgdTokenKind::String)? else {
            return Ok(None);
        };
        let mut text = first.text.to_string();
        while self.eat(FgdTokenKind::Plus)?.is_some() {
            let next = self.expect(FgdTokenKind::String, "string after `+`")?;
            text.push_str(next.text);
        }
        Ok(Some(text))
    }

    /// Parse an optional attribute default
    ///
    /// A word directly followed by `(` starts the next attribute and is left alone.
    fn parse_default_value(&mut self) -> Result<Option<String>> {
        let token = self.peek()?;
        match token.kind {
            FgdTokenKind::String => self.parse_optional_string(),
            FgdTokenKind::Integer | FgdTokenKind::Decimal => {
                self.next()?;
                Ok(Some(token.text.to_string()))
            }
            FgdTokenKind::Word => {
                let start = self.lexer.snapshot();
                self.next()?;
                if self.peek()?.kind == FgdTokenKind::OpenParen {
                    self.lexer.restore(start);
                    return Ok(None);
                }
                Ok(Some(token.text.to_string()))
            }
            _ => Ok(None),
        }
    }

    fn parse_number(&mut self) -> Result<f32> {
        let token = self.next()?;
        match token.kind {
            FgdTokenKind::Integer | FgdTokenKind::Decimal => token
                .text
                .parse()
                .map_err(|_| unexpected_token(&token, "number")),
            _ => Err(unexpected_token(&token, "number")),
        }
    }

    fn parse_vector(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(
            self.parse_number()?,
            self.parse_number()?,
            self.parse_number()?,
        ))
    }

    fn next(&mut self) -> Result<FgdToken<'src>> {
        self.lexer.next_token()
    }

    fn peek(&mut self) -> Result<FgdToken<'src>> {
        self.lexer.peek_token()
    }

    fn expect(&mut self, kind: FgdTokenKind, expected: &str) -> Result<FgdToken<'src>> {
        let token = self.next()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected_token(&token, expected))
        }
    }

    /// Consume the next token if it is of `kind`
    fn eat(&mut self, kind: FgdTokenKind) -> Result<Option<FgdToken<'src>>> {
        let token = self.peek()?;
        if token.kind != kind {
            return Ok(None);
        }
        self.next()?;
        Ok(Some(token))
    }

    fn warn(
        &self,
        diagnostics: &mut DiagnosticCollector,
        code: ErrorCode,
        token: &FgdToken<'_>,
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

impl DefinitionParser for FgdParser<'_> {
    fn default_color(&self) -> Color {
        self.default_color
    }

    fn parse_class_infos(
        &mut self,
        diagnostics: &mut DiagnosticCollector,
    ) -> std::result::Result<Vec<ClassInfo>, ParseError> {
        let file = self.path.as_ref().map(|path| path.display().to_string());
        info!(file:?; "Parsing FGD definitions");

        let mut includes = IncludeStack::new();
        let classes = match self.path.clone() {
            Some(path) => {
                includes.with_file(path, |includes| self.parse_document(includes, diagnostics))
            }
            None => self.parse_document(&mut includes, diagnostics),
        }?;

        debug!(classes = classes.len(); "Parsed FGD classes");
        Ok(classes)
    }
}

fn unexpected_token(token: &FgdToken<'_>, expected: &str) -> Diagnostic {
    let (code, found) = match token.kind {
        FgdTokenKind::Eof => (ErrorCode::E101, "end of input".to_string()),
        FgdTokenKind::String => (ErrorCode::E100, format!("string \"{}\"", token.text)),
        _ => (ErrorCode::E100, format!("`{}`", token.text)),
    };
    Diagnostic::error(format!("expected {expected}, found {found}"))
        .with_code(code)
        .with_location(token.location)
        .with_label(token.span, format!("expected {expected}"))
}

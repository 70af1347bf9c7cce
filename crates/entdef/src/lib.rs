//! Entdef - load game entity definition files into a resolved catalog.
//!
//! FGD, DEF and ENT files are parsed, inheritance between their classes is
//! resolved, and the resulting point and brush entity definitions are
//! collected in a [`DefinitionCatalog`].

pub mod config;

mod catalog;
mod error;

pub use entdef_core::{
    attribute, color, definition, expression, geometry, identifier, location, model,
};
pub use entdef_parser::error as diagnostic;
pub use entdef_parser::{DiskFileSystem, FileSystem, MemoryFileSystem};

pub use catalog::DefinitionCatalog;
pub use error::EntdefError;

use std::{fmt, path::Path, sync::Arc};

use log::{debug, info, trace};

use entdef_core::color::Color;
use entdef_parser::{
    DefParser, DefinitionParser, EntParser, FgdParser,
    error::{Diagnostic, DiagnosticCollector, ParseError},
};

use config::LoaderConfig;

/// Definition file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Bracket-based class declarations.
    Fgd,
    /// `/*QUAKED ... */` declarations embedded in comments.
    Def,
    /// XML documents.
    Ent,
}

impl Format {
    /// Detects the format from the file extension, ignoring case.
    ///
    /// ```
    /// # use std::path::Path;
    /// # use entdef::Format;
    /// assert_eq!(Format::from_path(Path::new("maps/Quake.FGD")), Some(Format::Fgd));
    /// assert_eq!(Format::from_path(Path::new("entities.xml")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        [Self::Fgd, Self::Def, Self::Ent]
            .into_iter()
            .find(|format| extension.eq_ignore_ascii_case(format.extension()))
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Fgd => "fgd",
            Self::Def => "def",
            Self::Ent => "ent",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fgd => "FGD",
            Self::Def => "DEF",
            Self::Ent => "ENT",
        })
    }
}

/// The result of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedDefinitions {
    pub catalog: DefinitionCatalog,
    /// Warnings, debug notes and recovered errors, in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
}

/// Loads entity definition files.
///
/// # Examples
///
/// ```
/// use entdef::{DefinitionLoader, Format, config::LoaderConfig};
///
/// let source = r#"@PointClass size(-8 -8 -8, 8 8 8) = info_null : "Removed on load" []"#;
///
/// let loader = DefinitionLoader::new(LoaderConfig::default());
/// let loaded = loader.load_str(source, Format::Fgd, None).expect("valid FGD");
///
/// let info_null = loaded.catalog.get("info_null").expect("declared");
/// assert_eq!(info_null.index(), 1);
/// assert!(loaded.diagnostics.is_empty());
/// ```
pub struct DefinitionLoader {
    config: LoaderConfig,
    file_system: Arc<dyn FileSystem>,
}

impl Default for DefinitionLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl DefinitionLoader {
    /// Create a loader reading files from disk.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            file_system: Arc::new(DiskFileSystem),
        }
    }

    /// Read root documents and FGD includes through `file_system` instead.
    pub fn with_file_system(mut self, file_system: Arc<dyn FileSystem>) -> Self {
        self.file_system = file_system;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load the file at `path`, picking the parser from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`EntdefError`] if the extension is not recognized, the file
    /// cannot be read, or the document is malformed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadedDefinitions, EntdefError> {
        let path = path.as_ref();
        let format =
            Format::from_path(path).ok_or_else(|| EntdefError::UnknownFormat(path.to_path_buf()))?;

        let bytes = self.file_system.open_file(path)?;
        let source = String::from_utf8_lossy(&bytes);
        self.load_str(&source, format, Some(path))
    }

    /// Load a document from memory.
    ///
    /// `origin` is the path the text was read from. It is attached to
    /// diagnostics and FGD includes are resolved against it; without it,
    /// includes resolve against the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`EntdefError`] if the configured default color is invalid or
    /// the document is malformed. With `deny_warnings` set, any warning or
    /// recovered error fails the load as well.
    pub fn load_str(
        &self,
        source: &str,
        format: Format,
        origin: Option<&Path>,
    ) -> Result<LoadedDefinitions, EntdefError> {
        let default_color = self.config.default_color()?;
        info!(format = format.to_string(), origin:?; "Loading entity definitions");

        let mut diagnostics = DiagnosticCollector::new();
        let mut parser = self.parser(source, format, origin, default_color);
        let definitions = match parser.parse_definitions(&mut diagnostics) {
            Ok(definitions) => definitions,
            Err(err) => {
                let mut all = err.into_diagnostics();
                all.extend(diagnostics.into_diagnostics());
                return Err(EntdefError::new_parse_error(ParseError::new(all), source));
            }
        };

        let problems = diagnostics.warning_count() + diagnostics.error_count();
        if self.config.deny_warnings() && problems > 0 {
            debug!(problems; "Warnings are denied");
            return Err(EntdefError::DeniedWarnings {
                err: ParseError::new(diagnostics.into_diagnostics()),
                src: source.to_string(),
            });
        }

        let catalog = DefinitionCatalog::new(definitions);
        info!(
            definitions = catalog.len(),
            diagnostics = diagnostics.diagnostics().len();
            "Entity definitions loaded"
        );
        trace!(catalog:?; "Loaded catalog");

        Ok(LoadedDefinitions {
            catalog,
            diagnostics: diagnostics.into_diagnostics(),
        })
    }

    fn parser<'src>(
        &self,
        source: &'src str,
        format: Format,
        origin: Option<&Path>,
        default_color: Color,
    ) -> Box<dyn DefinitionParser + 'src> {
        match format {
            Format::Fgd => {
                let mut parser = FgdParser::new(source, default_color)
                    .with_file_system(Arc::clone(&self.file_system));
                if let Some(origin) = origin {
                    parser = parser.with_path(origin);
                }
                Box::new(parser)
            }
            Format::Def => {
                let mut parser = DefParser::new(source, default_color);
                if let Some(origin) = origin {
                    parser = parser.with_path(origin);
                }
                Box::new(parser)
            }
            Format::Ent => {
                let mut parser = EntParser::new(source, default_color);
                if let Some(origin) = origin {
                    parser = parser.with_path(origin);
                }
                Box::new(parser)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a.def")), Some(Format::Def));
        assert_eq!(Format::from_path(Path::new("a.Ent")), Some(Format::Ent));
        assert_eq!(Format::from_path(Path::new("fgd")), None);
        assert_eq!(Format::from_path(Path::new("a.fgd.bak")), None);
    }

    #[test]
    fn test_unknown_extension() {
        let loader = DefinitionLoader::default();
        let result = loader.load_file("entities.txt");
        assert!(matches!(result, Err(EntdefError::UnknownFormat(_))));
    }
}

//! # Entdef Parser
//!
//! Parsers for entity definition files used by level editors. Three formats
//! are supported:
//!
//! - **FGD** - bracket-based class declarations ([`FgdParser`])
//! - **DEF** - `/*QUAKED ... */` declarations embedded in comments ([`DefParser`])
//! - **ENT** - XML documents ([`EntParser`])
//!
//! Every parser produces [`ClassInfo`] records. Inheritance between them is
//! resolved by [`resolve_inheritance`], and [`create_definitions`] turns the
//! resolved records into [`EntityDefinition`]s.
//!
//! ## Usage
//!
//! ```
//! # use entdef_core::color::Color;
//! # use entdef_parser::{DefinitionParser, FgdParser, error::{DiagnosticCollector, ParseError}};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         @BaseClass = Targetname [ targetname(target_source) : "Name" ]
//!         @SolidClass base(Targetname) = func_door : "Door" []
//!     "#;
//!
//!     let mut diagnostics = DiagnosticCollector::new();
//!     let definitions = FgdParser::new(source, Color::default()).parse_definitions(&mut diagnostics)?;
//!     assert_eq!(definitions.len(), 1);
//!     assert!(definitions[0].attribute("targetname").is_some());
//!     Ok(())
//! }
//! ```
//!
//! [`EntityDefinition`]: entdef_core::definition::EntityDefinition

mod class_info;
mod cursor;
mod def;
mod el;
mod ent;
pub mod error;
mod factory;
mod fgd;
mod file_system;
mod include;
mod legacy_model;
mod model;
mod resolve;
mod span;
mod token;
mod typed_default;

pub use class_info::{ClassInfo, ClassKind};
pub use def::DefParser;
pub use ent::EntParser;
pub use factory::{create_definition, create_definitions};
pub use fgd::FgdParser;
pub use file_system::{
    DiskFileSystem, FileSystem, FileSystemError, MemoryFileSystem, normalize_path,
};
pub use resolve::resolve_inheritance;
pub use span::Span;

use entdef_core::{color::Color, definition::EntityDefinition};

use error::{DiagnosticCollector, ParseError};

/// Common interface of the format parsers.
///
/// Implementors only produce class records; resolution and definition
/// construction are shared.
pub trait DefinitionParser {
    /// Color given to definitions whose classes declare none.
    fn default_color(&self) -> Color;

    /// Parses the document into unresolved class records, in declaration order.
    ///
    /// Recoverable issues are reported to `diagnostics`; a structural error
    /// aborts parsing.
    fn parse_class_infos(
        &mut self,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<Vec<ClassInfo>, ParseError>;

    /// Parses the document and resolves it into entity definitions.
    ///
    /// Base classes only contribute to other classes and are not returned.
    fn parse_definitions(
        &mut self,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<Vec<EntityDefinition>, ParseError> {
        let classes = self.parse_class_infos(diagnostics)?;
        let resolved = resolve_inheritance(classes, diagnostics);
        Ok(create_definitions(&resolved, self.default_color()))
    }
}

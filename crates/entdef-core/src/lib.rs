//! Entdef Core Types and Definitions
//!
//! This crate provides the foundational types shared by the entity definition
//! parsers and the loader facade. It includes:
//!
//! - **Identifiers**: String-interned class and attribute names ([`identifier::Id`])
//! - **Colors**: RGBA entity colors ([`color::Color`])
//! - **Geometry**: Vectors and bounding boxes ([`geometry`] module)
//! - **Locations**: Line/column provenance ([`location::Location`])
//! - **Expressions**: The model expression language AST ([`expression`] module)
//! - **Models**: Model definition fallback chains ([`model::ModelDefinition`])
//! - **Attributes**: Typed attribute declarations ([`attribute::AttributeDefinition`])
//! - **Definitions**: Resolved entity definitions ([`definition::EntityDefinition`])

pub mod attribute;
pub mod color;
pub mod definition;
pub mod expression;
pub mod geometry;
pub mod identifier;
pub mod location;
pub mod model;

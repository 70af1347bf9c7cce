//! Configuration for loading entity definitions.
//!
//! [`LoaderConfig`] implements [`serde::Deserialize`] so it can be read from
//! a TOML file or any other serde source.
//!
//! # Example
//!
//! ```
//! # use entdef::config::LoaderConfig;
//! let config = LoaderConfig::default();
//! assert!(config.default_color().is_ok());
//! assert!(!config.deny_warnings());
//! ```

use serde::Deserialize;

use entdef_core::color::{Color, ColorError};

const DEFAULT_COLOR: &str = "#c0c0c0";

/// Settings applied to every file a [`DefinitionLoader`](crate::DefinitionLoader) loads.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
    /// Color of definitions whose classes declare none, as a color string.
    #[serde(default = "default_color")]
    default_color: String,

    /// Treat warnings as a failed load.
    #[serde(default)]
    deny_warnings: bool,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            deny_warnings: false,
        }
    }
}

impl LoaderConfig {
    /// Sets the default color string.
    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    pub fn with_deny_warnings(mut self, deny_warnings: bool) -> Self {
        self.deny_warnings = deny_warnings;
        self
    }

    /// Returns the parsed default [`Color`].
    ///
    /// # Errors
    ///
    /// Returns [`ColorError`] if the configured string is not a color.
    pub fn default_color(&self) -> Result<Color, ColorError> {
        Color::parse(&self.default_color)
    }

    pub fn deny_warnings(&self) -> bool {
        self.deny_warnings
    }
}

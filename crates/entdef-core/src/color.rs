//! Entity colors.
//!
//! This module provides the [`Color`] type which wraps the sRGB `AlphaColor`
//! type from the color crate. Definition files declare colors either as
//! normalized float triples (`0.5 0.5 1`) or as byte triples (`128 128 255`);
//! [`Color::from_channels`] folds both notations into normalized components.

use std::{fmt, str::FromStr};

use color::{AlphaColor, DynamicColor, Srgb};
use thiserror::Error;

/// Error returned when a color string cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid color `{input}`: {reason}")]
pub struct ColorError {
    input: String,
    reason: String,
}

/// RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug)]
pub struct Color {
    color: AlphaColor<Srgb>,
}

impl Color {
    /// Creates an opaque color from three declared channel values.
    ///
    /// If any channel exceeds `1.0` the triple is read as `0..=255` bytes and
    /// every channel is divided by 255.
    ///
    /// # Examples
    ///
    /// ```
    /// use entdef_core::color::Color;
    ///
    /// let bytes = Color::from_channels(255.0, 0.0, 51.0);
    /// let floats = Color::from_channels(1.0, 0.0, 0.2);
    /// assert_eq!(bytes, floats);
    /// ```
    pub fn from_channels(r: f32, g: f32, b: f32) -> Self {
        let scale = if r > 1.0 || g > 1.0 || b > 1.0 {
            255.0
        } else {
            1.0
        };
        Self::from_rgba(r / scale, g / scale, b / scale, 1.0)
    }

    /// Creates a color from already normalized components.
    pub fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            color: AlphaColor::new([r, g, b, a]),
        }
    }

    /// Parses either a CSS color (`#c0c0c0`, `silver`) or a whitespace
    /// separated channel list (`0.75 0.75 0.75` or `192 192 192 [alpha]`).
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        let channels: Vec<&str> = trimmed.split_whitespace().collect();
        if channels.len() >= 3 {
            if let Ok(values) = channels
                .iter()
                .map(|c| c.parse::<f32>())
                .collect::<Result<Vec<_>, _>>()
            {
                let color = Self::from_channels(values[0], values[1], values[2]);
                return match values.get(3) {
                    None => Ok(color),
                    Some(alpha) if values.len() == 4 => {
                        let alpha = if *alpha > 1.0 { alpha / 255.0 } else { *alpha };
                        Ok(color.with_alpha(alpha))
                    }
                    Some(_) => Err(ColorError {
                        input: input.to_string(),
                        reason: "expected three or four channels".to_string(),
                    }),
                };
            }
        }

        DynamicColor::from_str(trimmed)
            .map(|color| Self {
                color: color.to_alpha_color::<Srgb>(),
            })
            .map_err(|err| ColorError {
                input: input.to_string(),
                reason: err.to_string(),
            })
    }

    /// Returns a copy with a different alpha component.
    pub fn with_alpha(self, alpha: f32) -> Self {
        let [r, g, b, _] = self.color.components;
        Self::from_rgba(r, g, b, alpha)
    }

    pub fn r(&self) -> f32 {
        self.color.components[0]
    }

    pub fn g(&self) -> f32 {
        self.color.components[1]
    }

    pub fn b(&self) -> f32 {
        self.color.components[2]
    }

    pub fn a(&self) -> f32 {
        self.color.components[3]
    }

    /// Returns the components as `[r, g, b, a]`.
    pub fn components(&self) -> [f32; 4] {
        self.color.components
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.color
            .components
            .iter()
            .zip(other.color.components.iter())
            .all(|(a, b)| (a - b).abs() <= f32::EPSILON * 4.0)
    }
}

impl Default for Color {
    /// Neutral gray used for classes that declare no color.
    fn default() -> Self {
        Self::from_channels(0.75, 0.75, 0.75)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.color.components;
        write!(f, "{r} {g} {b} {a}")
    }
}

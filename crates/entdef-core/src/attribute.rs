//! Typed attribute declarations of entity classes.
//!
//! An [`AttributeDefinition`] describes one key an entity of a class may
//! carry: its name, descriptions, and a default value whose type depends on the
//! declared attribute kind.

use std::fmt;

use crate::identifier::Id;

/// The declared kind of an attribute, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    String,
    Boolean,
    Integer,
    Float,
    Choice,
    Flags,
    TargetSource,
    TargetDestination,
    Unknown,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeKind::String => "string",
            AttributeKind::Boolean => "boolean",
            AttributeKind::Integer => "integer",
            AttributeKind::Float => "float",
            AttributeKind::Choice => "choices",
            AttributeKind::Flags => "flags",
            AttributeKind::TargetSource => "target_source",
            AttributeKind::TargetDestination => "target_destination",
            AttributeKind::Unknown => "unknown",
        })
    }
}

/// Fields shared by every attribute kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeCommon {
    name: Id,
    short_description: String,
    long_description: String,
    read_only: bool,
}

impl AttributeCommon {
    pub fn new(name: impl Into<Id>) -> Self {
        Self {
            name: name.into(),
            short_description: String::new(),
            long_description: String::new(),
            read_only: false,
        }
    }

    pub fn with_short_description(mut self, description: impl Into<String>) -> Self {
        self.short_description = description.into();
        self
    }

    pub fn with_long_description(mut self, description: impl Into<String>) -> Self {
        self.long_description = description.into();
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    pub fn long_description(&self) -> &str {
        &self.long_description
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

/// One selectable value of a choice attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    value: String,
    description: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: description.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// One bit of a flags attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagOption {
    value: i32,
    short_description: String,
    long_description: String,
    is_default: bool,
}

impl FlagOption {
    pub fn new(
        value: i32,
        short_description: impl Into<String>,
        long_description: impl Into<String>,
        is_default: bool,
    ) -> Self {
        Self {
            value,
            short_description: short_description.into(),
            long_description: long_description.into(),
            is_default,
        }
    }

    /// The bit value, as declared.
    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    pub fn long_description(&self) -> &str {
        &self.long_description
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

/// A declared attribute of an entity class.
///
/// Each variant carries only the payload its kind needs. The attribute named
/// [`SPAWNFLAGS`] of kind [`AttributeKind::Flags`] is the conventional
/// per-instance bit set.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeDefinition {
    String {
        common: AttributeCommon,
        default: Option<String>,
    },
    Boolean {
        common: AttributeCommon,
        default: Option<bool>,
    },
    Integer {
        common: AttributeCommon,
        default: Option<i32>,
    },
    Float {
        common: AttributeCommon,
        default: Option<f32>,
    },
    Choice {
        common: AttributeCommon,
        options: Vec<ChoiceOption>,
        default: Option<String>,
    },
    Flags {
        common: AttributeCommon,
        options: Vec<FlagOption>,
    },
    TargetSource {
        common: AttributeCommon,
    },
    TargetDestination {
        common: AttributeCommon,
    },
    /// A kind the parser does not model; the default is kept verbatim.
    Unknown {
        common: AttributeCommon,
        default: Option<String>,
    },
}

/// Name of the conventional flags attribute.
pub const SPAWNFLAGS: &str = "spawnflags";

impl AttributeDefinition {
    pub fn common(&self) -> &AttributeCommon {
        match self {
            AttributeDefinition::String { common, .. }
            | AttributeDefinition::Boolean { common, .. }
            | AttributeDefinition::Integer { common, .. }
            | AttributeDefinition::Float { common, .. }
            | AttributeDefinition::Choice { common, .. }
            | AttributeDefinition::Flags { common, .. }
            | AttributeDefinition::TargetSource { common }
            | AttributeDefinition::TargetDestination { common }
            | AttributeDefinition::Unknown { common, .. } => common,
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeDefinition::String { .. } => AttributeKind::String,
            AttributeDefinition::Boolean { .. } => AttributeKind::Boolean,
            AttributeDefinition::Integer { .. } => AttributeKind::Integer,
            AttributeDefinition::Float { .. } => AttributeKind::Float,
            AttributeDefinition::Choice { .. } => AttributeKind::Choice,
            AttributeDefinition::Flags { .. } => AttributeKind::Flags,
            AttributeDefinition::TargetSource { .. } => AttributeKind::TargetSource,
            AttributeDefinition::TargetDestination { .. } => AttributeKind::TargetDestination,
            AttributeDefinition::Unknown { .. } => AttributeKind::Unknown,
        }
    }

    pub fn name(&self) -> Id {
        self.common().name()
    }

    pub fn short_description(&self) -> &str {
        self.common().short_description()
    }

    pub fn long_description(&self) -> &str {
        self.common().long_description()
    }

    pub fn is_read_only(&self) -> bool {
        self.common().is_read_only()
    }

    /// Returns `true` for the flags attribute named `spawnflags`.
    pub fn is_spawnflags(&self) -> bool {
        self.kind() == AttributeKind::Flags && self.name() == SPAWNFLAGS
    }

    /// Returns the options of a flags attribute.
    pub fn flag_options(&self) -> Option<&[FlagOption]> {
        match self {
            AttributeDefinition::Flags { options, .. } => Some(options),
            _ => None,
        }
    }

    /// Returns the first flag option declared for `value`.
    pub fn flag(&self, value: i32) -> Option<&FlagOption> {
        self.flag_options()?
            .iter()
            .find(|option| option.value() == value)
    }

    /// Returns the options of a choice attribute.
    pub fn choice_options(&self) -> Option<&[ChoiceOption]> {
        match self {
            AttributeDefinition::Choice { options, .. } => Some(options),
            _ => None,
        }
    }

    /// Default of a flags attribute: the OR of all default options.
    pub fn flags_default(&self) -> Option<i32> {
        self.flag_options().map(|options| {
            options
                .iter()
                .filter(|option| option.is_default())
                .fold(0, |acc, option| acc | option.value())
        })
    }

    /// Renders the default value as it would be written into a map file.
    pub fn default_value_text(&self) -> Option<String> {
        match self {
            AttributeDefinition::String { default, .. }
            | AttributeDefinition::Unknown { default, .. }
            | AttributeDefinition::Choice { default, .. } => default.clone(),
            AttributeDefinition::Boolean { default, .. } => {
                default.map(|b| if b { "1" } else { "0" }.to_string())
            }
            AttributeDefinition::Integer { default, .. } => default.map(|n| n.to_string()),
            AttributeDefinition::Float { default, .. } => default.map(|n| n.to_string()),
            AttributeDefinition::Flags { .. } => self.flags_default().map(|n| n.to_string()),
            AttributeDefinition::TargetSource { .. }
            | AttributeDefinition::TargetDestination { .. } => None,
        }
    }

    /// Adds the options of another flags attribute whose bit values are not
    /// yet declared here, in their declared order.
    ///
    /// Bits already present keep their own descriptions and default flag.
    /// Returns `false` without changes if either side is not a flags attribute.
    pub fn merge_flags(&mut self, base: &AttributeDefinition) -> bool {
        let (AttributeDefinition::Flags { options, .. }, Some(base_options)) =
            (&mut *self, base.flag_options())
        else {
            return false;
        };

        for option in base_options {
            if !options.iter().any(|own| own.value() == option.value()) {
                options.push(option.clone());
            }
        }
        true
    }
}

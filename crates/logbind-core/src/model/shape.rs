//! Compiled capability tables
//!
//! Every participating type publishes one `&'static TypeShape`. The tables are
//! plain data built in const context, so describing a type never runs user
//! code apart from the getters themselves.

use std::fmt;
use std::ops::BitOr;

use super::reflect::{Getter, Setter};
use super::value::Value;

/// Capability flags a type can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u32);

impl Capabilities {
    pub const NONE: Self = Self(0);
    pub const SUPPORTS_INITIALIZE: Self = Self(1 << 0);
    pub const CONFIG_ITEM: Self = Self(1 << 1);
    pub const TARGET: Self = Self(1 << 2);
    pub const LAYOUT: Self = Self(1 << 3);
    pub const LAYOUT_RENDERER: Self = Self(1 << 4);
    pub const FILTER: Self = Self(1 << 5);
    pub const FORMATTABLE: Self = Self(1 << 6);
    pub const URI: Self = Self(1 << 7);
    pub const METADATA: Self = Self(1 << 8);
    pub const MODULE: Self = Self(1 << 9);
    pub const STREAM: Self = Self(1 << 10);
    pub const EXCEPTION: Self = Self(1 << 11);

    /// Types rendered as a single string and never traversed
    pub const OPAQUE: Self = Self(
        Self::FORMATTABLE.0 | Self::URI.0 | Self::METADATA.0 | Self::MODULE.0 | Self::STREAM.0,
    );

    /// Any of these makes a type a configuration item
    pub const CONFIG_ITEM_ANY: Self = Self(
        Self::SUPPORTS_INITIALIZE.0
            | Self::CONFIG_ITEM.0
            | Self::TARGET.0
            | Self::LAYOUT.0
            | Self::LAYOUT_RENDERER.0
            | Self::FILTER.0,
    );

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// All bits of `other` are set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// At least one bit of `other` is set
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_config_item(self) -> bool {
        self.intersects(Self::CONFIG_ITEM_ANY)
    }

    pub const fn is_opaque(self) -> bool {
        self.intersects(Self::OPAQUE)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Named members of a configuration enum
#[derive(Debug, PartialEq, Eq)]
pub struct EnumSpec {
    pub name: &'static str,
    pub members: &'static [(&'static str, i64)],
    /// Values may be a bitwise union of members
    pub flags: bool,
}

impl EnumSpec {
    /// Case-insensitive member lookup
    pub fn member(&self, name: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|(member, _)| member.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    pub fn name_of(&self, value: i64) -> Option<&'static str> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| *name)
    }
}

/// Conversion hooks declared by a user-defined value kind
#[derive(Debug)]
pub struct CustomKind {
    pub name: &'static str,
    /// Implicit construction from a string, declared on the kind itself
    pub implicit: Option<fn(&str) -> Result<Value, String>>,
    /// Invariant-culture string converter
    pub type_converter: Option<fn(&str) -> Result<Value, String>>,
}

/// Declared kind of a property value
#[derive(Debug, Clone, Copy)]
pub enum ValueKind {
    String,
    Bool,
    Int,
    Float,
    Char,
    Enum(&'static EnumSpec),
    Layout,
    /// Layout whose rendered output is converted to the inner kind
    TypedLayout(&'static ValueKind),
    Condition,
    Encoding,
    Culture,
    TimeSpan,
    LineEnding,
    Uri,
    /// Accepts empty or whitespace input as "no value"
    Optional(&'static ValueKind),
    List(&'static ValueKind),
    Set(&'static ValueKind),
    /// Nested object with the given capabilities
    Object(Capabilities),
    Custom(&'static CustomKind),
    Any,
}

impl ValueKind {
    /// Stable kind name, also the converter registry key
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::String => "String",
            ValueKind::Bool => "Boolean",
            ValueKind::Int => "Int64",
            ValueKind::Float => "Double",
            ValueKind::Char => "Char",
            ValueKind::Enum(spec) => spec.name,
            ValueKind::Layout => "Layout",
            ValueKind::TypedLayout(_) => "TypedLayout",
            ValueKind::Condition => "ConditionExpression",
            ValueKind::Encoding => "Encoding",
            ValueKind::Culture => "CultureInfo",
            ValueKind::TimeSpan => "TimeSpan",
            ValueKind::LineEnding => "LineEndingMode",
            ValueKind::Uri => "Uri",
            ValueKind::Optional(inner) => inner.name(),
            ValueKind::List(_) => "List",
            ValueKind::Set(_) => "Set",
            ValueKind::Object(_) => "Object",
            ValueKind::Custom(custom) => custom.name,
            ValueKind::Any => "Any",
        }
    }

    /// Primitive-like kinds that never carry implicit conversions
    pub fn is_simple(&self) -> bool {
        match self {
            ValueKind::String
            | ValueKind::Bool
            | ValueKind::Int
            | ValueKind::Float
            | ValueKind::Char
            | ValueKind::Enum(_)
            | ValueKind::Encoding
            | ValueKind::Culture
            | ValueKind::TimeSpan => true,
            ValueKind::Optional(inner) => inner.is_simple(),
            _ => false,
        }
    }

    /// Nested objects and enumerables: the kinds the graph scanner follows
    pub fn is_config_item_kind(&self) -> bool {
        match self {
            ValueKind::Object(_) | ValueKind::List(_) | ValueKind::Set(_) => true,
            ValueKind::Optional(inner) => inner.is_config_item_kind(),
            _ => false,
        }
    }

    /// Kinds that cannot hold a reference back into the graph
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            ValueKind::Object(_) | ValueKind::List(_) | ValueKind::Set(_) | ValueKind::Any
        ) && !matches!(self, ValueKind::Optional(inner) if !inner.is_scalar())
    }

    /// Strip an `Optional` wrapper
    pub fn underlying(&self) -> &ValueKind {
        match self {
            ValueKind::Optional(inner) => inner.underlying(),
            other => other,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::TypedLayout(inner) => write!(f, "Layout<{}>", inner),
            ValueKind::Optional(inner) => write!(f, "{}?", inner),
            ValueKind::List(inner) => write!(f, "List<{}>", inner),
            ValueKind::Set(inner) => write!(f, "Set<{}>", inner),
            other => f.write_str(other.name()),
        }
    }
}

/// One declared property of a type
#[derive(Debug, Clone, Copy)]
pub struct PropertySpec {
    pub name: &'static str,
    pub kind: ValueKind,
    pub getter: Option<Getter>,
    pub setter: Option<Setter>,
    pub flags: u8,
    /// Alternate configuration name for array parameters
    pub element_name: Option<&'static str>,
}

impl PropertySpec {
    pub const REQUIRED: u8 = 1 << 0;
    pub const IGNORED: u8 = 1 << 1;
    pub const INDEXED: u8 = 1 << 2;
    pub const DEFAULT_PARAMETER: u8 = 1 << 3;
    pub const SENSITIVE: u8 = 1 << 4;
    pub const ARRAY: u8 = 1 << 5;

    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            getter: None,
            setter: None,
            flags: 0,
            element_name: None,
        }
    }

    pub const fn get(self, getter: Getter) -> Self {
        Self {
            getter: Some(getter),
            ..self
        }
    }

    pub const fn set(self, setter: Setter) -> Self {
        Self {
            setter: Some(setter),
            ..self
        }
    }

    const fn with_flag(self, flag: u8) -> Self {
        Self {
            flags: self.flags | flag,
            ..self
        }
    }

    pub const fn required(self) -> Self {
        self.with_flag(Self::REQUIRED)
    }

    /// Excluded from configuration binding and scanning
    pub const fn ignored(self) -> Self {
        self.with_flag(Self::IGNORED)
    }

    /// Takes index parameters; never read by the engine
    pub const fn indexed(self) -> Self {
        self.with_flag(Self::INDEXED)
    }

    /// Also bound under the empty name
    pub const fn default_parameter(self) -> Self {
        self.with_flag(Self::DEFAULT_PARAMETER)
    }

    /// Raw values are redacted in diagnostics
    pub const fn sensitive(self) -> Self {
        self.with_flag(Self::SENSITIVE)
    }

    /// Array parameter, also reachable under `element` in configuration
    pub const fn array(self, element: &'static str) -> Self {
        Self {
            element_name: Some(element),
            flags: self.flags | Self::ARRAY,
            ..self
        }
    }

    pub const fn has(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    pub const fn is_required(&self) -> bool {
        self.has(Self::REQUIRED)
    }

    pub const fn is_ignored(&self) -> bool {
        self.has(Self::IGNORED)
    }

    pub const fn is_indexed(&self) -> bool {
        self.has(Self::INDEXED)
    }

    pub const fn is_default_parameter(&self) -> bool {
        self.has(Self::DEFAULT_PARAMETER)
    }

    pub const fn is_sensitive(&self) -> bool {
        self.has(Self::SENSITIVE)
    }

    pub const fn is_array(&self) -> bool {
        self.has(Self::ARRAY)
    }

    /// Readable without index parameters
    pub const fn is_readable(&self) -> bool {
        self.getter.is_some() && !self.is_indexed()
    }
}

/// Static description of a participating type
#[derive(Debug)]
pub struct TypeShape {
    pub name: &'static str,
    pub capabilities: Capabilities,
    pub properties: &'static [PropertySpec],
}

impl TypeShape {
    pub fn property(&self, name: &str) -> Option<&'static PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }
}

//! Runtime values flowing through mocked calls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a method parameter or return value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// `boolean`
    Bool,
    /// 32-bit `int`
    Int,
    /// 64-bit `long`
    Long,
    /// Nullable boxed `Integer`
    BoxedInt,
    /// Any reference type
    Object,
    /// No value
    Void,
}

impl ValueType {
    /// Default value the engine observes before any model constrains it
    #[must_use]
    pub const fn default_value(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Long => Value::Long(0),
            Self::BoxedInt => Value::Boxed(Some(0)),
            Self::Object | Self::Void => Value::Null,
        }
    }

    /// Whether a value of this type can steer a branch
    #[must_use]
    pub const fn is_resolvable(self) -> bool {
        !matches!(self, Self::Void)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "boolean",
            Self::Int => "int",
            Self::Long => "long",
            Self::BoxedInt => "Integer",
            Self::Object => "Object",
            Self::Void => "void",
        };
        f.write_str(name)
    }
}

/// A concrete runtime value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Null reference
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// Boxed integer, `None` is a null box
    Boxed(Option<i32>),
}

impl Value {
    /// Whether this value inhabits `ty`
    #[must_use]
    pub const fn conforms_to(&self, ty: ValueType) -> bool {
        matches!(
            (self, ty),
            (Self::Bool(_), ValueType::Bool)
                | (Self::Int(_), ValueType::Int)
                | (Self::Long(_), ValueType::Long)
                | (Self::Boxed(_), ValueType::BoxedInt)
                | (Self::Null, ValueType::BoxedInt | ValueType::Object | ValueType::Void)
        )
    }

    /// Numeric view used by predicates; `None` for null and non-numeric values
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) | Self::Boxed(Some(v)) => Some(*v as i64),
            Self::Long(v) => Some(*v),
            Self::Bool(b) => Some(*b as i64),
            Self::Null | Self::Boxed(None) => None,
        }
    }

    /// Build a value of type `ty` from a numeric literal
    #[must_use]
    pub fn from_i64(ty: ValueType, raw: i64) -> Option<Self> {
        match ty {
            ValueType::Int => i32::try_from(raw).ok().map(Self::Int),
            ValueType::BoxedInt => i32::try_from(raw).ok().map(|v| Self::Boxed(Some(v))),
            ValueType::Long => Some(Self::Long(raw)),
            ValueType::Bool => match raw {
                0 => Some(Self::Bool(false)),
                1 => Some(Self::Bool(true)),
                _ => None,
            },
            ValueType::Object | ValueType::Void => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null | Self::Boxed(None) => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(v) | Self::Boxed(Some(v)) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}L"),
        }
    }
}

//! Property values.
//!
//! [`Value`] is a closed set: every property holds exactly one of these
//! variants, and a missing property is the explicit [`Value::Undefined`]
//! variant rather than an error. This keeps "absent" distinguishable from
//! "present but the wrong type" for callers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::is_numeric_token;

/// String sentinel that, when written as a property value, stores an empty
/// sequence instead.
pub const CREATE_SEQUENCE: &str = "createNewArray";

/// A property value.
///
/// Serializes untagged: `null`, booleans, numbers, strings and arrays map
/// straight onto their JSON counterparts. Integral JSON numbers come back as
/// [`Value::Int`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value: a missing property or an unresolved reference.
    #[default]
    Undefined,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// A growable sequence of values.
    List(Vec<Value>),
}

impl Value {
    /// Whether this is the absent value.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Whether this is a sequence.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Whether this is the `createNewArray` sentinel.
    #[must_use]
    pub fn is_create_sequence(&self) -> bool {
        matches!(self, Self::Str(s) if s == CREATE_SEQUENCE)
    }

    /// Short type label used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::Float(_) => "number",
            Self::Str(_) => "string",
            Self::List(_) => "sequence",
        }
    }

    /// Numeric view of an `Int` or `Float`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Integer view for host-facing counts.
    ///
    /// Floats are floored, numeric strings are parsed and booleans count as
    /// `0`/`1`. Anything else, including non-finite floats, yields `None`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(x) if x.is_finite() => Some(x.floor() as i64),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Str(s) if is_numeric_token(s) => Self::Float(s.trim().parse().ok()?).to_integer(),
            _ => None,
        }
    }

    /// Borrow the sequence, if this is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Mutably borrow the sequence, if this is one.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Interpret a positional command argument.
    ///
    /// `true`/`false` become booleans, integers and decimals become numbers,
    /// `undefined` becomes [`Value::Undefined`], everything else (including
    /// the `createNewArray` sentinel) stays a string.
    #[must_use]
    pub fn from_command_arg(arg: &str) -> Self {
        let trimmed = arg.trim();
        match trimmed {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            "undefined" => return Self::Undefined,
            _ => {},
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Self::Int(n);
        }
        if is_numeric_token(trimmed)
            && let Ok(x) = trimmed.parse::<f64>()
        {
            return Self::Float(x);
        }
        Self::Str(arg.to_owned())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => fmt_number(f, *x),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    // Absent elements render empty inside a sequence.
                    if !item.is_undefined() {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            },
        }
    }
}

/// Render a float the way the host prints numbers: integral values without
/// a fractional part, `NaN` and `Infinity` spelled out.
#[allow(clippy::float_cmp)]
fn fmt_number(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        f.write_str("NaN")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "Infinity" } else { "-Infinity" })
    } else if x == 0.0 {
        f.write_str("0")
    } else if x.trunc() == x && x.abs() < 1e21 {
        write!(f, "{x:.0}")
    } else {
        write!(f, "{x}")
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Undefined, Into::into)
    }
}

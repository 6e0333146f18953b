//! Tagged value type
//!
//! `Value` is the variant type shared by actor construction parameters and
//! message metadata. Typed accessors replace runtime downcasts - a caller
//! asking for the wrong type gets `None` and can surface a typed error
//! (`CoreError::InvalidParam`) instead of panicking.

use std::collections::HashMap;
use std::time::Duration;

/// Free-form parameter map passed to actor constructors
pub type Params = HashMap<String, Value>;

/// A tagged configuration or metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 string
    Str(String),

    /// Signed integer
    Int(i64),

    /// Floating point number
    Float(f64),

    /// Boolean flag
    Bool(bool),

    /// Time duration
    Duration(Duration),

    /// Ordered list of values
    Array(Vec<Value>),

    /// Nested key -> value map
    Map(HashMap<String, Value>),
}

impl Value {
    /// Get the string content, if this is a `Str`
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer content, if this is an `Int`
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the float content, if this is a `Float` (or an `Int`, widened)
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the boolean content, if this is a `Bool`
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the duration content, if this is a `Duration`
    #[inline]
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Get the array content, if this is an `Array`
    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get the map content, if this is a `Map`
    #[inline]
    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Name of the contained variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::Duration(_) => "duration",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
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

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Self::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}

//! Typed carrier for proposed field values.
//!
//! Handlers communicate through [`Value`]: an environment lookup proposes a
//! [`Value::String`], a handler that already knows the field type may
//! propose a typed value directly, and binary sources propose
//! [`Value::Bytes`]. "No proposal" is `None` at the call sites, which keeps
//! it distinct from any zero value.
//!
//! # Example
//!
//! ```rust
//! use structconf::{Kind, Value};
//!
//! let value = Value::from(8080_u16);
//! assert_eq!(value.kind(), Some(Kind::U16));
//! assert!(!value.is_zero());
//! assert!(Value::from("").is_zero());
//! ```

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use num_complex::Complex;
use num_traits::Zero;

use crate::Kind;

/// A proposed or current field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// An `i8`.
    I8(i8),
    /// An `i16`.
    I16(i16),
    /// An `i32`.
    I32(i32),
    /// An `i64`.
    I64(i64),
    /// An `isize`.
    Isize(isize),
    /// A `u8`.
    U8(u8),
    /// A `u16`.
    U16(u16),
    /// A `u32`.
    U32(u32),
    /// A `u64`.
    U64(u64),
    /// A `usize`.
    Usize(usize),
    /// An `f32`.
    F32(f32),
    /// An `f64`.
    F64(f64),
    /// A `Complex<f32>`.
    Complex64(Complex<f32>),
    /// A `Complex<f64>`.
    Complex128(Complex<f64>),
    /// Text, the usual form of an external proposal.
    String(String),
    /// A duration.
    Duration(Duration),
    /// Raw bytes, only accepted by fields with an unmarshal hook.
    Bytes(Vec<u8>),
}

/// Generates `From<T> for Value` and `TryFrom<Value> for T`
macro_rules! impl_value_conversions {
    ($($t:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }

            impl TryFrom<Value> for $t {
                type Error = Value;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }
        )+
    };
}

impl_value_conversions! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    Complex<f32> => Complex64,
    Complex<f64> => Complex128,
    String => String,
    Duration => Duration,
    Vec<u8> => Bytes,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl Value {
    /// Returns the field kind this value belongs to.
    ///
    /// [`Value::Bytes`] has no kind of its own; it is only meaningful to a
    /// field with an unmarshal hook.
    #[must_use]
    pub const fn kind(&self) -> Option<Kind> {
        Some(match self {
            Value::Bool(_) => Kind::Bool,
            Value::I8(_) => Kind::I8,
            Value::I16(_) => Kind::I16,
            Value::I32(_) => Kind::I32,
            Value::I64(_) => Kind::I64,
            Value::Isize(_) => Kind::Isize,
            Value::U8(_) => Kind::U8,
            Value::U16(_) => Kind::U16,
            Value::U32(_) => Kind::U32,
            Value::U64(_) => Kind::U64,
            Value::Usize(_) => Kind::Usize,
            Value::F32(_) => Kind::F32,
            Value::F64(_) => Kind::F64,
            Value::Complex64(_) => Kind::Complex64,
            Value::Complex128(_) => Kind::Complex128,
            Value::String(_) => Kind::String,
            Value::Duration(_) => Kind::Duration,
            Value::Bytes(_) => return None,
        })
    }

    /// Returns a human-readable type name for diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.type_name(),
            None => "bytes",
        }
    }

    /// Returns the text if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the raw bytes of a string or byte value.
    ///
    /// Any other variant is not byte-representable and yields `None`.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s.as_bytes()),
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns `true` if this is the zero value of its type.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Bool(b) => !b,
            Value::I8(n) => n.is_zero(),
            Value::I16(n) => n.is_zero(),
            Value::I32(n) => n.is_zero(),
            Value::I64(n) => n.is_zero(),
            Value::Isize(n) => n.is_zero(),
            Value::U8(n) => n.is_zero(),
            Value::U16(n) => n.is_zero(),
            Value::U32(n) => n.is_zero(),
            Value::U64(n) => n.is_zero(),
            Value::Usize(n) => n.is_zero(),
            Value::F32(n) => n.is_zero(),
            Value::F64(n) => n.is_zero(),
            Value::Complex64(c) => c.is_zero(),
            Value::Complex128(c) => c.is_zero(),
            Value::String(s) => s.is_empty(),
            Value::Duration(d) => d.is_zero(),
            Value::Bytes(b) => b.is_empty(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => Display::fmt(v, f),
            Value::I8(v) => Display::fmt(v, f),
            Value::I16(v) => Display::fmt(v, f),
            Value::I32(v) => Display::fmt(v, f),
            Value::I64(v) => Display::fmt(v, f),
            Value::Isize(v) => Display::fmt(v, f),
            Value::U8(v) => Display::fmt(v, f),
            Value::U16(v) => Display::fmt(v, f),
            Value::U32(v) => Display::fmt(v, f),
            Value::U64(v) => Display::fmt(v, f),
            Value::Usize(v) => Display::fmt(v, f),
            Value::F32(v) => Display::fmt(v, f),
            Value::F64(v) => Display::fmt(v, f),
            Value::Complex64(v) => Display::fmt(v, f),
            Value::Complex128(v) => Display::fmt(v, f),
            Value::String(v) => f.write_str(v),
            Value::Duration(v) => write!(f, "{v:?}"),
            Value::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Value::from(1_i8).kind(), Some(Kind::I8));
        assert_eq!(Value::from("x").kind(), Some(Kind::String));
        assert_eq!(Value::from(Duration::from_secs(1)).kind(), Some(Kind::Duration));
        assert_eq!(Value::Bytes(vec![1]).kind(), None);
        assert_eq!(Value::Bytes(vec![]).type_name(), "bytes");
    }

    #[test]
    fn test_zero_values() {
        assert!(Value::from(false).is_zero());
        assert!(Value::from(0_u64).is_zero());
        assert!(Value::from(0.0_f64).is_zero());
        assert!(Value::from(Complex::new(0.0_f32, 0.0)).is_zero());
        assert!(Value::from(String::new()).is_zero());
        assert!(Value::from(Duration::ZERO).is_zero());

        assert!(!Value::from(true).is_zero());
        assert!(!Value::from(-1_i32).is_zero());
        assert!(!Value::from(Complex::new(0.0_f64, 1.0)).is_zero());
        assert!(!Value::from("a").is_zero());
    }

    #[test]
    fn test_byte_views() {
        assert_eq!(Value::from("abc").as_bytes(), Some(&b"abc"[..]));
        assert_eq!(Value::Bytes(vec![0xff]).as_bytes(), Some(&[0xff][..]));
        assert_eq!(Value::from(3_u8).as_bytes(), None);
        assert_eq!(Value::from(3_u8).as_str(), None);
    }

    #[test]
    fn test_try_from_returns_original_on_mismatch() {
        let err = u16::try_from(Value::from("80")).unwrap_err();
        assert_eq!(err, Value::from("80"));
        assert_eq!(u16::try_from(Value::from(80_u16)), Ok(80));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(42_i64).to_string(), "42");
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::from(Duration::from_millis(1500)).to_string(), "1.5s");
    }
}

//! Conversion of proposed values into field-typed values.
//!
//! [`coerce_str`] turns text into a [`Value`] of a given [`Kind`], checking
//! numeric overflow against the kind's declared width. [`coerce`] applies a
//! field's kind and unmarshal hook to any proposed [`Value`]:
//!
//! - fields with an unmarshal hook receive the raw bytes of a string or
//!   byte value; any other value is rejected;
//! - strings proposed for non-string fields are parsed with [`coerce_str`];
//! - every other value passes through unchanged and is type-checked when
//!   written.

use std::num::{IntErrorKind, ParseIntError};

use miette::Diagnostic;

use crate::duration::{DurationError, parse_duration};
use crate::{Error, Field, Kind, Value};

/// Errors from converting a value to a field kind.
///
/// The offending text is not part of these messages; [`Error::Coerce`]
/// carries it so it can be redacted for secret fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum CoerceError {
    /// The text is not valid syntax for the kind.
    #[error("invalid {kind} syntax")]
    #[diagnostic(code(structconf::coerce::invalid))]
    Invalid {
        /// The target kind.
        kind: Kind,
    },

    /// The number does not fit in the kind's width.
    #[error("value out of range for {kind}")]
    #[diagnostic(code(structconf::coerce::overflow))]
    Overflow {
        /// The target kind.
        kind: Kind,
    },

    /// The kind cannot be produced from text.
    #[error("unsupported kind {kind}")]
    #[diagnostic(code(structconf::coerce::unsupported))]
    Unsupported {
        /// The target kind.
        kind: Kind,
    },

    /// An unmarshal hook was offered a value with no byte representation.
    #[error("{found} value cannot be unmarshaled, expected string or bytes")]
    #[diagnostic(code(structconf::coerce::not_bytes))]
    NotBytes {
        /// Type name of the offered value.
        found: &'static str,
    },

    /// The text is not a valid duration literal.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Duration(#[from] DurationError),
}

fn int_error(kind: Kind, err: &ParseIntError) -> CoerceError {
    match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => CoerceError::Overflow { kind },
        _ => CoerceError::Invalid { kind },
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Returns `true` if `text` spells infinity rather than overflowing to it.
fn is_inf_literal(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Generates the integer and float arms of [`coerce_str`]
macro_rules! parse_number {
    (int $text:expr, $kind:expr, $t:ty) => {
        $text
            .parse::<$t>()
            .map(Value::from)
            .map_err(|e| int_error($kind, &e))
    };
    (float $text:expr, $kind:expr, $t:ty) => {
        match $text.parse::<$t>() {
            Ok(v) if v.is_infinite() && !is_inf_literal($text) => {
                Err(CoerceError::Overflow { kind: $kind })
            }
            Ok(v) => Ok(Value::from(v)),
            Err(_) => Err(CoerceError::Invalid { kind: $kind }),
        }
    };
}

/// Converts `text` to a value of `kind`.
///
/// Booleans accept `1`, `t`, `T`, `true`, `TRUE`, `True` and their false
/// counterparts. Integers are base 10 with an optional sign. Floats accept
/// decimal and exponent forms; a finite literal that rounds to infinity is
/// an overflow. Durations use the grammar in [`crate::duration`].
///
/// # Errors
///
/// Returns a [`CoerceError`] for invalid syntax, overflow, or kinds that
/// cannot be produced from text (complex numbers and custom types).
///
/// # Example
///
/// ```rust
/// use structconf::coerce::{CoerceError, coerce_str};
/// use structconf::{Kind, Value};
///
/// assert_eq!(coerce_str(Kind::I8, "100"), Ok(Value::I8(100)));
/// assert_eq!(
///     coerce_str(Kind::I8, "130"),
///     Err(CoerceError::Overflow { kind: Kind::I8 })
/// );
/// ```
pub fn coerce_str(kind: Kind, text: &str) -> Result<Value, CoerceError> {
    match kind {
        Kind::Bool => parse_bool(text)
            .map(Value::Bool)
            .ok_or(CoerceError::Invalid { kind }),
        Kind::I8 => parse_number!(int text, kind, i8),
        Kind::I16 => parse_number!(int text, kind, i16),
        Kind::I32 => parse_number!(int text, kind, i32),
        Kind::I64 => parse_number!(int text, kind, i64),
        Kind::Isize => parse_number!(int text, kind, isize),
        Kind::U8 => parse_number!(int text, kind, u8),
        Kind::U16 => parse_number!(int text, kind, u16),
        Kind::U32 => parse_number!(int text, kind, u32),
        Kind::U64 => parse_number!(int text, kind, u64),
        Kind::Usize => parse_number!(int text, kind, usize),
        Kind::F32 => parse_number!(float text, kind, f32),
        Kind::F64 => parse_number!(float text, kind, f64),
        Kind::String => Ok(Value::String(text.to_owned())),
        Kind::Duration => Ok(Value::Duration(parse_duration(text)?)),
        Kind::Complex64 | Kind::Complex128 | Kind::Custom => {
            Err(CoerceError::Unsupported { kind })
        }
    }
}

/// Converts a proposed value into one the field can store.
///
/// # Errors
///
/// Returns [`Error::Coerce`] naming the field when conversion fails. The
/// offending text is redacted if the field is marked `secret`.
pub fn coerce(field: &Field<'_>, value: Value) -> Result<Value, Error> {
    let secret = field.lookup_tag("secret").is_some();

    if field.has_unmarshaler() {
        return match value {
            Value::String(s) => Ok(Value::Bytes(s.into_bytes())),
            Value::Bytes(b) => Ok(Value::Bytes(b)),
            other => Err(Error::coerce(
                field.name(),
                other.to_string(),
                secret,
                field.kind(),
                CoerceError::NotBytes {
                    found: other.type_name(),
                },
            )),
        };
    }

    match value {
        Value::String(text) if field.kind() != Kind::String => coerce_str(field.kind(), &text)
            .map_err(|source| Error::coerce(field.name(), text, secret, field.kind(), source)),
        other => Ok(other),
    }
}

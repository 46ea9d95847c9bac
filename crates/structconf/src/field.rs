//! Settable leaf fields.
//!
//! A [`Field`] is a handle to one leaf member of a caller's record. It
//! borrows the member's storage mutably, so a write through
//! [`Field::set`] lands directly in the record. Fields are produced fresh
//! by every discovery pass (see [`crate::settable_fields`]) and live only
//! as long as that borrow.
//!
//! The storage behind a field is any type implementing [`FieldValue`]. The
//! crate implements it for every supported scalar; user types join in by
//! implementing [`TextUnmarshaler`] or [`BinaryUnmarshaler`] and
//! registering with [`text_unmarshaler!`](crate::text_unmarshaler) or
//! [`binary_unmarshaler!`](crate::binary_unmarshaler).

use std::error::Error as StdError;
use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;
use std::str::Utf8Error;
use std::time::Duration;

use num_complex::Complex;

use crate::error::BoxError;
use crate::{Context, Discover, Error, Handler, Kind, Member, Value, coerce, tag};

/// Why a [`FieldValue`] refused a write.
#[derive(Debug)]
pub enum SetError {
    /// The value's type does not match the storage. The value is handed back.
    Mismatch(Value),

    /// The unmarshal hook rejected the input.
    Unmarshal(BoxError),
}

/// Storage behind a [`Field`].
///
/// Implementations exist for `bool`, every integer and float width,
/// `Complex<f32>`, `Complex<f64>`, `String` and `Duration`, plus any type
/// registered through the unmarshaler macros.
pub trait FieldValue {
    /// The field's kind.
    fn kind(&self) -> Kind;

    /// Type name for diagnostics.
    fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    /// The current value, or `None` for custom types.
    fn value(&self) -> Option<Value>;

    /// The zero value of the type, or `None` for custom types.
    fn zero(&self) -> Option<Value>;

    /// Returns `true` if the storage holds the zero value of its type.
    fn is_zero(&self) -> bool;

    /// Returns `true` if writes go through an unmarshal hook.
    fn has_unmarshaler(&self) -> bool {
        false
    }

    /// Writes `value` into the storage.
    ///
    /// # Errors
    ///
    /// Returns [`SetError::Mismatch`] if the value has the wrong type, or
    /// [`SetError::Unmarshal`] if an unmarshal hook rejects it.
    fn set(&mut self, value: Value) -> Result<(), SetError>;
}

/// Generates `FieldValue` and leaf `Discover` impls for scalar types
macro_rules! impl_scalar_field {
    ($($t:ty => $kind:ident),+ $(,)?) => {
        $(
            impl FieldValue for $t {
                fn kind(&self) -> Kind {
                    Kind::$kind
                }

                fn value(&self) -> Option<Value> {
                    Some(Value::from(self.clone()))
                }

                fn zero(&self) -> Option<Value> {
                    Some(Value::from(<$t>::default()))
                }

                fn is_zero(&self) -> bool {
                    *self == <$t>::default()
                }

                fn set(&mut self, value: Value) -> Result<(), SetError> {
                    *self = <$t>::try_from(value).map_err(SetError::Mismatch)?;
                    Ok(())
                }
            }

            impl Discover for $t {
                fn discover<'a>(
                    &'a mut self,
                    member: Member,
                    fields: &mut Vec<Field<'a>>,
                ) -> Result<(), Error> {
                    fields.push(Field::new(member, self));
                    Ok(())
                }
            }
        )+
    };
}

impl_scalar_field! {
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
}

/// A type that can decode itself from text.
///
/// Register an implementor with [`text_unmarshaler!`](crate::text_unmarshaler)
/// to make it a settable leaf. The type must also implement `Default` and
/// `PartialEq`, which define its zero value.
///
/// ```rust
/// use structconf::{Settable, TextUnmarshaler, text_unmarshaler};
///
/// #[derive(Debug, Default, PartialEq)]
/// pub struct Level(u8);
///
/// impl TextUnmarshaler for Level {
///     type Error = std::num::ParseIntError;
///
///     fn unmarshal_text(&mut self, text: &[u8]) -> Result<(), Self::Error> {
///         self.0 = String::from_utf8_lossy(text).trim_start_matches('L').parse()?;
///         Ok(())
///     }
/// }
///
/// text_unmarshaler!(Level);
///
/// #[derive(Settable)]
/// pub struct Config {
///     #[conf("default:L3")]
///     pub level: Level,
/// }
/// ```
pub trait TextUnmarshaler {
    /// The decoding error.
    type Error: StdError + Send + Sync + 'static;

    /// Decodes `text` into `self`.
    ///
    /// # Errors
    ///
    /// Returns the implementor's error when `text` is malformed.
    fn unmarshal_text(&mut self, text: &[u8]) -> Result<(), Self::Error>;
}

/// A type that can decode itself from raw bytes.
///
/// Register an implementor with
/// [`binary_unmarshaler!`](crate::binary_unmarshaler).
pub trait BinaryUnmarshaler {
    /// The decoding error.
    type Error: StdError + Send + Sync + 'static;

    /// Decodes `data` into `self`.
    ///
    /// # Errors
    ///
    /// Returns the implementor's error when `data` is malformed.
    fn unmarshal_binary(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

#[doc(hidden)]
pub fn unmarshal_text_value<T: TextUnmarshaler>(
    target: &mut T,
    value: Value,
) -> Result<(), SetError> {
    match value {
        Value::Bytes(bytes) => target
            .unmarshal_text(&bytes)
            .map_err(|e| SetError::Unmarshal(Box::new(e))),
        Value::String(text) => target
            .unmarshal_text(text.as_bytes())
            .map_err(|e| SetError::Unmarshal(Box::new(e))),
        other => Err(SetError::Mismatch(other)),
    }
}

#[doc(hidden)]
pub fn unmarshal_binary_value<T: BinaryUnmarshaler>(
    target: &mut T,
    value: Value,
) -> Result<(), SetError> {
    match value {
        Value::Bytes(bytes) => target
            .unmarshal_binary(&bytes)
            .map_err(|e| SetError::Unmarshal(Box::new(e))),
        Value::String(text) => target
            .unmarshal_binary(text.as_bytes())
            .map_err(|e| SetError::Unmarshal(Box::new(e))),
        other => Err(SetError::Mismatch(other)),
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __unmarshaler_field {
    ($t:ty, $set:path) => {
        impl $crate::FieldValue for $t {
            fn kind(&self) -> $crate::Kind {
                $crate::Kind::Custom
            }

            fn type_name(&self) -> &'static str {
                ::core::any::type_name::<$t>()
            }

            fn value(&self) -> ::core::option::Option<$crate::Value> {
                ::core::option::Option::None
            }

            fn zero(&self) -> ::core::option::Option<$crate::Value> {
                ::core::option::Option::None
            }

            fn is_zero(&self) -> bool {
                *self == <$t as ::core::default::Default>::default()
            }

            fn has_unmarshaler(&self) -> bool {
                true
            }

            fn set(
                &mut self,
                value: $crate::Value,
            ) -> ::core::result::Result<(), $crate::SetError> {
                $set(self, value)
            }
        }

        impl $crate::Discover for $t {
            fn discover<'a>(
                &'a mut self,
                member: $crate::Member,
                fields: &mut ::std::vec::Vec<$crate::Field<'a>>,
            ) -> ::core::result::Result<(), $crate::Error> {
                fields.push($crate::Field::new(member, self));
                ::core::result::Result::Ok(())
            }
        }
    };
}

/// Registers [`TextUnmarshaler`] types as settable leaf fields.
#[macro_export]
macro_rules! text_unmarshaler {
    ($($t:ty),+ $(,)?) => {
        $(
            $crate::__unmarshaler_field!($t, $crate::field::unmarshal_text_value);
        )+
    };
}

/// Registers [`BinaryUnmarshaler`] types as settable leaf fields.
#[macro_export]
macro_rules! binary_unmarshaler {
    ($($t:ty),+ $(,)?) => {
        $(
            $crate::__unmarshaler_field!($t, $crate::field::unmarshal_binary_value);
        )+
    };
}

impl TextUnmarshaler for PathBuf {
    type Error = Utf8Error;

    fn unmarshal_text(&mut self, text: &[u8]) -> Result<(), Self::Error> {
        *self = PathBuf::from(std::str::from_utf8(text)?);
        Ok(())
    }
}

text_unmarshaler!(PathBuf);

/// One settable leaf of a record.
pub struct Field<'a> {
    name: &'static str,
    annotation: Option<&'static str>,
    slot: &'a mut dyn FieldValue,
}

impl<'a> Field<'a> {
    /// Creates a field over `slot`.
    pub fn new(member: Member, slot: &'a mut dyn FieldValue) -> Self {
        Self {
            name: member.name,
            annotation: member.annotation,
            slot,
        }
    }

    /// The member's name in the record.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The field's kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.slot.kind()
    }

    /// The field's type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.slot.type_name()
    }

    /// The current value. `None` for custom types.
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        self.slot.value()
    }

    /// The zero value of the field's type. `None` for custom types.
    #[must_use]
    pub fn zero(&self) -> Option<Value> {
        self.slot.zero()
    }

    /// Returns `true` if the field currently holds its zero value.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.slot.is_zero()
    }

    /// The raw annotation, empty if the member has none.
    #[must_use]
    pub fn annotation(&self) -> &'static str {
        self.annotation.unwrap_or_default()
    }

    /// Looks up a directive in the annotation.
    ///
    /// An empty `key` returns the whole annotation. A member without an
    /// annotation has no directives.
    #[must_use]
    pub fn lookup_tag(&self, key: &str) -> Option<&'static str> {
        self.annotation.and_then(|raw| tag::lookup(raw, key))
    }

    /// Returns `true` if writes go through an unmarshal hook.
    #[must_use]
    pub fn has_unmarshaler(&self) -> bool {
        self.slot.has_unmarshaler()
    }

    /// Coerces `value` to the field's type and writes it.
    ///
    /// # Errors
    ///
    /// Returns a coercion, type mismatch or unmarshal error. The field is
    /// left untouched on error.
    pub fn set(&mut self, value: Value) -> Result<(), Error> {
        let value = coerce::coerce(self, value)?;
        let name = self.name;
        let expected = self.type_name();

        self.slot.set(value).map_err(|e| match e {
            SetError::Mismatch(found) => Error::TypeMismatch {
                field: name.to_owned(),
                expected,
                found: found.type_name(),
            },
            SetError::Unmarshal(source) => Error::Unmarshal {
                field: name.to_owned(),
                source,
            },
        })
    }

    /// Resolves this field through `handler` and writes the outcome.
    ///
    /// The handler starts with no proposed value. If it ends with one, the
    /// value is coerced and written; if it ends with none, the field keeps
    /// its current content.
    ///
    /// # Errors
    ///
    /// Returns the first handler error or the write error.
    pub fn parse(&mut self, ctx: &Context, handler: &dyn Handler) -> Result<(), Error> {
        let proposed = handler.handle(ctx, self, None)?;

        #[cfg(feature = "tracing")]
        tracing::trace!(field = self.name, written = proposed.is_some(), "resolved field");

        match proposed {
            Some(value) => self.set(value),
            None => Ok(()),
        }
    }
}

impl Debug for Field<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("annotation", &self.annotation)
            .finish_non_exhaustive()
    }
}

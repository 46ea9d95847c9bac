//! Error types for field discovery and resolution.
//!
//! This module contains the [`Error`] enum returned by every fallible
//! operation in the crate. It integrates with [`miette`] for rich terminal
//! diagnostics.
//!
//! # Error Variants
//!
//! | Variant | When It Occurs |
//! |---------|----------------|
//! | [`Error::Discovery`] | A member could not be classified during discovery |
//! | [`Error::Coerce`] | Text could not be converted to the field's kind |
//! | [`Error::TypeMismatch`] | A typed value does not match the field's type |
//! | [`Error::Unmarshal`] | A field's unmarshal hook rejected its input |
//! | [`Error::Required`] | A `required` field received no value |
//! | [`Error::EmptyDefault`] | A field declares `default:` with nothing after it |
//! | [`Error::InvalidUtf8`] | An environment variable holds non-UTF-8 bytes |
//! | [`Error::Cancelled`] | The [`Context`](crate::Context) was cancelled |
//! | [`Error::DeadlineExceeded`] | The [`Context`](crate::Context) deadline passed |
//! | [`Error::Handler`] | A custom handler or middleware failed |
//! | [`Error::Dotenv`] | A `.env` file could not be read (with `dotenv` feature) |
//! | [`Error::Flag`] | Command-line parsing failed (with `clap` feature) |
//! | [`Error::DuplicateFlag`] | Two fields define the same flag (with `clap` feature) |
//! | [`Error::Secret`] | A `secret` field could not be decrypted (with `rsa` feature) |
//! | [`Error::Crypto`] | Key handling failed (with `rsa` feature) |
//!
//! # Fail Fast
//!
//! Resolution stops at the first error. Fields resolved before the failing
//! one keep the values already written to them.
//!
//! # Secret Masking
//!
//! Fields whose annotation carries `secret` have their values redacted in
//! error messages and Debug output:
//!
//! ```text
//! failed to set api_key: expected u64, got <redacted>
//! ```

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};

use miette::Diagnostic;

use crate::Kind;
use crate::coerce::CoerceError;

#[cfg(feature = "rsa")]
use crate::handler::CryptoError;

/// Boxed error used for hook and custom handler failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors that can occur while discovering or resolving fields.
///
/// # Diagnostic Codes
///
/// | Code | Meaning |
/// |------|---------|
/// | `structconf::discovery` | Unsupported member shape |
/// | `structconf::coerce` | Text could not be converted |
/// | `structconf::type_mismatch` | Typed value of the wrong type |
/// | `structconf::unmarshal` | Unmarshal hook failed |
/// | `structconf::required` | Required field left unset |
/// | `structconf::empty_default` | `default:` without a value |
/// | `structconf::invalid_utf8` | Environment value is not UTF-8 |
/// | `structconf::cancelled` | Context cancelled |
/// | `structconf::deadline_exceeded` | Context deadline passed |
/// | `structconf::handler` | Custom handler failure |
#[derive(Diagnostic)]
pub enum Error {
    /// A member of the record could not be classified.
    #[diagnostic(
        code(structconf::discovery),
        help("settable members must be scalars, nested records or skipped collection types")
    )]
    Discovery {
        /// What went wrong.
        message: String,
    },

    /// A proposed value could not be converted to the field's kind.
    #[diagnostic(code(structconf::coerce))]
    Coerce {
        /// The field being set.
        field: String,

        /// The text that failed to convert.
        value: String,

        /// Whether the field is marked `secret`.
        secret: bool,

        /// The field's kind.
        kind: Kind,

        /// Dynamic help text based on the kind.
        #[help]
        help: String,

        /// The underlying conversion failure.
        source: CoerceError,
    },

    /// A typed value was proposed for a field of a different type.
    #[diagnostic(
        code(structconf::type_mismatch),
        help("propose a string or a value of the field's exact type")
    )]
    TypeMismatch {
        /// The field being set.
        field: String,

        /// The field's type.
        expected: &'static str,

        /// The proposed value's type.
        found: &'static str,
    },

    /// A field's unmarshal hook rejected its input.
    #[diagnostic(code(structconf::unmarshal))]
    Unmarshal {
        /// The field being set.
        field: String,

        /// The hook's error.
        source: BoxError,
    },

    /// A field marked `required` received no value.
    #[diagnostic(code(structconf::required), severity(Error))]
    Required {
        /// The field left unset.
        field: String,

        /// Dynamic help message.
        #[help]
        help: String,
    },

    /// A field declares `default:` without a value.
    #[diagnostic(
        code(structconf::empty_default),
        help("remove the default directive or give it a value")
    )]
    EmptyDefault {
        /// The offending field.
        field: String,
    },

    /// An environment variable contains invalid UTF-8.
    #[diagnostic(
        code(structconf::invalid_utf8),
        help("ensure the variable contains valid UTF-8 text")
    )]
    InvalidUtf8 {
        /// The variable name.
        var: String,
    },

    /// The context was cancelled.
    #[diagnostic(code(structconf::cancelled))]
    Cancelled,

    /// The context deadline passed.
    #[diagnostic(code(structconf::deadline_exceeded))]
    DeadlineExceeded,

    /// A custom handler or middleware failed.
    #[diagnostic(code(structconf::handler))]
    Handler {
        /// Error message.
        message: String,

        /// The underlying error, if any.
        source: Option<BoxError>,
    },

    /// A `.env` file could not be read.
    #[cfg(feature = "dotenv")]
    #[diagnostic(
        code(structconf::dotenv),
        help("check that the file exists and uses KEY=VALUE lines")
    )]
    Dotenv {
        /// The file that failed.
        path: String,

        /// The parser error.
        source: dotenvy::Error,
    },

    /// Command-line parsing failed.
    #[cfg(feature = "clap")]
    #[diagnostic(
        code(structconf::flag),
        help("check the command-line arguments and try again")
    )]
    Flag {
        /// The error message from clap.
        message: String,
    },

    /// Two fields define the same flag in one pass.
    #[cfg(feature = "clap")]
    #[diagnostic(
        code(structconf::duplicate_flag),
        help("give every field a distinct flag name")
    )]
    DuplicateFlag {
        /// The flag name.
        name: String,
    },

    /// A `secret` field could not be decrypted.
    #[cfg(feature = "rsa")]
    #[diagnostic(code(structconf::secret))]
    Secret {
        /// The field being decrypted.
        field: String,

        /// The decryption failure.
        source: CryptoError,
    },

    /// Key generation, encoding or encryption failed.
    #[cfg(feature = "rsa")]
    #[diagnostic(transparent)]
    Crypto {
        /// The underlying failure.
        #[diagnostic_source]
        source: CryptoError,
    },
}

#[cfg(feature = "rsa")]
impl From<CryptoError> for Error {
    fn from(source: CryptoError) -> Self {
        Error::Crypto { source }
    }
}

// Manual Display impl for secret masking
impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Discovery { message } => write!(f, "field discovery failed: {message}"),

            Error::Coerce {
                field,
                value,
                secret,
                kind,
                source,
                ..
            } => {
                if *secret {
                    write!(f, "failed to set {field}: expected {kind}, got <redacted>")
                } else {
                    write!(f, "failed to set {field}: expected {kind}, got {value:?}: {source}")
                }
            }

            Error::TypeMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "failed to set {field}: expected a value of type {expected}, got {found}"
            ),

            Error::Unmarshal { field, source } => {
                write!(f, "failed to unmarshal {field}: {source}")
            }

            Error::Required { field, .. } => write!(f, "field {field} is required"),

            Error::EmptyDefault { field } => {
                write!(f, "empty default value for field {field}")
            }

            Error::InvalidUtf8 { var } => {
                write!(f, "environment variable {var} contains invalid UTF-8")
            }

            Error::Cancelled => f.write_str("context cancelled"),

            Error::DeadlineExceeded => f.write_str("context deadline exceeded"),

            Error::Handler { message, .. } => f.write_str(message),

            #[cfg(feature = "dotenv")]
            Error::Dotenv { path, source } => write!(f, "failed to read {path}: {source}"),

            #[cfg(feature = "clap")]
            Error::Flag { message } => write!(f, "command-line error: {message}"),

            #[cfg(feature = "clap")]
            Error::DuplicateFlag { name } => write!(f, "flag redefined: {name}"),

            #[cfg(feature = "rsa")]
            Error::Secret { field, source } => {
                write!(f, "failed to decrypt {field}: {source}")
            }

            #[cfg(feature = "rsa")]
            Error::Crypto { source } => Display::fmt(source, f),
        }
    }
}

// Manual Debug impl for secret masking
impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Discovery { message } => f
                .debug_struct("Discovery")
                .field("message", message)
                .finish(),

            Error::Coerce {
                field,
                value,
                secret,
                kind,
                help,
                source,
            } => {
                let mut debug = f.debug_struct("Coerce");
                debug.field("field", field);

                // Parse errors may quote the offending text.
                if *secret {
                    debug
                        .field("value", &"<redacted>")
                        .field("secret", secret)
                        .field("kind", kind)
                        .field("help", help)
                        .field("source", &"<redacted>")
                        .finish()
                } else {
                    debug
                        .field("value", value)
                        .field("secret", secret)
                        .field("kind", kind)
                        .field("help", help)
                        .field("source", source)
                        .finish()
                }
            }

            Error::TypeMismatch {
                field,
                expected,
                found,
            } => f
                .debug_struct("TypeMismatch")
                .field("field", field)
                .field("expected", expected)
                .field("found", found)
                .finish(),

            Error::Unmarshal { field, source } => f
                .debug_struct("Unmarshal")
                .field("field", field)
                .field("source", source)
                .finish(),

            Error::Required { field, help } => f
                .debug_struct("Required")
                .field("field", field)
                .field("help", help)
                .finish(),

            Error::EmptyDefault { field } => f
                .debug_struct("EmptyDefault")
                .field("field", field)
                .finish(),

            Error::InvalidUtf8 { var } => f.debug_struct("InvalidUtf8").field("var", var).finish(),

            Error::Cancelled => f.write_str("Cancelled"),

            Error::DeadlineExceeded => f.write_str("DeadlineExceeded"),

            Error::Handler { message, source } => f
                .debug_struct("Handler")
                .field("message", message)
                .field("source", source)
                .finish(),

            #[cfg(feature = "dotenv")]
            Error::Dotenv { path, source } => f
                .debug_struct("Dotenv")
                .field("path", path)
                .field("source", source)
                .finish(),

            #[cfg(feature = "clap")]
            Error::Flag { message } => f.debug_struct("Flag").field("message", message).finish(),

            #[cfg(feature = "clap")]
            Error::DuplicateFlag { name } => {
                f.debug_struct("DuplicateFlag").field("name", name).finish()
            }

            #[cfg(feature = "rsa")]
            Error::Secret { field, source } => f
                .debug_struct("Secret")
                .field("field", field)
                .field("source", source)
                .finish(),

            #[cfg(feature = "rsa")]
            Error::Crypto { source } => f.debug_struct("Crypto").field("source", source).finish(),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Coerce { secret: true, .. } => None,
            Error::Coerce { source, .. } => Some(source),
            Error::Unmarshal { source, .. } => Some(source.as_ref()),
            Error::Handler {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            #[cfg(feature = "dotenv")]
            Error::Dotenv { source, .. } => Some(source),
            #[cfg(feature = "rsa")]
            Error::Secret { source, .. } | Error::Crypto { source } => Some(source),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Constructor helpers for ergonomic error creation
// ─────────────────────────────────────────────────────────────────────────────

impl Error {
    /// Creates a Coerce error with help text derived from the kind.
    pub fn coerce(
        field: impl Into<String>,
        value: impl Into<String>,
        secret: bool,
        kind: Kind,
        source: CoerceError,
    ) -> Self {
        let help = match source {
            CoerceError::Overflow { .. } => format!("the value does not fit in {kind}"),
            CoerceError::Unsupported { .. } if kind.is_complex() => {
                format!("{kind} fields can only be set from a typed value")
            }
            CoerceError::Unsupported { .. } => {
                format!("{kind} fields cannot be set from text")
            }
            _ if kind.is_integer() => format!("expected a base 10 {kind}, e.g. \"42\" or \"-7\""),
            _ if kind.is_float() => format!("expected a decimal {kind}, e.g. \"0.25\" or \"1e-3\""),
            _ if kind == Kind::Bool => {
                "expected one of 1, t, T, true, TRUE, True, 0, f, F, false, FALSE, False".to_owned()
            }
            _ => format!("expected a valid {kind}"),
        };

        Error::Coerce {
            field: field.into(),
            value: value.into(),
            secret,
            kind,
            help,
            source,
        }
    }

    /// Creates a Required error with a standard help message.
    pub fn required(field: impl Into<String>) -> Self {
        let field = field.into();
        let help = format!("provide a value for {field} or give it a default");
        Error::Required { field, help }
    }

    /// Creates an error for use in custom handlers and middleware.
    pub fn custom(message: impl Into<String>) -> Self {
        Error::Handler {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an arbitrary error raised by a custom handler.
    pub fn handler(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Handler {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the name of the field this error concerns, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Coerce { field, .. }
            | Error::TypeMismatch { field, .. }
            | Error::Unmarshal { field, .. }
            | Error::Required { field, .. }
            | Error::EmptyDefault { field } => Some(field),
            #[cfg(feature = "rsa")]
            Error::Secret { field, .. } => Some(field),
            _ => None,
        }
    }
}

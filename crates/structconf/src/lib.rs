//! # structconf
//!
//! Populate the fields of your own structs from environment variables,
//! command-line flags, defaults, `.env` files and encrypted secrets, driven
//! by a per-field annotation.
//!
//! A derive macro lists a struct's settable leaf fields, recursing into
//! nested structs. Each field is then resolved by threading a proposed value
//! through an ordered chain of [`Handler`]s, wrapped by [`Middleware`]. The
//! final value is converted to the field's type (with overflow checks) and
//! written in place.
//!
//! ## Quick Start
//!
//! ```rust
//! use structconf::{Context, Settable};
//!
//! #[derive(Settable, Default)]
//! pub struct Config {
//!     #[conf("env:STRUCTCONF_QS_NAME,default:app")]
//!     pub name: String,
//!
//!     #[conf("env:STRUCTCONF_QS_PORT,flag:port,default:8080,usage:listen port")]
//!     pub port: u16,
//!
//!     pub database: Database,
//! }
//!
//! #[derive(Settable, Default)]
//! pub struct Database {
//!     #[conf("env:STRUCTCONF_QS_DB_URL,default:postgres://localhost/app")]
//!     pub url: String,
//! }
//!
//! fn main() -> structconf::Result<()> {
//!     let mut config = Config::default();
//!     structconf::parse(&Context::background(), &mut config)?;
//!     assert_eq!(config.port, 8080);
//!     Ok(())
//! }
//! ```
//!
//! ## Field Annotations
//!
//! | Directive | Description |
//! |-----------|-------------|
//! | `env:NAME` | Read the environment variable `NAME` |
//! | `flag:NAME` | Read the command-line flag `--NAME` (with `clap` feature) |
//! | `default:VALUE` | Use `VALUE` when nothing else set the field |
//! | `required` | Fail if nothing set the field |
//! | `secret` | Decrypt the value (with `rsa` feature) and redact it in errors |
//! | `usage:TEXT` | Help text for the flag |
//!
//! `#[conf(skip)]` excludes a field. Private fields are always skipped.
//!
//! ## Precedence
//!
//! Later sources win: `.env` file, environment, flags, custom handlers,
//! then decryption. Defaults apply only when nothing was resolved and the
//! field still holds its zero value.
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `dotenv` | [`handler::Dotenv`] via [`dotenvy`] | **Yes** |
//! | `clap` | [`handler::Flag`] via [`clap`] | **Yes** |
//! | `rsa` | [`handler::RsaSecret`] (RSA-OAEP, SHA-256) | **Yes** |
//! | `tracing` | Trace events during discovery and resolution | No |
//! | `full` | Enable all features | No |
//!
//! ## Error Handling
//!
//! Every failure is an [`Error`], which integrates with [`miette`]:
//!
//! ```rust,ignore
//! if let Err(e) = structconf::parse(&ctx, &mut config) {
//!     eprintln!("{:?}", miette::Report::from(e));
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Lets the derive's `::structconf::` paths resolve inside this crate.
extern crate self as structconf;

// Re-export the derive macro
pub use structconf_macro::Settable;

/// Re-export miette for error handling.
pub use miette;

/// Re-export num-complex for complex-valued fields.
pub use num_complex;

/// Re-export clap when the feature is enabled.
#[cfg(feature = "clap")]
pub use clap;

/// Re-export dotenvy when the dotenv feature is enabled.
#[cfg(feature = "dotenv")]
pub use dotenvy;

/// Re-export rsa when the feature is enabled.
#[cfg(feature = "rsa")]
pub use rsa;

// ============================================================================
// Core Modules
// ============================================================================

mod error;
pub use error::{BoxError, Error};

/// A Result type that displays errors with miette's fancy formatting.
///
/// ```rust,ignore
/// fn main() -> structconf::Result<()> {
///     structconf::parse(&Context::background(), &mut config)?;
///     Ok(())
/// }
/// ```
pub type Result<T> = miette::Result<T>;

pub mod coerce;
pub mod duration;
pub mod field;
pub mod handler;
pub mod tag;

mod conf;
mod context;
mod discover;
mod kind;
mod middleware;
mod value;

pub use conf::{Conf, ConfBuilder, parse, parse_with};
pub use context::Context;
pub use discover::{Discover, Member, Settable, settable_fields};
pub use field::{BinaryUnmarshaler, Field, FieldValue, SetError, TextUnmarshaler};
pub use handler::{Chain, Handler, HandlerFn, combine_handlers, handler_fn};
pub use kind::Kind;
pub use middleware::{Middleware, MiddlewareFn, middleware_fn, wrap_middleware};
pub use value::Value;

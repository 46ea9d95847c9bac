//! Value resolvers and their composition.
//!
//! A [`Handler`] inspects a [`Field`] and the value proposed so far and
//! returns a new value, or `None` to leave the proposal unchanged. Handlers
//! are combined into a [`Chain`], where each one sees the running value left
//! by the previous one and the first error aborts the rest.
//!
//! # Built-in Handlers
//!
//! | Handler | Directive | Source |
//! |---------|-----------|--------|
//! | [`EnvironmentVariable`] | `env:NAME` | process environment |
//! | [`Dotenv`] | `env:NAME` | a `.env` file (with `dotenv` feature) |
//! | [`Flag`] | `flag:NAME` | command-line arguments (with `clap` feature) |
//! | [`DefaultValue`] | `default:VALUE` | the annotation itself |
//! | [`Required`] | `required` | fails when nothing was resolved |
//! | [`RsaSecret`] | `secret` | decrypts the proposal (with `rsa` feature) |
//!
//! # Custom Handlers
//!
//! Any closure with the right signature becomes a handler through
//! [`handler_fn`]:
//!
//! ```rust
//! use structconf::{Value, handler_fn};
//!
//! let upper = handler_fn(|_ctx, _field, proposed| {
//!     Ok(proposed.and_then(|v| v.as_str().map(|s| Value::from(s.to_uppercase()))))
//! });
//! # let _ = upper;
//! ```

use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use std::sync::Arc;

use crate::{Context, Error, Field, Value};

mod default;
mod env;
mod required;

#[cfg(feature = "dotenv")]
mod dotenv;

#[cfg(feature = "clap")]
mod flag;

#[cfg(feature = "rsa")]
mod secret;

pub use default::DefaultValue;
pub use env::EnvironmentVariable;
pub use required::Required;

#[cfg(feature = "dotenv")]
pub use dotenv::Dotenv;

#[cfg(feature = "clap")]
pub use flag::{Flag, FlagSet};

#[cfg(feature = "rsa")]
pub use secret::{CryptoError, RsaSecret};

/// Resolves a value for one field.
pub trait Handler {
    /// Returns the value to propose for `field`, or `None` to keep
    /// `proposed` as it is.
    ///
    /// # Errors
    ///
    /// Any error aborts resolution of the whole record.
    fn handle(
        &self,
        ctx: &Context,
        field: &Field<'_>,
        proposed: Option<Value>,
    ) -> Result<Option<Value>, Error>;
}

impl<H: Handler + ?Sized> Handler for &H {
    fn handle(
        &self,
        ctx: &Context,
        field: &Field<'_>,
        proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        (**self).handle(ctx, field, proposed)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn handle(
        &self,
        ctx: &Context,
        field: &Field<'_>,
        proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        (**self).handle(ctx, field, proposed)
    }
}

impl<H: Handler + ?Sized> Handler for Rc<H> {
    fn handle(
        &self,
        ctx: &Context,
        field: &Field<'_>,
        proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        (**self).handle(ctx, field, proposed)
    }
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn handle(
        &self,
        ctx: &Context,
        field: &Field<'_>,
        proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        (**self).handle(ctx, field, proposed)
    }
}

/// A [`Handler`] backed by a closure. See [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wraps a closure as a [`Handler`].
pub const fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&Context, &Field<'_>, Option<Value>) -> Result<Option<Value>, Error>,
{
    HandlerFn { f }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Context, &Field<'_>, Option<Value>) -> Result<Option<Value>, Error>,
{
    fn handle(
        &self,
        ctx: &Context,
        field: &Field<'_>,
        proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        (self.f)(ctx, field, proposed)
    }
}

impl<F> Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("HandlerFn")
    }
}

/// Handlers applied in order to a running value.
///
/// The running value starts as the proposal passed to the chain. A handler
/// returning a value replaces it; a handler returning `None` leaves it as it
/// is. The chain returns the final running value.
#[derive(Default)]
pub struct Chain {
    handlers: Vec<Box<dyn Handler>>,
}

impl Chain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler.
    #[must_use]
    pub fn with(mut self, handler: impl Handler + 'static) -> Self {
        self.push(handler);
        self
    }

    /// Appends a handler in place.
    pub fn push(&mut self, handler: impl Handler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if the chain has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Handler for Chain {
    fn handle(
        &self,
        ctx: &Context,
        field: &Field<'_>,
        proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        let mut running = proposed;

        for handler in &self.handlers {
            if let Some(value) = handler.handle(ctx, field, running.clone())? {
                running = Some(value);
            }
        }

        Ok(running)
    }
}

impl Debug for Chain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl FromIterator<Box<dyn Handler>> for Chain {
    fn from_iter<I: IntoIterator<Item = Box<dyn Handler>>>(iter: I) -> Self {
        Self {
            handlers: iter.into_iter().collect(),
        }
    }
}

/// Combines handlers into a [`Chain`], applied in the given order.
pub fn combine_handlers<I>(handlers: I) -> Chain
where
    I: IntoIterator<Item = Box<dyn Handler>>,
{
    handlers.into_iter().collect()
}

//! Default value resolver.

use super::{Handler, handler_fn};
use crate::{Context, Error, Field, Middleware, Value};

/// Supplies the `default` directive when nothing else resolved the field.
///
/// The default applies only if no value has been proposed and the field
/// still holds its zero value, so a value pre-populated by the caller is
/// kept. A `default:` directive with nothing after it is always an error.
///
/// Usable both as a [`Handler`] at the end of a chain and as a
/// [`Middleware`] that runs after the handler it wraps.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValue;

impl DefaultValue {
    /// Fails if the field declares an empty default.
    fn check(field: &Field<'_>) -> Result<Option<&'static str>, Error> {
        match field.lookup_tag("default") {
            Some("") => Err(Error::EmptyDefault {
                field: field.name().to_owned(),
            }),
            other => Ok(other),
        }
    }
}

impl Handler for DefaultValue {
    fn handle(
        &self,
        _ctx: &Context,
        field: &Field<'_>,
        proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        let default = Self::check(field)?;

        if proposed.is_some() || !field.is_zero() {
            return Ok(None);
        }

        #[cfg(feature = "tracing")]
        if default.is_some() {
            tracing::trace!(field = field.name(), "applying default");
        }

        Ok(default.map(Value::from))
    }
}

impl Middleware for DefaultValue {
    fn wrap(&self, next: Box<dyn Handler>) -> Box<dyn Handler> {
        Box::new(handler_fn(move |ctx, field, proposed| {
            Self::check(field)?;

            let value = next.handle(ctx, field, proposed.clone())?.or(proposed);
            if value.is_some() {
                return Ok(value);
            }

            DefaultValue.handle(ctx, field, None)
        }))
    }
}

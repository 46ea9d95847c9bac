//! Required field check.

use super::{Handler, handler_fn};
use crate::{Context, Error, Field, Middleware, Value};

/// Fails for a `required` field that nothing resolved.
///
/// The check passes when a value was proposed or the field holds a
/// non-zero value already.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Handler for Required {
    fn handle(
        &self,
        _ctx: &Context,
        field: &Field<'_>,
        proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        if proposed.is_none() && field.is_zero() && field.lookup_tag("required").is_some() {
            return Err(Error::required(field.name()));
        }

        Ok(None)
    }
}

impl Middleware for Required {
    fn wrap(&self, next: Box<dyn Handler>) -> Box<dyn Handler> {
        Box::new(handler_fn(move |ctx, field, proposed| {
            let value = next.handle(ctx, field, proposed.clone())?.or(proposed);
            Required.handle(ctx, field, value.clone())?;
            Ok(value)
        }))
    }
}

//! Handler wrappers.
//!
//! A [`Middleware`] turns a handler into another handler, typically one
//! that runs code before and after delegating. [`wrap_middleware`] applies
//! a list of middleware so that the first one listed is outermost: it is
//! entered first and left last.

use std::fmt::{self, Debug, Formatter};

use crate::Handler;

/// Wraps a [`Handler`] to produce another.
pub trait Middleware {
    /// Returns a handler that delegates to `next`.
    fn wrap(&self, next: Box<dyn Handler>) -> Box<dyn Handler>;
}

impl<M: Middleware + ?Sized> Middleware for &M {
    fn wrap(&self, next: Box<dyn Handler>) -> Box<dyn Handler> {
        (**self).wrap(next)
    }
}

impl<M: Middleware + ?Sized> Middleware for Box<M> {
    fn wrap(&self, next: Box<dyn Handler>) -> Box<dyn Handler> {
        (**self).wrap(next)
    }
}

/// A [`Middleware`] backed by a closure. See [`middleware_fn`].
#[derive(Clone, Copy)]
pub struct MiddlewareFn<F> {
    f: F,
}

/// Wraps a closure as a [`Middleware`].
///
/// ```rust
/// use structconf::{Handler, Value, handler_fn, middleware_fn};
///
/// let trim = middleware_fn(|next: Box<dyn Handler>| {
///     Box::new(handler_fn(move |ctx, field, proposed| {
///         let value = next.handle(ctx, field, proposed)?;
///         Ok(value.map(|v| match v {
///             Value::String(s) => Value::String(s.trim().to_owned()),
///             other => other,
///         }))
///     })) as Box<dyn Handler>
/// });
/// # let _ = trim;
/// ```
pub const fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: Fn(Box<dyn Handler>) -> Box<dyn Handler>,
{
    MiddlewareFn { f }
}

impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(Box<dyn Handler>) -> Box<dyn Handler>,
{
    fn wrap(&self, next: Box<dyn Handler>) -> Box<dyn Handler> {
        (self.f)(next)
    }
}

impl<F> Debug for MiddlewareFn<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("MiddlewareFn")
    }
}

/// Wraps `handler` in `middleware`, first listed outermost.
///
/// Composition runs right to left so that at call time the middleware are
/// entered left to right and exited right to left.
pub fn wrap_middleware<M>(handler: Box<dyn Handler>, middleware: &[M]) -> Box<dyn Handler>
where
    M: Middleware,
{
    middleware
        .iter()
        .rev()
        .fold(handler, |next, layer| layer.wrap(next))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::{Context, Field, Member, Value, handler_fn};

    type Log = Rc<RefCell<Vec<String>>>;

    fn recording(name: &'static str, log: &Log) -> Box<dyn Middleware> {
        let log = Rc::clone(log);
        Box::new(middleware_fn(move |next: Box<dyn Handler>| {
            let log = Rc::clone(&log);
            Box::new(handler_fn(move |ctx, field, proposed| {
                log.borrow_mut().push(format!("enter {name}"));
                let value = next.handle(ctx, field, proposed);
                log.borrow_mut().push(format!("exit {name}"));
                value
            })) as Box<dyn Handler>
        }))
    }

    #[test]
    fn test_first_listed_is_outermost() {
        let log: Log = Rc::default();
        let inner_log = Rc::clone(&log);
        let inner = Box::new(handler_fn(move |_, _, _| {
            inner_log.borrow_mut().push("handler".to_string());
            Ok(Some(Value::from("v")))
        }));

        let layers = [recording("a", &log), recording("b", &log)];
        let handler = wrap_middleware(inner, &layers);

        let mut slot = String::new();
        let field = Field::new(Member::new("f", None), &mut slot);
        let value = handler
            .handle(&Context::background(), &field, None)
            .unwrap();

        assert_eq!(value, Some(Value::from("v")));
        assert_eq!(
            *log.borrow(),
            ["enter a", "enter b", "handler", "exit b", "exit a"]
        );
    }

    #[test]
    fn test_no_middleware_is_identity() {
        let inner = Box::new(handler_fn(|_, _, _| Ok(Some(Value::from(1_u8)))));
        let handler = wrap_middleware::<Box<dyn Middleware>>(inner, &[]);

        let mut slot = 0_u8;
        let field = Field::new(Member::new("f", None), &mut slot);
        assert_eq!(
            handler.handle(&Context::background(), &field, None).unwrap(),
            Some(Value::from(1_u8))
        );
    }
}

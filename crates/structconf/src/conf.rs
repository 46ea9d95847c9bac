//! Pipeline assembly and the parse entry points.
//!
//! [`Conf`] combines the built-in handlers, any custom handlers and the
//! middleware into a single [`Handler`], then resolves every field of a
//! record through it.
//!
//! # Default Pipeline
//!
//! Handlers run in this order, so later sources override earlier ones:
//!
//! 1. [`Dotenv`] (when configured)
//! 2. [`EnvironmentVariable`]
//! 3. [`Flag`] (when a [`FlagSet`] is configured)
//! 4. custom handlers, in the order added
//! 5. [`RsaSecret`] (when configured)
//!
//! The chain is wrapped by [`Required`] (outermost), then [`DefaultValue`],
//! then custom middleware. On the way out the default is applied before the
//! required check, so a default satisfies `required`.
//!
//! # Example
//!
//! ```rust
//! use structconf::handler::FlagSet;
//! use structconf::{Conf, Context, Settable};
//!
//! #[derive(Settable, Default)]
//! pub struct Config {
//!     #[conf("env:APP_INT,flag:int,default:55")]
//!     pub int: i64,
//! }
//!
//! let conf = Conf::builder()
//!     .flags(FlagSet::new("app").with_args(["--int", "22"]))
//!     .build();
//!
//! let mut config = Config::default();
//! conf.parse(&Context::background(), &mut config)?;
//! assert_eq!(config.int, 22);
//! # Ok::<(), structconf::Error>(())
//! ```

use std::fmt::{self, Debug, Formatter};

#[cfg(feature = "clap")]
use std::rc::Rc;

use crate::handler::{Chain, DefaultValue, EnvironmentVariable, Handler, Required};
use crate::middleware::{Middleware, wrap_middleware};
use crate::{Context, Error, Field, Settable, Value, settable_fields};

#[cfg(feature = "dotenv")]
use crate::handler::Dotenv;

#[cfg(feature = "clap")]
use crate::handler::{Flag, FlagSet};

#[cfg(feature = "rsa")]
use crate::handler::RsaSecret;

/// Builder for [`Conf`].
pub struct ConfBuilder {
    env: Option<EnvironmentVariable>,
    #[cfg(feature = "dotenv")]
    dotenv: Option<Dotenv>,
    #[cfg(feature = "clap")]
    flags: Option<Rc<FlagSet>>,
    handlers: Vec<Box<dyn Handler>>,
    middleware: Vec<Box<dyn Middleware>>,
    #[cfg(feature = "rsa")]
    secret: Option<RsaSecret>,
    builtin_middleware: bool,
}

impl ConfBuilder {
    fn new(defaults: bool) -> Self {
        Self {
            env: defaults.then(EnvironmentVariable::new),
            #[cfg(feature = "dotenv")]
            dotenv: None,
            #[cfg(feature = "clap")]
            flags: None,
            handlers: Vec::new(),
            middleware: Vec::new(),
            #[cfg(feature = "rsa")]
            secret: None,
            builtin_middleware: defaults,
        }
    }

    /// Reads environment variables with `prefix` prepended to every name.
    #[must_use]
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env = Some(EnvironmentVariable::with_prefix(prefix));
        self
    }

    /// Sets the environment resolver.
    #[must_use]
    pub fn env(mut self, env: EnvironmentVariable) -> Self {
        self.env = Some(env);
        self
    }

    /// Stops reading the process environment.
    #[must_use]
    pub fn without_env(mut self) -> Self {
        self.env = None;
        self
    }

    /// Reads `env` directives from a `.env` file before the environment.
    #[cfg(feature = "dotenv")]
    #[must_use]
    pub fn dotenv(mut self, dotenv: Dotenv) -> Self {
        self.dotenv = Some(dotenv);
        self
    }

    /// Resolves `flag` directives from `flags`.
    #[cfg(feature = "clap")]
    #[must_use]
    pub fn flags(mut self, flags: FlagSet) -> Self {
        self.flags = Some(Rc::new(flags));
        self
    }

    /// Resolves `flag` directives from a shared flag set.
    #[cfg(feature = "clap")]
    #[must_use]
    pub fn shared_flags(mut self, flags: Rc<FlagSet>) -> Self {
        self.flags = Some(flags);
        self
    }

    /// Decrypts `secret` fields with `secret`.
    #[cfg(feature = "rsa")]
    #[must_use]
    pub fn secret(mut self, secret: RsaSecret) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Appends a custom handler after the built-in sources.
    #[must_use]
    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Appends a middleware inside the built-in ones.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    /// Assembles the pipeline.
    #[must_use]
    pub fn build(self) -> Conf {
        let mut chain = Chain::new();

        #[cfg(feature = "dotenv")]
        if let Some(dotenv) = self.dotenv {
            chain.push(dotenv);
        }

        if let Some(env) = self.env {
            chain.push(env);
        }

        #[cfg(feature = "clap")]
        let flag = self.flags.map(Flag::new);

        #[cfg(feature = "clap")]
        if let Some(flag) = &flag {
            chain.push(flag.clone());
        }

        for handler in self.handlers {
            chain.push(handler);
        }

        #[cfg(feature = "rsa")]
        if let Some(secret) = self.secret.filter(RsaSecret::has_private_key) {
            chain.push(secret);
        }

        let mut middleware: Vec<Box<dyn Middleware>> = Vec::new();
        if self.builtin_middleware {
            middleware.push(Box::new(Required));
            middleware.push(Box::new(DefaultValue));
        }
        middleware.extend(self.middleware);

        Conf {
            handler: wrap_middleware(Box::new(chain), &middleware),
            #[cfg(feature = "clap")]
            flag,
        }
    }
}

impl Debug for ConfBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfBuilder")
            .field("env", &self.env)
            .field("handlers", &self.handlers.len())
            .field("middleware", &self.middleware.len())
            .field("builtin_middleware", &self.builtin_middleware)
            .finish_non_exhaustive()
    }
}

/// A configured resolution pipeline.
pub struct Conf {
    handler: Box<dyn Handler>,
    #[cfg(feature = "clap")]
    flag: Option<Flag>,
}

impl Conf {
    /// Starts from the default pipeline: environment variables wrapped by
    /// the required and default checks.
    #[must_use]
    pub fn builder() -> ConfBuilder {
        ConfBuilder::new(true)
    }

    /// Starts from an empty pipeline with no handlers and no middleware.
    #[must_use]
    pub fn empty() -> ConfBuilder {
        ConfBuilder::new(false)
    }

    /// The flag set, if one is configured.
    #[cfg(feature = "clap")]
    #[must_use]
    pub fn flag_set(&self) -> Option<&FlagSet> {
        self.flag.as_ref().map(Flag::flag_set)
    }

    /// Resolves every settable field of `record`.
    ///
    /// Fields are resolved one at a time in discovery order. The first
    /// error stops resolution; fields resolved before it keep their new
    /// values.
    ///
    /// # Errors
    ///
    /// Returns the first discovery, flag definition, handler or write
    /// error.
    pub fn parse<T: Settable + ?Sized>(&self, ctx: &Context, record: &mut T) -> Result<(), Error> {
        let mut fields = settable_fields(record)?;

        #[cfg(feature = "clap")]
        if let Some(flag) = &self.flag {
            flag.define_flags(&fields)?;
        }

        resolve_fields(ctx, &mut fields, self.handler.as_ref())
    }
}

impl Handler for Conf {
    fn handle(
        &self,
        ctx: &Context,
        field: &Field<'_>,
        proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        self.handler.handle(ctx, field, proposed)
    }
}

impl Debug for Conf {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conf").finish_non_exhaustive()
    }
}

fn resolve_fields(
    ctx: &Context,
    fields: &mut [Field<'_>],
    handler: &dyn Handler,
) -> Result<(), Error> {
    for field in fields {
        field.parse(ctx, handler)?;
    }
    Ok(())
}

/// Resolves `record` through the default pipeline.
///
/// Equivalent to `Conf::builder().build().parse(ctx, record)`.
///
/// # Errors
///
/// Returns the first discovery, handler or write error.
///
/// # Example
///
/// ```rust
/// use structconf::{Context, Settable};
///
/// #[derive(Settable, Default)]
/// pub struct Config {
///     #[conf("env:STRUCTCONF_DOC_PORT,default:8080")]
///     pub port: u16,
/// }
///
/// let mut config = Config::default();
/// structconf::parse(&Context::background(), &mut config)?;
/// assert_eq!(config.port, 8080);
/// # Ok::<(), structconf::Error>(())
/// ```
pub fn parse<T: Settable + ?Sized>(ctx: &Context, record: &mut T) -> Result<(), Error> {
    Conf::builder().build().parse(ctx, record)
}

/// Resolves `record` through a caller-supplied handler.
///
/// No flags are defined; use [`Conf::parse`] for flag support.
///
/// # Errors
///
/// Returns the first discovery, handler or write error.
pub fn parse_with<T: Settable + ?Sized>(
    ctx: &Context,
    record: &mut T,
    handler: &dyn Handler,
) -> Result<(), Error> {
    let mut fields = settable_fields(record)?;
    resolve_fields(ctx, &mut fields, handler)
}

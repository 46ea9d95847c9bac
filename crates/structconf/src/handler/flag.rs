//! Command-line flag resolver.
//!
//! A [`FlagSet`] collects one long flag per field carrying a `flag`
//! directive and parses the command line once, on first use. The [`Flag`]
//! handler then proposes a field's flag value only if the flag was given
//! explicitly; defaults shown in `--help` never count as a proposal.
//!
//! ```text
//! app --int 22 --name=vikki --verbose --level=false
//! app -int 22                    # single-dash long flags are accepted too
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::ffi::OsString;
use std::rc::Rc;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use super::Handler;
use crate::{Context, Error, Field, Kind, Value};

const REMAINING: &str = "__remaining";
const HELP: &str = "__help";

#[derive(Debug, Default)]
struct State {
    args: Vec<Arg>,
    names: Vec<String>,
    matches: Option<ArgMatches>,
}

/// A set of command-line flags bound to an argument list.
///
/// Parsing happens once: the first call to [`parse`](Self::parse) wins and
/// later calls are no-ops. Flags must be defined before that.
///
/// # Example
///
/// ```rust
/// use structconf::handler::FlagSet;
///
/// let flags = FlagSet::new("app").with_args(["--port", "8080", "-v"]);
/// flags.define_flag("port", "listen port", Some("80"), false)?;
/// flags.define_flag("v", "verbose", None, true)?;
/// flags.parse()?;
///
/// assert!(flags.was_explicitly_set("port"));
/// assert_eq!(flags.value("port").as_deref(), Some("8080"));
/// # Ok::<(), structconf::Error>(())
/// ```
#[derive(Debug)]
pub struct FlagSet {
    name: String,
    args: Option<Vec<OsString>>,
    state: RefCell<State>,
}

impl FlagSet {
    /// Creates a flag set that parses the process arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
            state: RefCell::default(),
        }
    }

    /// Binds the flag set to an explicit argument list, without a program
    /// name.
    #[must_use]
    pub fn with_args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// The program name used in help and error output.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if a flag called `name` has been defined.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.state.borrow().names.iter().any(|n| n == name)
    }

    /// Returns `true` once the arguments have been parsed.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.state.borrow().matches.is_some()
    }

    /// Defines a long flag.
    ///
    /// Boolean flags may be given bare (`--verbose`, meaning `true`) or with
    /// an explicit value (`--verbose=false`). Other flags take exactly one
    /// value, which may be negative. Single-character names are also
    /// accepted as short flags (`-v`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateFlag`] if `name` is already defined, or
    /// [`Error::Flag`] if the arguments were already parsed.
    pub fn define_flag(
        &self,
        name: &str,
        usage: &str,
        default: Option<&str>,
        boolean: bool,
    ) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();

        if state.matches.is_some() {
            return Err(Error::Flag {
                message: format!("flag {name} defined after arguments were parsed"),
            });
        }

        if state.names.iter().any(|n| n == name) {
            return Err(Error::DuplicateFlag {
                name: name.to_owned(),
            });
        }

        let mut arg = Arg::new(name.to_owned())
            .long(name.to_owned())
            .help(usage.to_owned())
            .action(ArgAction::Set)
            .allow_negative_numbers(true);

        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            arg = arg.short(c);
        }

        if boolean {
            arg = arg
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true");
        } else {
            arg = arg.allow_hyphen_values(true);
        }

        if let Some(default) = default {
            arg = arg.default_value(default.to_owned());
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(flag = name, boolean, "defined flag");

        state.args.push(arg);
        state.names.push(name.to_owned());
        Ok(())
    }

    /// Parses the bound arguments. Only the first call has any effect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Flag`] for unknown flags, missing values, or a help
    /// request. Nothing is printed.
    pub fn parse(&self) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        if state.matches.is_some() {
            return Ok(());
        }

        let mut command = Command::new(self.name.clone())
            .no_binary_name(true)
            .disable_help_flag(true)
            .args(state.args.iter().cloned())
            .arg(
                Arg::new(REMAINING)
                    .num_args(0..)
                    .action(ArgAction::Append)
                    .trailing_var_arg(true)
                    .hide(true),
            );

        // Defined flags take precedence over the built-in help switches.
        if let Some(help) = help_arg(&state.names) {
            command = command.arg(help);
        }

        let args = match &self.args {
            Some(args) => args.clone(),
            None => std::env::args_os().skip(1).collect(),
        };
        let args = normalize_single_dash(args, &state.names);

        let matches = command
            .try_get_matches_from(args)
            .map_err(|e| Error::Flag {
                message: e.to_string(),
            })?;

        state.matches = Some(matches);
        Ok(())
    }

    /// Returns `true` if `name` was given on the command line.
    ///
    /// Always `false` before parsing and for undefined flags.
    #[must_use]
    pub fn was_explicitly_set(&self, name: &str) -> bool {
        let state = self.state.borrow();
        if !state.names.iter().any(|n| n == name) {
            return false;
        }

        state
            .matches
            .as_ref()
            .and_then(|m| m.value_source(name))
            .is_some_and(|source| source == ValueSource::CommandLine)
    }

    /// The raw value of `name`, only if it was given on the command line.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<String> {
        if !self.was_explicitly_set(name) {
            return None;
        }

        self.state
            .borrow()
            .matches
            .as_ref()
            .and_then(|m| m.get_one::<String>(name).cloned())
    }

    /// Positional arguments left after the flags.
    #[must_use]
    pub fn remaining(&self) -> Vec<String> {
        self.state
            .borrow()
            .matches
            .as_ref()
            .and_then(|m| m.get_many::<String>(REMAINING))
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    }
}

/// Builds `--help`/`-h` from whichever of the two names is still free.
fn help_arg(names: &[String]) -> Option<Arg> {
    let taken = |name: &str| names.iter().any(|n| n == name);

    let mut arg = Arg::new(HELP).action(ArgAction::Help);
    match (taken("help"), taken("h")) {
        (true, true) => return None,
        (true, false) => arg = arg.short('h'),
        (false, true) => arg = arg.long("help"),
        (false, false) => arg = arg.long("help").short('h'),
    }

    Some(arg)
}

/// Rewrites Go-style `-name` and `-name=value` to `--name` forms for
/// defined multi-character flags. Arguments after `--` are left alone.
fn normalize_single_dash(args: Vec<OsString>, names: &[String]) -> Vec<OsString> {
    let mut terminated = false;

    args.into_iter()
        .map(|arg| {
            if terminated {
                return arg;
            }

            let Some(text) = arg.to_str() else {
                return arg;
            };

            if text == "--" {
                terminated = true;
                return arg;
            }

            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split_once('=').map_or(rest, |(n, _)| n);
                    if name.chars().count() > 1 && names.iter().any(|n| n == name) {
                        OsString::from(format!("-{text}"))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

/// Resolves fields from command-line flags.
///
/// A field takes part if its annotation has a `flag` directive. The flag's
/// help text comes from the `usage` directive and its displayed default from
/// `default`, or from the field's current value when that is non-zero.
#[derive(Debug, Clone)]
pub struct Flag {
    flags: Rc<FlagSet>,
}

impl Flag {
    /// Creates a resolver over `flags`.
    #[must_use]
    pub const fn new(flags: Rc<FlagSet>) -> Self {
        Self { flags }
    }

    /// The underlying flag set.
    #[must_use]
    pub fn flag_set(&self) -> &FlagSet {
        &self.flags
    }

    /// Defines one flag per field with a `flag` directive.
    ///
    /// Flags left over from an earlier pass are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateFlag`] if two of `fields` name the same
    /// flag, or [`Error::Flag`] if the arguments were already parsed.
    pub fn define_flags(&self, fields: &[Field<'_>]) -> Result<(), Error> {
        let mut seen = HashSet::new();

        for field in fields {
            let Some(name) = field.lookup_tag("flag") else {
                continue;
            };

            if !seen.insert(name) {
                return Err(Error::DuplicateFlag {
                    name: name.to_owned(),
                });
            }

            if self.flags.is_defined(name) {
                continue;
            }

            let usage = field.lookup_tag("usage").unwrap_or_default();
            let default = field
                .lookup_tag("default")
                .filter(|d| !d.is_empty())
                .map(str::to_owned)
                .or_else(|| {
                    if field.is_zero() {
                        None
                    } else {
                        field.value().map(|v| v.to_string())
                    }
                });

            self.flags.define_flag(
                name,
                usage,
                default.as_deref(),
                field.kind() == Kind::Bool,
            )?;
        }

        Ok(())
    }
}

impl Handler for Flag {
    fn handle(
        &self,
        _ctx: &Context,
        field: &Field<'_>,
        _proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        let Some(name) = field.lookup_tag("flag") else {
            return Ok(None);
        };

        self.flags.parse()?;

        Ok(self.flags.value(name).map(Value::String))
    }
}

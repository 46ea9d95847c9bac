//! Environment variable resolver.

use std::env::{self, VarError};

use super::Handler;
use crate::{Context, Error, Field, Value};

/// Resolves fields from the process environment.
///
/// Reads the variable named by the field's `env` directive. A variable that
/// is set but empty resolves to an empty string; an unset variable leaves
/// the proposal unchanged.
///
/// # Example
///
/// ```rust
/// use structconf::handler::EnvironmentVariable;
///
/// // Reads NAME for `env:NAME`
/// let plain = EnvironmentVariable::new();
///
/// // Reads APP_NAME for `env:NAME`
/// let prefixed = EnvironmentVariable::with_prefix("APP_");
/// # let _ = (plain, prefixed);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvironmentVariable {
    prefix: Option<String>,
}

impl EnvironmentVariable {
    /// Creates a resolver without a prefix.
    #[must_use]
    pub const fn new() -> Self {
        Self { prefix: None }
    }

    /// Creates a resolver that prepends `prefix` to every variable name.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Returns the variable name with the prefix applied.
    fn full_key(&self, key: &str) -> String {
        self.prefix
            .as_ref()
            .map_or_else(|| key.to_string(), |p| format!("{p}{key}"))
    }
}

impl Handler for EnvironmentVariable {
    fn handle(
        &self,
        _ctx: &Context,
        field: &Field<'_>,
        _proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        let Some(key) = field.lookup_tag("env") else {
            return Ok(None);
        };

        let var = self.full_key(key);

        match env::var(&var) {
            Ok(value) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(field = field.name(), var = %var, "resolved from environment");

                Ok(Some(Value::String(value)))
            }

            Err(VarError::NotPresent) => Ok(None),

            Err(VarError::NotUnicode(_)) => Err(Error::InvalidUtf8 { var }),
        }
    }
}

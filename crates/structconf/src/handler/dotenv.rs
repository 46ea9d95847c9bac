//! Dotenv file resolver.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::Handler;
use crate::{Context, Error, Field, Value};

/// Resolves `env` directives from a `.env` file.
///
/// The file is read once at construction and cached. The process
/// environment is never modified, so placing this handler before
/// [`EnvironmentVariable`](super::EnvironmentVariable) lets real
/// environment variables override the file.
///
/// # Example
///
/// ```rust,no_run
/// use structconf::handler::Dotenv;
///
/// // Missing file is fine
/// let local = Dotenv::from_path_optional(".env.local")?;
///
/// // Missing file is an error
/// let required = Dotenv::from_path("config/.env")?;
/// # let _ = (local, required);
/// # Ok::<(), structconf::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dotenv {
    values: HashMap<String, String>,
    path: Option<PathBuf>,
    prefix: Option<String>,
}

impl Dotenv {
    /// Loads `.env` from the working directory, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dotenv`] if the file exists but cannot be parsed.
    pub fn new() -> Result<Self, Error> {
        Self::from_path_optional(".env")
    }

    /// Loads a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dotenv`] if the file is missing or malformed.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let fail = |source| Error::Dotenv {
            path: path.display().to_string(),
            source,
        };

        let values = dotenvy::from_path_iter(&path)
            .map_err(fail)?
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(fail)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), entries = values.len(), "loaded dotenv file");

        Ok(Self {
            values,
            path: Some(path),
            prefix: None,
        })
    }

    /// Loads a file, returning an empty resolver if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dotenv`] if the file exists but is malformed.
    pub fn from_path_optional(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_path(path)
    }

    /// Parses dotenv content from any reader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dotenv`] if the content is malformed.
    pub fn from_reader(reader: impl Read) -> Result<Self, Error> {
        let values = dotenvy::from_read_iter(reader)
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(|source| Error::Dotenv {
                path: "<reader>".to_string(),
                source,
            })?;

        Ok(Self {
            values,
            path: None,
            prefix: None,
        })
    }

    /// Prepends `prefix` to every looked-up key.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// The file this resolver was loaded from.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lookup_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(p) => format!("{p}{key}"),
            None => key.to_string(),
        }
    }
}

impl Handler for Dotenv {
    fn handle(
        &self,
        _ctx: &Context,
        field: &Field<'_>,
        _proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        let Some(key) = field.lookup_tag("env") else {
            return Ok(None);
        };

        Ok(self
            .values
            .get(&self.lookup_key(key))
            .map(|value| Value::String(value.clone())))
    }
}

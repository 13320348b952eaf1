//! Resource key types.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Scheme token prefixed to every resource key.
pub const RESOURCE_SCHEME: &str = "quay://";

/// Identifier naming one endpoint, optionally with its placeholders filled in.
///
/// A key is the endpoint path with its leading `/` removed and prefixed with
/// [`RESOURCE_SCHEME`], e.g. `/api/v1/repository/{namespace}` becomes
/// `quay://api/v1/repository/{namespace}`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Synthesizes the key for a path (template or concrete).
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        Self(format!("{RESOURCE_SCHEME}{trimmed}"))
    }

    /// Parses a key received from an external caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResourceKey`] when the key does not start with
    /// [`RESOURCE_SCHEME`].
    pub fn parse(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if !key.starts_with(RESOURCE_SCHEME) {
            return Err(Error::InvalidResourceKey {
                key,
                reason: format!("key must start with `{RESOURCE_SCHEME}`"),
            });
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recovers the rooted path named by this key.
    #[must_use]
    pub fn path(&self) -> String {
        let rest = self.0.strip_prefix(RESOURCE_SCHEME).unwrap_or(&self.0);
        if rest.starts_with('/') {
            rest.to_owned()
        } else {
            format!("/{rest}")
        }
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<ResourceKey> for String {
    fn from(value: ResourceKey) -> Self {
        value.0
    }
}

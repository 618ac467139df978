//! Logical backend environments.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which backend a session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Localhost,
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Resolve a user-supplied name. Unrecognized names fall back to
    /// [`Environment::Production`].
    pub fn from_name(name: &str) -> Self {
        Self::lookup(name).unwrap_or(Self::Production)
    }

    /// Strict variant of [`Environment::from_name`]; `None` for unknown names.
    pub fn lookup(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "localhost" => Some(Self::Localhost),
            "development" => Some(Self::Development),
            "production" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Localhost => "localhost",
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// Built-in base URL, used when the config file has no override.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Localhost => "http://localhost:3000/api/v1/templates",
            Self::Development => "https://dev-api.stencil.app/api/v1/templates",
            Self::Production => "https://api.stencil.app/api/v1/templates",
        }
    }

    pub fn all() -> &'static [Environment] {
        &[Self::Localhost, Self::Development, Self::Production]
    }
}

impl FromStr for Environment {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

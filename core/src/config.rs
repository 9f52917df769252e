//! Client configuration from `TLY_*` environment variables.
//!
//! - `TLY_API_KEY` (required) - bearer token sent on every request
//! - `TLY_BASE_URL` (optional) - defaults to `https://api.t.ly`

use std::fmt;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.t.ly";

#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
        }
    }

    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("TLY_").from_env()
    }

    /// Like `from_env`, over an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("TLY_").from_iter(vars)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

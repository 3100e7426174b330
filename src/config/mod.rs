// ABOUTME: Configuration types and parsing for saltrun.yml.
// ABOUTME: Handles YAML parsing, file discovery, and destination merging.

mod env_value;

pub use env_value::EnvValue;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "saltrun.yml";
pub const CONFIG_FILENAME_ALT: &str = "saltrun.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".saltrun/config.yml";

pub const DEFAULT_HOST: &str = "https://localhost";
pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_EAUTH: &str = "ldap";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_eauth")]
    pub eauth: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<EnvValue>,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,
}

/// Named salt master with its own connection settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Destination {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub eauth: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<EnvValue>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_eauth() -> String {
    DEFAULT_EAUTH.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: default_host(),
            port: default_port(),
            eauth: default_eauth(),
            username: None,
            password: None,
            timeout: None,
            destinations: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first config file found in `dir`, or defaults if there is none.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("using config file {}", path.display());
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref host) = dest.host {
            merged.host = host.clone();
        }

        if let Some(port) = dest.port {
            merged.port = port;
        }

        if let Some(ref eauth) = dest.eauth {
            merged.eauth = eauth.clone();
        }

        // Credentials belong to the destination they were given for
        if dest.username.is_some() {
            merged.username = dest.username.clone();
            merged.password = dest.password.clone();
        } else if dest.password.is_some() {
            merged.password = dest.password.clone();
        }

        Ok(merged)
    }

    /// Resolve the configured password, if any.
    pub fn resolve_password(&self) -> Result<Option<String>> {
        self.password.as_ref().map(EnvValue::resolve).transpose()
    }
}

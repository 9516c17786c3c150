use crate::endpoints::DEFAULT_API_BASE;
use std::{collections::HashMap, env, time::Duration};

/// Secret holding the analytics API token.
pub const TOKEN_KEY: &str = "TINYBIRD_TOKEN";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_base: String,
    pub cache_ttl: Duration,
    pub send_auth: bool,
    pub http_timeout: Option<Duration>,
    pub donut_inner_radius: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            api_base: DEFAULT_API_BASE.to_string(),
            cache_ttl: Duration::from_secs(60),
            send_auth: true,
            http_timeout: None,
            donut_inner_radius: 50,
        }
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            api_base: lookup("TINYBIRD_API_BASE")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.api_base),
            cache_ttl: parsed(&lookup, "DASHBOARD_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            send_auth: lookup("DASHBOARD_SEND_AUTH")
                .and_then(|value| parse_flag(&value))
                .unwrap_or(defaults.send_auth),
            http_timeout: parsed(&lookup, "DASHBOARD_HTTP_TIMEOUT_SECS").map(Duration::from_secs),
            donut_inner_radius: parsed(&lookup, "DASHBOARD_DONUT_INNER_RADIUS")
                .unwrap_or(defaults.donut_inner_radius),
        }
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse::<T>().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Source of named secrets. Only the fetch step asks for credentials.
pub trait CredentialProvider: Send + Sync {
    fn credential(&self, name: &str) -> Option<String>;
}

/// Secrets from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn credential(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.is_empty())
    }
}

/// Fixed in-memory secrets.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CredentialProvider for StaticCredentials {
    fn credential(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

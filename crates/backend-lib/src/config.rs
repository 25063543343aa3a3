// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Application settings.
///
/// Constructed once at startup and shared immutably through `AppState`;
/// nothing reads configuration from ambient globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level / env-filter directive
    pub log_level: String,
    /// HMAC secret for access-token signing
    pub secret_key: String,
    /// Access token TTL in minutes
    pub access_token_ttl_mins: i64,
    /// Refresh token TTL in days
    pub refresh_token_ttl_days: i64,
    /// Cursor pagination bounds
    pub pagination: PaginationSettings,
    /// Password policy
    pub password: PasswordRequirements,
}

/// Cursor pagination bounds for todo listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// Page size used when the request does not specify one
    pub default_limit: usize,
    /// Upper bound; larger requested limits are clamped to this
    pub max_limit: usize,
}

/// Password policy applied at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRequirements {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().expect("static addr"),
            log_level: "info".to_string(),
            secret_key: "dev-secret-change-me".to_string(),
            access_token_ttl_mins: 30,
            refresh_token_ttl_days: 7,
            pagination: PaginationSettings::default(),
            password: PasswordRequirements::default(),
        }
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        // Permissive by default: only empty passwords are rejected.
        // Deployments tighten this through configuration.
        Self {
            min_length: 1,
            max_length: 128,
        }
    }
}

impl Settings {
    /// Load settings from config files and `FLOWTODO_*` environment
    /// variables, layered over the built-in defaults.
    pub fn load() -> Result<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("flowtodo.toml"))
            .merge(Yaml::file("flowtodo.yaml"))
            .merge(Json::file("flowtodo.json"))
            .merge(Env::prefixed("FLOWTODO_").split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from an explicit TOML file, still honouring env vars.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("FLOWTODO_").split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations that cannot produce a working server.
    pub fn validate(&self) -> Result<()> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {},
            other if other.contains('=') => {}, // env-filter directive
            other => bail!("invalid log level: {other}"),
        }
        if self.secret_key.is_empty() {
            bail!("secret_key must not be empty");
        }
        if self.access_token_ttl_mins <= 0 {
            bail!("access_token_ttl_mins must be positive");
        }
        if self.refresh_token_ttl_days <= 0 {
            bail!("refresh_token_ttl_days must be positive");
        }
        if self.pagination.default_limit == 0
            || self.pagination.default_limit > self.pagination.max_limit
        {
            bail!("pagination.default_limit must be in 1..=max_limit");
        }
        if self.password.min_length == 0 || self.password.min_length > self.password.max_length {
            bail!("password.min_length must be in 1..=max_length");
        }
        Ok(())
    }
}

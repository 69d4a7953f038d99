use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::DEFAULT_LOGIN_PATH;
use crate::clients::DEFAULT_ART_BUCKET;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set for the hosted backend")]
    Missing(&'static str),
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("Failed to load pricing rules from {path}: {reason}")]
    PricingRules { path: String, reason: String },
}

/// Which platform the portal talks to.
#[derive(Clone, PartialEq)]
pub enum BackendConfig {
    Hosted { url: String, anon_key: String },
    /// Process-local tables. `pricing_rules` is a JSON file of rows loaded
    /// into `pricing_rules` at startup.
    Memory { pricing_rules: Option<PathBuf> },
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendConfig::Hosted { url, .. } => f
                .debug_struct("Hosted")
                .field("url", url)
                .finish_non_exhaustive(),
            BackendConfig::Memory { pricing_rules } => f
                .debug_struct("Memory")
                .field("pricing_rules", pricing_rules)
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend: BackendConfig,
    pub port: u16,
    pub art_bucket: String,
    pub login_path: String,
}

impl Config {
    /// Read `.env` (if any), then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match try_load::<String>(&lookup, "PORTAL_BACKEND", "hosted")?
            .to_ascii_lowercase()
            .as_str()
        {
            "hosted" => BackendConfig::Hosted {
                url: require(&lookup, "SUPABASE_URL")?,
                anon_key: require(&lookup, "SUPABASE_ANON_KEY")?,
            },
            "memory" => BackendConfig::Memory {
                pricing_rules: optional(&lookup, "PORTAL_PRICING_RULES").map(PathBuf::from),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "PORTAL_BACKEND",
                    value: other.to_string(),
                    reason: "expected hosted or memory".to_string(),
                })
            }
        };

        let login_path: String = try_load(&lookup, "PORTAL_LOGIN_PATH", DEFAULT_LOGIN_PATH)?;
        if !login_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                key: "PORTAL_LOGIN_PATH",
                value: login_path,
                reason: "must start with /".to_string(),
            });
        }

        Ok(Self {
            backend,
            port: try_load(&lookup, "PORTAL_PORT", "3000")?,
            art_bucket: try_load(&lookup, "PORTAL_ART_BUCKET", DEFAULT_ART_BUCKET)?,
            login_path,
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<String, ConfigError> {
    match lookup(key).map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => {
            warn!("{key} not set");
            Err(ConfigError::Missing(key))
        }
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Option<String> {
    let value = lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
    if value.is_none() {
        info!("{key} not set");
    }
    value
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: value.clone(),
            reason: e.to_string(),
        }
    })
}

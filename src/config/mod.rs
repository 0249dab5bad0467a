//! Configuration module for the vault backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to Tantivy search index directory
    pub index_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Whether new accounts may be created
    pub allow_signup: bool,
    /// Per-user document limit
    pub max_documents: i64,
    /// Session lifetime in hours
    pub session_ttl_hours: i64,
    /// Request body ceiling in bytes
    pub max_body_bytes: usize,
}

/// A configuration variable that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value for {}: {:?}", self.variable, self.value)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("VAULT_DB_PATH")
            .unwrap_or_else(|| "./data/vault.sqlite".to_string())
            .into();

        let index_path = lookup("VAULT_INDEX_PATH")
            .unwrap_or_else(|| "./data/index".to_string())
            .into();

        let bind_addr = parse_or(&lookup, "VAULT_BIND_ADDR", "127.0.0.1:8080".parse().ok())?;

        let log_level = lookup("VAULT_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_format = match lookup("VAULT_LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError {
                    variable: "VAULT_LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        let allow_signup = match lookup("VAULT_ALLOW_SIGNUP") {
            None => true,
            Some(raw) => parse_bool(&raw).ok_or(ConfigError {
                variable: "VAULT_ALLOW_SIGNUP",
                value: raw,
            })?,
        };

        let max_documents = parse_or(&lookup, "VAULT_MAX_DOCUMENTS", Some(1000))?;
        let session_ttl_hours = parse_or(&lookup, "VAULT_SESSION_TTL_HOURS", Some(168))?;
        let max_body_bytes = parse_or(&lookup, "VAULT_MAX_BODY_BYTES", Some(5 * 1024 * 1024))?;

        Ok(Self {
            db_path,
            index_path,
            bind_addr,
            log_level,
            log_format,
            allow_signup,
            max_documents,
            session_ttl_hours,
            max_body_bytes,
        })
    }
}

fn parse_or<F, T>(lookup: &F, variable: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(variable) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError {
            variable,
            value: raw,
        }),
        None => default.ok_or(ConfigError {
            variable,
            value: String::new(),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

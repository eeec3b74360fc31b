//! # Configuration Management
//!
//! Centralized configuration for the rcon protocol library.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-variable overrides via `from_env()`
//!
//! ## Security Considerations
//! - The server password is the shared secret for every level; with no
//!   password set, remote administration is off and every request is dropped.
//! - The minimum security level is the anti-downgrade floor. The shipped
//!   default (`0`, unencrypted allowed) mirrors the classic protocol; raise
//!   it to `2` on anything reachable from untrusted networks.

use crate::core::message::SecurityLevel;
use crate::error::{RconError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Default port of the governed service.
pub const DEFAULT_PORT: u16 = 27960;

/// Immutable policy snapshot captured at the start of evaluating one
/// datagram. Keeps `acceptable` a pure function of message, policy, and
/// registry state rather than of hidden shared configuration.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Weakest security level the server will execute.
    pub min_level: SecurityLevel,
    /// Configured shared secret. Empty means rcon is disabled.
    pub password: String,
}

/// Main configuration structure containing all configurable settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RconConfig {
    /// Server-side settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Client-side settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RconConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| RconError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| RconError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| RconError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("RCON_SERVER_ADDRESS") {
            config.server.address = addr;
        }

        if let Ok(password) = std::env::var("RCON_SERVER_PASSWORD") {
            config.server.password = password;
        }

        if let Ok(level) = std::env::var("RCON_SERVER_SECURE") {
            let parsed = level
                .parse::<u8>()
                .map_err(|_| RconError::ConfigError(format!("Invalid security level: {level}")))?;
            config.server.secure = SecurityLevel::try_from(parsed)
                .map_err(|_| RconError::ConfigError(format!("Invalid security level: {level}")))?;
        }

        if let Ok(dest) = std::env::var("RCON_CLIENT_DESTINATION") {
            config.client.destination = dest;
        }

        if let Ok(password) = std::env::var("RCON_CLIENT_PASSWORD") {
            config.client.password = password;
        }

        if let Ok(timeout) = std::env::var("RCON_RESPONSE_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.client.response_timeout = Duration::from_millis(val);
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration.
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Snapshot the server policy for evaluating one datagram.
    pub fn policy(&self) -> Policy {
        Policy {
            min_level: self.server.secure,
            password: self.server.password.clone(),
        }
    }

    /// Validate the configuration for common issues and misconfigurations.
    ///
    /// Returns a list of validation errors. Empty list means configuration
    /// is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.server.validate());
        errors.extend(self.client.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method.
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(RconError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Server-side configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// UDP listen address (e.g., "0.0.0.0:27960")
    pub address: String,

    /// Password protecting the remote console. Empty disables rcon.
    pub password: String,

    /// Minimum acceptable security level:
    /// 0 allows unencrypted, 1 requires encryption, 2 also requires a
    /// challenge check.
    #[serde(with = "security_level_serde")]
    pub secure: SecurityLevel,

    /// Lifetime of an issued challenge
    #[serde(with = "duration_serde")]
    pub challenge_ttl: Duration,

    /// Maximum outstanding challenges across all addresses
    pub max_challenges: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: format!("0.0.0.0:{DEFAULT_PORT}"),
            password: String::new(),
            secure: SecurityLevel::Unencrypted,
            challenge_ttl: Duration::from_secs(60),
            max_challenges: 10_000,
        }
    }
}

impl ServerConfig {
    /// Validate server configuration.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push("Server address cannot be empty".to_string());
        } else if self.address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "Invalid server address format: '{}' (expected format: '0.0.0.0:27960')",
                self.address
            ));
        }

        if self.password.is_empty() {
            errors.push(
                "WARNING: No server password set - all rcon requests will be rejected".to_string(),
            );
        }

        if self.secure == SecurityLevel::Unencrypted && !self.password.is_empty() {
            errors.push(
                "WARNING: Unencrypted rcon allowed - not recommended outside trusted networks"
                    .to_string(),
            );
        }

        if self.challenge_ttl.as_secs() < 1 {
            errors.push("Challenge TTL too short (minimum: 1s)".to_string());
        } else if self.challenge_ttl.as_secs() > 3600 {
            errors.push("Challenge TTL too long (maximum: 1 hour)".to_string());
        }

        if self.max_challenges == 0 {
            errors.push("Max challenges must be greater than 0".to_string());
        }

        errors
    }
}

/// Client-side configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Destination address for rcon commands
    pub destination: String,

    /// Password presented with each command
    pub password: String,

    /// Security level to compose requests at
    #[serde(with = "security_level_serde")]
    pub secure: SecurityLevel,

    /// Timeout for waiting on a challenge response
    #[serde(with = "duration_serde")]
    pub response_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            destination: format!("127.0.0.1:{DEFAULT_PORT}"),
            password: String::new(),
            secure: SecurityLevel::EncryptedChallenge,
            response_timeout: Duration::from_secs(3),
        }
    }
}

impl ClientConfig {
    /// Validate client configuration.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.destination.is_empty() {
            errors.push("Client destination cannot be empty".to_string());
        } else if self.destination.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "Invalid client destination format: '{}' (expected format: 'host:27960')",
                self.destination
            ));
        }

        if self.response_timeout.as_millis() < 100 {
            errors.push("Response timeout too short (minimum: 100ms)".to_string());
        } else if self.response_timeout.as_secs() > 60 {
            errors.push("Response timeout too long (maximum: 60s)".to_string());
        }

        errors
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("rcon-protocol"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization (milliseconds).
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for SecurityLevel serialization as its configured integer.
mod security_level_serde {
    use crate::core::message::SecurityLevel;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(level: &SecurityLevel, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match level.rank() {
            Some(rank) => rank.serialize(serializer),
            None => Err(serde::ser::Error::custom(
                "Security level outside configured range",
            )),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecurityLevel, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rank = u8::deserialize(deserializer)?;
        SecurityLevel::try_from(rank)
            .map_err(|_| serde::de::Error::custom(format!("Invalid security level: {rank}")))
    }
}

/// Helper module for tracing::Level serialization/deserialization.
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}

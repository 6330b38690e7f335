//! Configuration for building [`Webhooks`] instances.
//!
//! # Example (YAML)
//!
//! ```yaml
//! public_key:
//!   type: file
//!   path: /etc/paddle/public_key.pem
//! ```
//!
//! # Example (environment)
//!
//! ```text
//! PADDLE_ALERTS__WEBHOOKS__PUBLIC_KEY__TYPE=literal
//! PADDLE_ALERTS__WEBHOOKS__PUBLIC_KEY__PEM="-----BEGIN PUBLIC KEY-----..."
//! ```

use crate::error::ConstructionError;
use crate::webhook::Webhooks;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Where the provider's public key comes from.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PublicKeySource {
    /// PEM text embedded in the configuration. Excluded from `Debug` output.
    Literal { pem: String },

    /// PEM file on disk, read when the instance is built.
    File { path: PathBuf },
}

impl PublicKeySource {
    /// Check the source without touching the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Literal { pem } if pem.trim().is_empty() => Err(ConfigError::EmptyPublicKey),
            Self::File { path } if path.as_os_str().is_empty() => Err(ConfigError::EmptyKeyPath),
            _ => Ok(()),
        }
    }

    /// Read the PEM bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::KeyUnreadable`] when the file cannot be read.
    pub fn load(&self) -> Result<Vec<u8>, ConstructionError> {
        match self {
            Self::Literal { pem } => Ok(pem.as_bytes().to_vec()),
            Self::File { path } => {
                std::fs::read(path).map_err(|e| ConstructionError::KeyUnreadable {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }
        }
    }
}

impl std::fmt::Debug for PublicKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal { .. } => f
                .debug_struct("PublicKeySource::Literal")
                .field("pem", &"<REDACTED>")
                .finish(),
            Self::File { path } => f
                .debug_struct("PublicKeySource::File")
                .field("path", path)
                .finish(),
        }
    }
}

/// Settings for alert verification.
///
/// Call [`WebhooksConfig::validate`] at startup, then [`WebhooksConfig::build`].
///
/// # Examples
///
/// ```rust
/// use paddle_alerts_core::config::{PublicKeySource, WebhooksConfig};
///
/// let config = WebhooksConfig {
///     public_key: PublicKeySource::File {
///         path: "/etc/paddle/public_key.pem".into(),
///     },
/// };
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WebhooksConfig {
    pub public_key: PublicKeySource,
}

impl WebhooksConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.public_key.validate()
    }

    /// Validate, load the key and build a [`Webhooks`] instance.
    pub fn build(&self) -> Result<Webhooks, ConfigError> {
        self.validate()?;
        let pem = self.public_key.load()?;
        let webhooks = Webhooks::new(&pem)?;
        debug!(public_key = ?self.public_key, "Webhooks built from configuration");
        Ok(webhooks)
    }
}

impl Webhooks {
    /// Build an instance from configuration.
    pub fn from_config(config: &WebhooksConfig) -> Result<Self, ConfigError> {
        config.build()
    }
}

/// Invalid webhook configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("public_key: inline PEM is empty")]
    EmptyPublicKey,

    #[error("public_key: file path is empty")]
    EmptyKeyPath,

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

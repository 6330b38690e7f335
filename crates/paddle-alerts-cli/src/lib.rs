//! # Paddle Alerts CLI
//!
//! Command-line interface for checking captured Paddle alert deliveries.
//!
//! This module provides CLI commands for:
//! - Verifying and decoding a captured alert body
//! - Printing the canonical string that Paddle signs
//! - Checking that the configured public key is usable

use clap::{Parser, Subcommand};
use paddle_alerts_core::config::ConfigError as WebhooksConfigError;
use paddle_alerts_core::verification::RsaSha1Verifier;
use paddle_alerts_core::{
    canonicalize, Alert, ConstructionError, FormFields, PublicKeySource, WebhookError,
    WebhooksConfig, FORM_CONTENT_TYPE,
};
use sha1::{Digest, Sha1};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "PADDLE_ALERTS";

// ============================================================================
// CLI Structure
// ============================================================================

/// Paddle Alerts CLI - verify and decode signed webhook alerts
#[derive(Parser)]
#[command(name = "paddle-alerts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify and decode signed Paddle webhook alerts")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PADDLE_ALERTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// PEM file with the Paddle public key, overrides the configuration
    #[arg(short = 'k', long)]
    pub public_key: Option<PathBuf>,

    /// Logging level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Verify a captured alert body and print the decoded alert
    Verify {
        /// File with the URL-encoded body, or `-` for stdin
        #[arg(short, long)]
        body: PathBuf,

        /// Content-Type the body was delivered with
        #[arg(long, default_value = FORM_CONTENT_TYPE)]
        content_type: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the canonical string of a body and its SHA-1 digest
    Canonicalize {
        /// File with the URL-encoded body, or `-` for stdin
        #[arg(short, long)]
        body: PathBuf,
    },

    /// Load the configured public key and report its size
    CheckKey,
}

/// Output format options
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

// ============================================================================
// CLI Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Alert rejected: {0}")]
    Rejected(#[from] WebhookError),

    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 1,
            Self::Rejected(_) => 2,
            Self::Io(_) | Self::CommandFailed { .. } => 3,
            Self::InvalidArgument { .. } => 4,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    InvalidFormat(#[from] config::ConfigError),

    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },

    #[error(transparent)]
    Webhooks(#[from] WebhooksConfigError),
}

impl From<ConstructionError> for ConfigError {
    fn from(e: ConstructionError) -> Self {
        Self::Webhooks(WebhooksConfigError::Construction(e))
    }
}

// ============================================================================
// Configuration Types
// ============================================================================

/// Settings loaded from the configuration file and environment.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub webhooks: Option<WebhooksConfig>,
}

impl CliConfig {
    /// Key source to use, preferring an explicit key file.
    pub fn public_key_source(
        &self,
        override_path: Option<&Path>,
    ) -> Result<PublicKeySource, ConfigError> {
        if let Some(path) = override_path {
            return Ok(PublicKeySource::File {
                path: path.to_path_buf(),
            });
        }

        self.webhooks
            .as_ref()
            .map(|webhooks| webhooks.public_key.clone())
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "webhooks.public_key".to_string(),
            })
    }

    /// Resolved webhook settings, validated.
    pub fn webhooks_config(&self, override_path: Option<&Path>) -> Result<WebhooksConfig, ConfigError> {
        let config = WebhooksConfig {
            public_key: self.public_key_source(override_path)?,
        };
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    // Initialize logging
    initialize_logging(&cli.log_level, cli.json_logs)?;

    // Load configuration
    let config = load_configuration(cli.config.as_deref())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    // Execute command
    match cli.command {
        Commands::Verify {
            body,
            content_type,
            format,
        } => execute_verify_command(
            &config,
            cli.public_key.as_deref(),
            &body,
            &content_type,
            format,
            &mut out,
        ),
        Commands::Canonicalize { body } => execute_canonicalize_command(&body, &mut out),
        Commands::CheckKey => execute_check_key_command(&config, cli.public_key.as_deref(), &mut out),
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn initialize_logging(level: &str, json: bool) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| CliError::InvalidArgument {
            arg: "--log-level".to_string(),
            message: e.to_string(),
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| CliError::CommandFailed {
        message: format!("Failed to initialize logging: {}", e),
    })
}

/// Load configuration from an optional file, then `PADDLE_ALERTS__*`
/// environment variables (double-underscore separator).
///
/// e.g. `PADDLE_ALERTS__WEBHOOKS__PUBLIC_KEY__PATH=/etc/paddle/key.pem`
pub fn load_configuration(config_path: Option<&Path>) -> Result<CliConfig, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = config_path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), "Loading configuration file");
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let config = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()?;

    Ok(config)
}

// ============================================================================
// Command Implementations
// ============================================================================

pub fn execute_verify_command(
    config: &CliConfig,
    public_key: Option<&Path>,
    body_path: &Path,
    content_type: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let webhooks = config.webhooks_config(public_key)?.build().map_err(ConfigError::from)?;
    let body = read_body(body_path)?;

    let alert = match webhooks.parse_form(Some(content_type), &body) {
        Ok(alert) => alert,
        Err(e) => {
            warn!(
                stage = %e.stage(),
                category = %e.error_category(),
                "Captured alert rejected"
            );
            return Err(e.into());
        }
    };

    info!(
        alert_name = %alert.kind(),
        alert_id = alert.alert_id(),
        "Captured alert verified"
    );
    write_alert(&alert, format, out)
}

pub fn execute_canonicalize_command(body_path: &Path, out: &mut dyn Write) -> Result<(), CliError> {
    let body = read_body(body_path)?;
    let fields = FormFields::parse(&body);
    let canonical = canonicalize(&fields);
    let digest = Sha1::digest(&canonical);

    out.write_all(&canonical)?;
    writeln!(out)?;
    writeln!(out, "sha1: {}", hex::encode(digest))?;
    Ok(())
}

pub fn execute_check_key_command(
    config: &CliConfig,
    public_key: Option<&Path>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let source = config.webhooks_config(public_key)?.public_key;
    let pem = source.load().map_err(ConfigError::from)?;
    let verifier = RsaSha1Verifier::from_pem(&pem).map_err(ConfigError::from)?;

    info!(source = ?source, "Public key loaded");
    writeln!(out, "RSA public key, {} bits", verifier.key_size_bits())?;
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Read a captured body from a file or stdin (`-`).
///
/// A single trailing line break, as left by editors and `echo`, is dropped.
pub fn read_body(path: &Path) -> Result<Vec<u8>, CliError> {
    let mut body = Vec::new();
    if path == Path::new("-") {
        std::io::stdin().read_to_end(&mut body)?;
    } else {
        body = std::fs::read(path).map_err(|e| CliError::InvalidArgument {
            arg: "--body".to_string(),
            message: format!("{}: {}", path.display(), e),
        })?;
    }

    if body.ends_with(b"\r\n") {
        body.truncate(body.len() - 2);
    } else if body.ends_with(b"\n") {
        body.truncate(body.len() - 1);
    }
    Ok(body)
}

fn write_alert(alert: &Alert, format: OutputFormat, out: &mut dyn Write) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(alert).map_err(|e| CliError::CommandFailed {
                message: format!("Failed to serialize alert: {}", e),
            })?;
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(alert).map_err(|e| CliError::CommandFailed {
                message: format!("Failed to serialize alert: {}", e),
            })?;
            write!(out, "{}", yaml)?;
        }
        OutputFormat::Text => {
            writeln!(out, "alert_name: {}", alert.kind())?;
            writeln!(out, "alert_id: {}", alert.alert_id())?;
            writeln!(
                out,
                "subscription_id: {}",
                alert.subscription_id().unwrap_or_default()
            )?;
            if let Some(event_time) = alert.event_time() {
                writeln!(out, "event_time: {}", event_time.to_rfc3339())?;
            }
            if let Some(passthrough) = alert.passthrough() {
                writeln!(out, "passthrough: {}", passthrough)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

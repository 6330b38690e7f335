//! Error types for alert verification and decoding.
//!
//! Construction-time failures ([`ConstructionError`]) are kept apart from
//! per-request failures ([`WebhookError`]) so that a misconfigured key is
//! caught once at startup and never surfaces while handling a delivery.

use crate::webhook::ProcessingStage;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while building a verifier from public key material.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// No `-----BEGIN ...-----` block was found in the supplied bytes.
    #[error("Failed to locate public key PEM block")]
    MissingPemBlock,

    /// The PEM block was found but the key inside could not be parsed.
    #[error("Failed to parse public key: {message}")]
    InvalidPublicKey { message: String },

    /// The key parsed but uses an algorithm other than RSA.
    #[error("Invalid key format, expected RSA public key")]
    NotRsaKey,

    /// The key file could not be read.
    #[error("Failed to read public key from {path}: {message}")]
    KeyUnreadable { path: PathBuf, message: String },
}

/// Structural failures while populating a supported alert variant.
///
/// Values that merely fail a registered conversion (an unknown status, an
/// unparseable date) are not errors; those attributes keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldDecodeError {
    /// A numeric attribute carried text that is not an integer of the
    /// attribute's width.
    #[error("Invalid integer for field '{field}': '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    /// A boolean attribute carried text outside the accepted spellings.
    #[error("Invalid boolean for field '{field}': '{value}'")]
    InvalidBoolean { field: &'static str, value: String },
}

impl FieldDecodeError {
    /// Name of the form field that failed to decode.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidInteger { field, .. } => field,
            Self::InvalidBoolean { field, .. } => field,
        }
    }
}

/// Terminal rejection of a single webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The request did not declare the URL-encoded form media type.
    #[error("Webhook request has unsupported Content-Type: '{content_type}'")]
    UnsupportedContentType { content_type: String },

    /// The `p_signature` field is not valid base64.
    #[error("Failed to decode the signature: {message}")]
    BadSignatureEncoding { message: String },

    /// The signature did not validate against the configured key.
    #[error("Signature verification failed")]
    SignatureInvalid,

    /// The `alert_name` is not known to this system at all.
    #[error("Unknown alert_name: '{alert_name}'")]
    UnknownAlertType { alert_name: String },

    /// The `alert_name` is defined by the provider but intentionally not decoded.
    #[error("Alert type not implemented: '{alert_name}'")]
    NotImplemented { alert_name: String },

    /// A supported alert could not be populated from the verified fields.
    #[error("Failed to decode the form values: {0}")]
    FieldDecode(#[from] FieldDecodeError),
}

impl WebhookError {
    /// The last stage the request reached before it was rejected.
    pub fn stage(&self) -> ProcessingStage {
        match self {
            Self::UnsupportedContentType { .. } => ProcessingStage::ReceivedRequest,
            Self::BadSignatureEncoding { .. } => ProcessingStage::ContentTypeChecked,
            Self::SignatureInvalid => ProcessingStage::FieldsExtracted,
            Self::UnknownAlertType { .. } => ProcessingStage::Dispatched,
            Self::NotImplemented { .. } => ProcessingStage::Dispatched,
            Self::FieldDecode(_) => ProcessingStage::Dispatched,
        }
    }

    /// Get error category for monitoring
    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedContentType { .. } => ErrorCategory::Client,
            Self::BadSignatureEncoding { .. } => ErrorCategory::Security,
            Self::SignatureInvalid => ErrorCategory::Security,
            Self::UnknownAlertType { .. } => ErrorCategory::Unsupported,
            Self::NotImplemented { .. } => ErrorCategory::Unsupported,
            Self::FieldDecode(_) => ErrorCategory::Client,
        }
    }

    /// Whether the rejection points at a forged or tampered delivery.
    pub fn is_security_failure(&self) -> bool {
        self.error_category() == ErrorCategory::Security
    }

    /// Check if error is transient and should be retried.
    ///
    /// Always `false`: the outcome depends only on the body and the key.
    pub fn is_transient(&self) -> bool {
        false
    }
}

/// Coarse classification of [`WebhookError`] values for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Possible forgery or tampering.
    Security,
    /// Malformed request from the sender.
    Client,
    /// Well-formed, authentic alert of a type this system does not decode.
    Unsupported,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Security => "security",
            Self::Client => "client",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

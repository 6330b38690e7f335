//! Webhook entry point.
//!
//! Runs a single delivery through the processing stages:
//!
//! ```text
//! ReceivedRequest -> ContentTypeChecked -> FieldsExtracted
//!                 -> SignatureVerified -> Dispatched -> Done
//! ```
//!
//! Any stage may reject the request. A rejected request reports the last
//! stage it reached through [`WebhookError::stage`].

use crate::alerts::Alert;
use crate::canonical::canonicalize;
use crate::converters::ConverterRegistry;
use crate::decoder::AlertDecoder;
use crate::error::{ConstructionError, WebhookError};
use crate::form::FormFields;
use crate::verification::{RsaSha1Verifier, SignatureVerifier};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The only media type accepted for alert deliveries.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const CONTENT_TYPE_HEADER: &str = "content-type";

// ============================================================================
// Processing Stage
// ============================================================================

/// Stages a delivery passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingStage {
    ReceivedRequest,
    ContentTypeChecked,
    FieldsExtracted,
    SignatureVerified,
    Dispatched,
    Done,
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReceivedRequest => "received_request",
            Self::ContentTypeChecked => "content_type_checked",
            Self::FieldsExtracted => "fields_extracted",
            Self::SignatureVerified => "signature_verified",
            Self::Dispatched => "dispatched",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Request
// ============================================================================

/// Raw HTTP request carrying an alert.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    headers: HashMap<String, String>,
    body: Bytes,
}

impl WebhookRequest {
    /// Create a new webhook request.
    ///
    /// # Arguments
    ///
    /// * `headers` - HTTP headers, any casing
    /// * `body` - Raw URL-encoded payload
    pub fn new(headers: HashMap<String, String>, body: Bytes) -> Self {
        Self { headers, body }
    }

    /// Get the `Content-Type` header value, matching the name case-insensitively.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE_HEADER))
            .map(|(_, value)| value.as_str())
    }

    /// Get the raw payload bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

// ============================================================================
// Webhooks
// ============================================================================

/// Verifies and decodes alert deliveries.
///
/// All state is read-only after construction; share one instance across
/// request handlers through an `Arc`.
///
/// # Examples
///
/// ```rust,no_run
/// use paddle_alerts_core::webhook::{Webhooks, FORM_CONTENT_TYPE};
///
/// # fn example(pem: &[u8], body: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
/// let webhooks = Webhooks::new(pem)?;
///
/// let alert = webhooks.parse_form(Some(FORM_CONTENT_TYPE), body)?;
/// println!("{} {}", alert.kind(), alert.alert_id());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Webhooks {
    verifier: Arc<dyn SignatureVerifier>,
    decoder: AlertDecoder,
}

impl Webhooks {
    /// Create an instance verifying with the given PEM encoded RSA public key.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] when the key cannot be used.
    pub fn new(public_key_pem: &[u8]) -> Result<Self, ConstructionError> {
        let verifier = RsaSha1Verifier::from_pem(public_key_pem)?;
        Ok(Self::with_verifier(Arc::new(verifier)))
    }

    /// Create an instance around an existing verifier.
    pub fn with_verifier(verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self {
            verifier,
            decoder: AlertDecoder::default(),
        }
    }

    /// Replace the conversions used while decoding.
    pub fn with_converters(mut self, converters: ConverterRegistry) -> Self {
        self.decoder = AlertDecoder::new(converters);
        self
    }

    pub fn decoder(&self) -> &AlertDecoder {
        &self.decoder
    }

    /// Verify and decode a full HTTP request.
    pub fn parse_request(&self, request: &WebhookRequest) -> Result<Alert, WebhookError> {
        self.parse_form(request.content_type(), request.body())
    }

    /// Verify and decode a body whose `Content-Type` was already extracted.
    ///
    /// # Errors
    ///
    /// - `UnsupportedContentType` before any parsing or cryptography
    /// - `BadSignatureEncoding` / `SignatureInvalid` for inauthentic bodies
    /// - `NotImplemented` / `UnknownAlertType` / `FieldDecode` for authentic
    ///   bodies that cannot be decoded
    pub fn parse_form(
        &self,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<Alert, WebhookError> {
        let content_type = content_type.unwrap_or_default();
        if content_type != FORM_CONTENT_TYPE {
            debug!(
                stage = %ProcessingStage::ReceivedRequest,
                content_type = %content_type,
                "Rejecting request with unsupported content type"
            );
            return Err(WebhookError::UnsupportedContentType {
                content_type: content_type.to_string(),
            });
        }
        debug!(stage = %ProcessingStage::ContentTypeChecked, "Content type accepted");

        let fields = FormFields::parse(body);
        let signature = STANDARD
            .decode(fields.signature().unwrap_or_default())
            .map_err(|e| {
                warn!(
                    stage = %ProcessingStage::ContentTypeChecked,
                    field_count = fields.len(),
                    "Signature is not valid base64"
                );
                WebhookError::BadSignatureEncoding {
                    message: e.to_string(),
                }
            })?;
        debug!(
            stage = %ProcessingStage::FieldsExtracted,
            field_count = fields.len(),
            "Form fields extracted"
        );

        if let Err(e) = self.verifier.verify(&canonicalize(&fields), &signature) {
            warn!(
                stage = %ProcessingStage::FieldsExtracted,
                field_count = fields.len(),
                "Alert signature verification failed"
            );
            return Err(e);
        }
        debug!(stage = %ProcessingStage::SignatureVerified, "Signature verified");

        let alert_name = fields.alert_name().unwrap_or_default();
        debug!(
            stage = %ProcessingStage::Dispatched,
            alert_name = %alert_name,
            "Dispatching alert"
        );
        let alert = self.decoder.decode(&alert_name, &fields)?;

        info!(
            stage = %ProcessingStage::Done,
            alert_name = %alert_name,
            alert_id = alert.alert_id(),
            "Alert verified and decoded"
        );
        Ok(alert)
    }
}

impl fmt::Debug for Webhooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Webhooks")
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

//! # Paddle Alerts Core
//!
//! Verification and decoding of signed Paddle webhook alerts.
//!
//! Paddle delivers alerts as `application/x-www-form-urlencoded` POST bodies
//! signed with its private RSA key. This crate:
//! - Canonicalizes the form fields into the exact byte string Paddle signs
//! - Verifies the `p_signature` field (RSA PKCS#1 v1.5 over SHA-1)
//! - Dispatches on `alert_name` and decodes the fields into typed records
//!
//! # Examples
//!
//! ```rust,no_run
//! use paddle_alerts_core::{Alert, Webhooks, WebhookError};
//!
//! # fn example(pem: &[u8], content_type: Option<&str>, body: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let webhooks = Webhooks::new(pem)?;
//!
//! match webhooks.parse_form(content_type, body) {
//!     Ok(Alert::SubscriptionCreated(created)) => {
//!         println!("new subscription {}", created.subscription_id);
//!     }
//!     Ok(other) => println!("received {}", other.kind()),
//!     Err(e) if e.is_security_failure() => println!("forged delivery: {}", e),
//!     Err(e) => println!("rejected: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod alerts;
pub mod canonical;
pub mod config;
pub mod converters;
pub mod decoder;
pub mod error;
pub mod form;
pub mod verification;
pub mod webhook;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at crate root for convenience
pub use alerts::{
    Alert, AlertKind, SubscriptionCancelledAlert, SubscriptionCreatedAlert,
    SubscriptionPaymentFailedAlert, SubscriptionPaymentRefundedAlert,
    SubscriptionPaymentSucceededAlert, SubscriptionUpdatedAlert,
};
pub use canonical::{canonical_string, canonicalize};
pub use config::{ConfigError, PublicKeySource, WebhooksConfig};
pub use converters::{ConverterRegistry, RefundType, SubscriptionStatus};
pub use decoder::{AlertDecoder, TagDisposition};
pub use error::{ConstructionError, ErrorCategory, FieldDecodeError, WebhookError};
pub use form::FormFields;
pub use verification::{RsaSha1Verifier, SignatureVerifier};
pub use webhook::{ProcessingStage, WebhookRequest, Webhooks, FORM_CONTENT_TYPE};

//! Common test utilities for paddle-alerts integration tests
//!
//! This module provides:
//! - Signing of test payloads with a throwaway RSA key pair
//! - A recording verifier for observing what reaches the crypto stage
//! - Builders for requests and alert field sets

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use paddle_alerts_core::{
    canonicalize, FormFields, SignatureVerifier, WebhookError, WebhookRequest, Webhooks,
    FORM_CONTENT_TYPE,
};
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TEST_PRIVATE_KEY_PEM: &str =
    include_str!("../../../paddle-alerts-core/testdata/test_private_key.pem");
pub const TEST_PUBLIC_KEY_PEM: &str =
    include_str!("../../../paddle-alerts-core/testdata/test_public_key.pem");
#[allow(dead_code)]
pub const PADDLE_SANDBOX_PUBLIC_KEY_PEM: &str =
    include_str!("../../../paddle-alerts-core/testdata/paddle_sandbox_public_key.pem");
#[allow(dead_code)]
pub const SUBSCRIPTION_PAYMENT_SUCCEEDED_BODY: &str =
    include_str!("../../../paddle-alerts-core/testdata/subscription_payment_succeeded.txt");

// ============================================================================
// Signing
// ============================================================================

/// Sign form fields the way Paddle does and return the URL-encoded body.
pub fn signed_body(pairs: &[(&str, &str)]) -> String {
    sign_fields(pairs.iter().copied().collect())
}

/// Sign already-built fields and return the URL-encoded body.
#[allow(dead_code)]
pub fn sign_fields(mut fields: FormFields) -> String {
    let key = RsaPrivateKey::from_pkcs8_pem(TEST_PRIVATE_KEY_PEM)
        .expect("test private key should parse");
    let digest = Sha1::digest(canonicalize(&fields));
    let signature = key
        .sign(Pkcs1v15Sign::new::<Sha1>(), digest.as_slice())
        .expect("signing should succeed");

    fields.insert("p_signature", STANDARD.encode(signature));
    fields.to_urlencoded()
}

#[allow(dead_code)]
pub fn test_webhooks() -> Webhooks {
    Webhooks::new(TEST_PUBLIC_KEY_PEM.as_bytes()).expect("test key should be accepted")
}

/// Request with the form content type and the given body.
pub fn form_request(body: impl Into<Bytes>) -> WebhookRequest {
    request_with_content_type(FORM_CONTENT_TYPE, body)
}

#[allow(dead_code)]
pub fn request_with_content_type(content_type: &str, body: impl Into<Bytes>) -> WebhookRequest {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), content_type.to_string());
    headers.insert("User-Agent".to_string(), "Paddle".to_string());
    WebhookRequest::new(headers, body.into())
}

// ============================================================================
// Recording Verifier
// ============================================================================

/// Verifier that records every canonical message it sees.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingVerifier {
    messages: Arc<Mutex<Vec<Vec<u8>>>>,
    reject: bool,
}

#[allow(dead_code)]
impl RecordingVerifier {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<Vec<u8>> {
        self.messages.lock().unwrap().clone()
    }
}

impl SignatureVerifier for RecordingVerifier {
    fn verify(&self, message: &[u8], _signature: &[u8]) -> Result<(), WebhookError> {
        self.messages.lock().unwrap().push(message.to_vec());
        if self.reject {
            Err(WebhookError::SignatureInvalid)
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Alert Field Sets
// ============================================================================

/// Fields shared by all subscription alerts.
fn base_pairs(alert_name: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        ("alert_id", "1651572"),
        ("alert_name", alert_name),
        ("checkout_id", "675737-chre19a993fdd63-1c4273c652"),
        ("currency", "USD"),
        ("email", "qa@example.com"),
        ("event_time", "2022-05-03 13:36:29"),
        ("marketing_consent", "1"),
        ("passthrough", "customer-42"),
        ("quantity", "1"),
        ("status", "active"),
        ("subscription_id", "250148"),
        ("subscription_plan_id", "26279"),
        ("unit_price", "25.00"),
        ("user_id", "176032"),
    ]
}

/// Representative fields for each supported alert name.
#[allow(dead_code)]
pub fn alert_pairs(alert_name: &'static str) -> Vec<(&'static str, &'static str)> {
    let mut pairs = base_pairs(alert_name);
    let extra: &[(&'static str, &'static str)] = match alert_name {
        "subscription_created" => &[
            ("cancel_url", "https://checkout.paddle.com/subscription/cancel"),
            ("next_bill_date", "2022-06-03"),
            ("source", "checkout"),
            ("update_url", "https://checkout.paddle.com/subscription/update"),
        ],
        "subscription_updated" => &[
            ("cancel_url", "https://checkout.paddle.com/subscription/cancel"),
            ("new_price", "50.00"),
            ("new_quantity", "2"),
            ("new_unit_price", "25.00"),
            ("next_bill_date", "2022-06-03"),
            ("old_next_bill_date", "2022-06-01"),
            ("old_price", "25.00"),
            ("old_quantity", "1"),
            ("old_status", "trialing"),
            ("old_subscription_plan_id", "26278"),
            ("old_unit_price", "25.00"),
            ("update_url", "https://checkout.paddle.com/subscription/update"),
        ],
        "subscription_cancelled" => &[("cancellation_effective_date", "2022-06-03")],
        "subscription_payment_failed" => &[
            ("amount", "25.00"),
            ("attempt_number", "2"),
            ("cancel_url", "https://checkout.paddle.com/subscription/cancel"),
            ("instalments", "1"),
            ("next_retry_date", "2022-05-10"),
            ("order_id", "317366-1864142"),
            ("subscription_payment_id", "1864142"),
            ("update_url", "https://checkout.paddle.com/subscription/update"),
        ],
        "subscription_payment_refunded" => &[
            ("amount", "25.00"),
            ("gross_refund", "25.00"),
            ("initial_payment", "1"),
            ("instalments", "1"),
            ("order_id", "317366-1864142"),
            ("refund_reason", "customer request"),
            ("refund_type", "full"),
            ("subscription_payment_id", "1864142"),
        ],
        "subscription_payment_succeeded" => &[
            ("balance_gross", "25"),
            ("country", "IL"),
            ("earnings", "23.25"),
            ("initial_payment", "1"),
            ("instalments", "1"),
            ("next_bill_date", "2022-06-03"),
            ("order_id", "317366-1864142"),
            ("payment_method", "card"),
            ("receipt_url", "https://my.paddle.com/receipt/317366-1864142"),
            ("subscription_payment_id", "1864142"),
        ],
        _ => &[],
    };
    pairs.extend_from_slice(extra);
    pairs
}

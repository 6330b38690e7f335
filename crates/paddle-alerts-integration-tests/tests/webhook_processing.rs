//! Integration tests for end-to-end alert processing
//!
//! Tests verify:
//! - Every supported alert type verifies and decodes from a signed request
//! - Forged, tampered and mis-typed requests are rejected at the right stage
//! - A real sandbox delivery verifies against the sandbox key
//! - A single instance can be shared across threads

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use paddle_alerts_core::{
    canonicalize, Alert, AlertKind, ErrorCategory, FormFields, ProcessingStage, RefundType,
    SubscriptionStatus, WebhookError, Webhooks,
};
use std::sync::Arc;
use std::thread;

// ============================================================================
// Supported Alerts
// ============================================================================

/// Verify that each supported alert name produces its own variant.
#[test]
fn test_all_supported_alerts_decode() {
    let webhooks = test_webhooks();

    for kind in AlertKind::ALL {
        let request = form_request(signed_body(&alert_pairs(kind.as_str())));

        let alert = webhooks
            .parse_request(&request)
            .unwrap_or_else(|e| panic!("{} should decode: {}", kind, e));

        assert_eq!(alert.kind(), kind);
        assert_eq!(alert.alert_id(), 1651572);
        assert_eq!(alert.subscription_id().as_deref(), Some("250148"));
        assert_eq!(alert.passthrough(), Some("customer-42"));
        assert_eq!(
            alert.event_time(),
            Some(Utc.with_ymd_and_hms(2022, 5, 3, 13, 36, 29).unwrap())
        );
    }
}

#[test]
fn test_subscription_updated_fields() {
    let webhooks = test_webhooks();
    let request = form_request(signed_body(&alert_pairs("subscription_updated")));

    let alert = webhooks.parse_request(&request).expect("alert should decode");

    let Alert::SubscriptionUpdated(updated) = alert else {
        panic!("Expected SubscriptionUpdated");
    };
    assert_eq!(updated.status, SubscriptionStatus::Active);
    assert_eq!(updated.old_status, SubscriptionStatus::Trialing);
    assert_eq!(updated.old_subscription_plan_id.as_deref(), Some("26278"));
    assert_eq!(updated.new_quantity.as_deref(), Some("2"));
    assert_eq!(
        updated.old_next_bill_date,
        Some(Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).unwrap())
    );
    assert!(updated.marketing_consent);
    assert!(updated.paused_at.is_none());
}

#[test]
fn test_subscription_payment_refunded_fields() {
    let webhooks = test_webhooks();
    let request = form_request(signed_body(&alert_pairs("subscription_payment_refunded")));

    let alert = webhooks.parse_request(&request).expect("alert should decode");

    let Alert::SubscriptionPaymentRefunded(refunded) = alert else {
        panic!("Expected SubscriptionPaymentRefunded");
    };
    assert_eq!(refunded.refund_type, RefundType::Full);
    assert_eq!(refunded.refund_reason.as_deref(), Some("customer request"));
    assert_eq!(refunded.subscription_payment_id, 1864142);
    assert!(refunded.initial_payment);
}

#[test]
fn test_subscription_cancelled_effective_date() {
    let webhooks = test_webhooks();
    let request = form_request(signed_body(&alert_pairs("subscription_cancelled")));

    let alert = webhooks.parse_request(&request).expect("alert should decode");

    let Alert::SubscriptionCancelled(cancelled) = alert else {
        panic!("Expected SubscriptionCancelled");
    };
    assert_eq!(
        cancelled.cancellation_effective_date,
        Some(Utc.with_ymd_and_hms(2022, 6, 3, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_subscription_cancelled_with_textual_subscription_id() {
    let webhooks = test_webhooks();
    let mut pairs = alert_pairs("subscription_cancelled");
    for (name, value) in pairs.iter_mut() {
        match *name {
            "subscription_id" => *value = "sub_123",
            "subscription_plan_id" => *value = "plan_basic",
            _ => {}
        }
    }

    let alert = webhooks
        .parse_request(&form_request(signed_body(&pairs)))
        .expect("textual identifiers should decode");

    assert_eq!(alert.subscription_id().as_deref(), Some("sub_123"));
    let Alert::SubscriptionCancelled(cancelled) = alert else {
        panic!("Expected SubscriptionCancelled");
    };
    assert_eq!(cancelled.subscription_plan_id.as_deref(), Some("plan_basic"));
}

#[test]
fn test_signed_non_utf8_value_verifies() {
    let webhooks = test_webhooks();
    let mut fields: FormFields = alert_pairs("subscription_payment_succeeded")
        .into_iter()
        .collect();
    fields.insert("customer_name", b"Jos\xe9".as_slice());

    let alert = webhooks
        .parse_request(&form_request(sign_fields(fields)))
        .expect("raw bytes should verify");

    let Alert::SubscriptionPaymentSucceeded(payment) = alert else {
        panic!("Expected SubscriptionPaymentSucceeded");
    };
    assert_eq!(payment.customer_name.as_deref(), Some("Jos\u{fffd}"));
}

#[test]
fn test_decoded_alert_serializes_to_json() {
    let webhooks = test_webhooks();
    let request = form_request(signed_body(&alert_pairs("subscription_payment_failed")));

    let alert = webhooks.parse_request(&request).expect("alert should decode");
    let json = serde_json::to_value(&alert).expect("alert should serialize");

    assert_eq!(json["subscription_payment_failed"]["attempt_number"], "2");
    assert_eq!(json["subscription_payment_failed"]["status"], "active");
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_wrong_content_type_never_reaches_verifier() {
    let verifier = RecordingVerifier::accepting();
    let webhooks = Webhooks::with_verifier(Arc::new(verifier.clone()));
    let request = request_with_content_type(
        "application/json",
        signed_body(&alert_pairs("subscription_created")),
    );

    let error = webhooks.parse_request(&request).unwrap_err();

    assert!(matches!(error, WebhookError::UnsupportedContentType { .. }));
    assert_eq!(error.stage(), ProcessingStage::ReceivedRequest);
    assert!(verifier.messages().is_empty());
}

#[test]
fn test_verifier_sees_canonical_bytes_without_signature() {
    let verifier = RecordingVerifier::accepting();
    let webhooks = Webhooks::with_verifier(Arc::new(verifier.clone()));
    let body = signed_body(&[("alert_name", "subscription_cancelled"), ("alert_id", "5")]);

    webhooks
        .parse_request(&form_request(body))
        .expect("alert should decode");

    assert_eq!(
        verifier.messages(),
        vec![br#"a:2:{s:8:"alert_id";s:1:"5";s:10:"alert_name";s:22:"subscription_cancelled";}"#
            .to_vec()]
    );
}

#[test]
fn test_rejecting_verifier_stops_before_dispatch() {
    let verifier = RecordingVerifier::rejecting();
    let webhooks = Webhooks::with_verifier(Arc::new(verifier.clone()));
    // An unknown alert name would fail dispatch; verification must fail first
    let body = signed_body(&[("alert_name", "totally_bogus")]);

    let error = webhooks.parse_request(&form_request(body)).unwrap_err();

    assert!(matches!(error, WebhookError::SignatureInvalid));
    assert_eq!(verifier.messages().len(), 1);
}

#[test]
fn test_tampered_request_is_security_failure() {
    let webhooks = test_webhooks();
    let body = signed_body(&alert_pairs("subscription_payment_succeeded"));
    let tampered = body.replacen("country=IL", "country=US", 1);
    assert_ne!(body, tampered);

    let error = webhooks
        .parse_request(&form_request(tampered))
        .unwrap_err();

    assert!(matches!(error, WebhookError::SignatureInvalid));
    assert_eq!(error.error_category(), ErrorCategory::Security);
    assert!(!error.is_transient());
}

#[test]
fn test_unimplemented_and_unknown_alerts() {
    let webhooks = test_webhooks();

    let error = webhooks
        .parse_request(&form_request(signed_body(&[("alert_name", "invoice_paid")])))
        .unwrap_err();
    assert!(matches!(error, WebhookError::NotImplemented { .. }));
    assert_eq!(error.error_category(), ErrorCategory::Unsupported);

    let error = webhooks
        .parse_request(&form_request(signed_body(&[("alert_name", "totally_bogus")])))
        .unwrap_err();
    assert!(matches!(error, WebhookError::UnknownAlertType { .. }));
}

#[test]
fn test_vendor_additions_do_not_break_decoding() {
    let webhooks = test_webhooks();
    let mut pairs = alert_pairs("subscription_created");
    pairs.push(("future_field", "value"));
    pairs.push(("another_future_field", ""));

    let alert = webhooks
        .parse_request(&form_request(signed_body(&pairs)))
        .expect("extra fields should be ignored");

    assert_eq!(alert.kind(), AlertKind::SubscriptionCreated);
}

// ============================================================================
// Real Deliveries
// ============================================================================

#[test]
fn test_real_sandbox_delivery() {
    let webhooks = Webhooks::new(PADDLE_SANDBOX_PUBLIC_KEY_PEM.as_bytes())
        .expect("sandbox key should be accepted");

    let alert = webhooks
        .parse_request(&form_request(SUBSCRIPTION_PAYMENT_SUCCEEDED_BODY))
        .expect("capture should verify");

    let Alert::SubscriptionPaymentSucceeded(payment) = alert else {
        panic!("Expected SubscriptionPaymentSucceeded");
    };
    assert_eq!(payment.alert_id, 1651572);
    assert_eq!(payment.plan_name.as_deref(), Some("Essentials"));
    assert_eq!(payment.country.as_deref(), Some("IL"));
    assert_eq!(payment.next_bill_date.as_deref(), Some("2022-06-03"));
}

#[test]
fn test_sandbox_canonical_form_is_stable() {
    let fields = FormFields::parse(SUBSCRIPTION_PAYMENT_SUCCEEDED_BODY.as_bytes());

    let canonical = canonicalize(&fields);

    assert!(canonical.starts_with(br#"a:35:{s:8:"alert_id";s:7:"1651572";"#));
    assert!(canonical.ends_with(br#"s:7:"user_id";s:6:"176032";}"#));
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn test_shared_instance_across_threads() {
    let webhooks = Arc::new(test_webhooks());

    let handles: Vec<_> = AlertKind::ALL
        .into_iter()
        .map(|kind| {
            let webhooks = Arc::clone(&webhooks);
            let body = signed_body(&alert_pairs(kind.as_str()));
            thread::spawn(move || {
                let alert = webhooks
                    .parse_request(&form_request(body))
                    .expect("alert should decode");
                alert.kind()
            })
        })
        .collect();

    let kinds: Vec<AlertKind> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread should not panic"))
        .collect();

    assert_eq!(kinds, AlertKind::ALL.to_vec());
}

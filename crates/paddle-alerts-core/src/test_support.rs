//! Shared fixtures for unit tests: a throwaway RSA key pair and helpers
//! that sign form fields the way the provider does.

use crate::canonical::canonicalize;
use crate::form::{FormFields, SIGNATURE_FIELD};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha1::{Digest, Sha1};

pub const TEST_PRIVATE_KEY_PEM: &str = include_str!("../testdata/test_private_key.pem");
pub const TEST_PUBLIC_KEY_PEM: &str = include_str!("../testdata/test_public_key.pem");
pub const OTHER_PUBLIC_KEY_PEM: &str = include_str!("../testdata/other_public_key.pem");
pub const EC_PUBLIC_KEY_PEM: &str = include_str!("../testdata/ec_public_key.pem");
pub const PADDLE_SANDBOX_PUBLIC_KEY_PEM: &str =
    include_str!("../testdata/paddle_sandbox_public_key.pem");
pub const SUBSCRIPTION_PAYMENT_SUCCEEDED_BODY: &str =
    include_str!("../testdata/subscription_payment_succeeded.txt");

/// Sign `message` with the test private key (SHA-1, PKCS#1 v1.5).
pub fn sign(message: &[u8]) -> Vec<u8> {
    let key = RsaPrivateKey::from_pkcs8_pem(TEST_PRIVATE_KEY_PEM)
        .expect("test private key should parse");
    let digest = Sha1::digest(message);

    key.sign(Pkcs1v15Sign::new::<Sha1>(), digest.as_slice())
        .expect("signing should succeed")
}

/// Build form fields from pairs and add a valid `p_signature`.
pub fn signed_fields(pairs: &[(&str, &str)]) -> FormFields {
    let mut fields: FormFields = pairs.iter().copied().collect();
    let signature = sign(&canonicalize(&fields));
    fields.insert(SIGNATURE_FIELD, STANDARD.encode(signature));
    fields
}

/// URL-encoded body of [`signed_fields`].
pub fn signed_body(pairs: &[(&str, &str)]) -> String {
    signed_fields(pairs).to_urlencoded()
}

/// Fields of a `subscription_created` alert as the provider sends them.
pub fn subscription_created_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("alert_id", "1234567"),
        ("alert_name", "subscription_created"),
        ("cancel_url", "https://checkout.paddle.com/subscription/cancel?user=1"),
        ("checkout_id", "675737-chre19a993fdd63-1c4273c652"),
        ("currency", "USD"),
        ("email", "qa@example.com"),
        ("event_time", "2022-05-03 13:36:29"),
        ("marketing_consent", "0"),
        ("next_bill_date", "2022-06-03"),
        ("passthrough", "customer-42"),
        ("quantity", "1"),
        ("source", "checkout"),
        ("status", "active"),
        ("subscription_id", "250148"),
        ("subscription_plan_id", "26279"),
        ("unit_price", "25.00"),
        ("user_id", "176032"),
        ("update_url", "https://checkout.paddle.com/subscription/update?user=1"),
    ]
}

//! Webhook signature verification.
//!
//! Paddle signs the canonical serialization of each alert with its private
//! RSA key using PKCS#1 v1.5 over a SHA-1 digest. The scheme is fixed by the
//! signing side and cannot be negotiated.

use crate::error::{ConstructionError, WebhookError};
use rsa::pkcs8::{spki, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha1::{Digest, Sha1};

/// Interface for checking a signature over canonical alert bytes.
///
/// Implementations must be safe to share between concurrently handled
/// requests and must hold no per-request state.
pub trait SignatureVerifier: Send + Sync {
    /// Verify `signature` over `message`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::SignatureInvalid`] when the signature does not
    /// validate. No other error is returned.
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), WebhookError>;
}

/// RSA PKCS#1 v1.5 / SHA-1 verifier bound to a single public key.
///
/// # Examples
///
/// ```rust,no_run
/// use paddle_alerts_core::verification::{RsaSha1Verifier, SignatureVerifier};
///
/// # fn example(pem: &[u8], message: &[u8], signature: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
/// let verifier = RsaSha1Verifier::from_pem(pem)?;
/// verifier.verify(message, signature)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RsaSha1Verifier {
    key: RsaPublicKey,
}

impl RsaSha1Verifier {
    /// Wrap an already parsed RSA public key.
    pub fn new(key: RsaPublicKey) -> Self {
        Self { key }
    }

    /// Parse a PEM encoded `PUBLIC KEY` (SubjectPublicKeyInfo) block.
    ///
    /// Text before the `-----BEGIN` line and after the matching `-----END`
    /// line is ignored.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::MissingPemBlock`] if no PEM block is present
    /// - [`ConstructionError::NotRsaKey`] if the key is not an RSA key
    /// - [`ConstructionError::InvalidPublicKey`] for any other parse failure
    pub fn from_pem(pem: &[u8]) -> Result<Self, ConstructionError> {
        let text = std::str::from_utf8(pem).map_err(|_| ConstructionError::MissingPemBlock)?;
        let block = locate_pem_block(text).ok_or(ConstructionError::MissingPemBlock)?;

        let key = RsaPublicKey::from_public_key_pem(block).map_err(|e| match e {
            spki::Error::OidUnknown { .. } => ConstructionError::NotRsaKey,
            other => ConstructionError::InvalidPublicKey {
                message: other.to_string(),
            },
        })?;

        Ok(Self::new(key))
    }

    /// Modulus size of the configured key in bits.
    pub fn key_size_bits(&self) -> usize {
        self.key.size() * 8
    }
}

impl SignatureVerifier for RsaSha1Verifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), WebhookError> {
        let digest = Sha1::digest(message);

        self.key
            .verify(Pkcs1v15Sign::new::<Sha1>(), digest.as_slice(), signature)
            .map_err(|_| WebhookError::SignatureInvalid)
    }
}

// Security: Don't expose key material in debug output
impl std::fmt::Debug for RsaSha1Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaSha1Verifier")
            .field("key_size_bits", &self.key_size_bits())
            .finish()
    }
}

/// Find the first complete PEM block in `text`.
fn locate_pem_block(text: &str) -> Option<&str> {
    const BEGIN: &str = "-----BEGIN ";
    const END: &str = "-----END ";
    const DASHES: &str = "-----";

    let start = text.find(BEGIN)?;
    let end_marker = start + text[start..].find(END)?;
    let after_label = end_marker + END.len();
    let end = after_label + text[after_label..].find(DASHES)? + DASHES.len();

    Some(&text[start..end])
}

#[cfg(test)]
#[path = "verification_tests.rs"]
mod tests;

//! Canonical serialization of form fields for signature verification.
//!
//! The signing side serializes the alert fields as a PHP `serialize()`d
//! associative array of strings, sorted by key, and signs those bytes. This
//! module reproduces that encoding exactly:
//!
//! ```text
//! a:<count>:{s:<namelen>:"<name>";s:<valuelen>:"<value>";...}
//! ```
//!
//! Lengths are byte lengths of the decoded field bytes. Names and values are
//! emitted verbatim, without any escaping or UTF-8 validation. Any change to
//! this format breaks every real signature.

use crate::form::{FormFields, SIGNATURE_FIELD};

/// Build the canonical byte string for the given fields.
///
/// The [`SIGNATURE_FIELD`] is always excluded. Output depends only on the
/// set of names and values, never on the order they arrived in.
///
/// # Examples
///
/// ```rust
/// use paddle_alerts_core::{canonical::canonicalize, form::FormFields};
///
/// let fields = FormFields::parse(b"b=xy&a=1&p_signature=c2ln");
///
/// assert_eq!(
///     canonicalize(&fields),
///     br#"a:2:{s:1:"a";s:1:"1";s:1:"b";s:2:"xy";}"#.to_vec()
/// );
/// ```
pub fn canonicalize(fields: &FormFields) -> Vec<u8> {
    let signed: Vec<(&[u8], &[u8])> = fields
        .iter()
        .filter(|(name, _)| *name != SIGNATURE_FIELD.as_bytes())
        .collect();

    let mut serialized = format!("a:{}:{{", signed.len()).into_bytes();
    for (name, value) in signed {
        push_string(&mut serialized, name);
        push_string(&mut serialized, value);
    }
    serialized.push(b'}');

    serialized
}

/// [`canonicalize`], returned as text for display. Invalid UTF-8 is replaced.
pub fn canonical_string(fields: &FormFields) -> String {
    String::from_utf8_lossy(&canonicalize(fields)).into_owned()
}

fn push_string(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(format!("s:{}:\"", bytes.len()).as_bytes());
    out.extend_from_slice(bytes);
    out.extend_from_slice(b"\";");
}

#[cfg(test)]
#[path = "canonical_tests.rs"]
mod tests;

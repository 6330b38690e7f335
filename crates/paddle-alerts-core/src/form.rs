//! Parsed form fields of a webhook delivery.

use percent_encoding::percent_decode;
use std::borrow::Cow;
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Reserved field carrying the base64-encoded signature.
pub const SIGNATURE_FIELD: &str = "p_signature";

/// Reserved field carrying the alert type tag.
pub const ALERT_NAME_FIELD: &str = "alert_name";

/// Single-valued mapping of form field names to values.
///
/// Names and values are kept as the exact decoded bytes of the body, valid
/// UTF-8 or not, since the signature covers those bytes. Names are unique and
/// iterate in byte-wise ascending order. When an encoded body repeats a name,
/// the first occurrence wins.
///
/// # Examples
///
/// ```rust
/// use paddle_alerts_core::form::FormFields;
///
/// let fields = FormFields::parse(b"b=2&a=1&a=ignored");
///
/// assert_eq!(fields.get_str("a").as_deref(), Some("1"));
/// let names: Vec<&[u8]> = fields.iter().map(|(name, _)| name).collect();
/// assert_eq!(names, vec![b"a".as_slice(), b"b".as_slice()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl FormFields {
    /// Create an empty field mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` body.
    ///
    /// Percent-escapes and `+` are decoded to raw bytes. Malformed escapes
    /// are kept verbatim, so parsing itself never fails.
    pub fn parse(body: &[u8]) -> Self {
        body.split(|&b| b == b'&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (name, value) = match pair.iter().position(|&b| b == b'=') {
                    Some(index) => (&pair[..index], &pair[index + 1..]),
                    None => (pair, &pair[pair.len()..]),
                };
                (decode_component(name), decode_component(value))
            })
            .collect()
    }

    /// Set a field, replacing any existing value. Returns the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Option<Vec<u8>> {
        self.fields.insert(name.into(), value.into())
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.fields.remove(name.as_bytes())
    }

    /// Look up the raw bytes of a field value.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.fields.get(name.as_bytes()).map(Vec::as_slice)
    }

    /// Look up a field value as text. Invalid UTF-8 is replaced.
    pub fn get_str(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(String::from_utf8_lossy)
    }

    /// Whether the field is present (possibly with an empty value).
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name.as_bytes())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in byte-wise ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_slice(), value.as_slice()))
    }

    /// The alert type tag, if present.
    pub fn alert_name(&self) -> Option<Cow<'_, str>> {
        self.get_str(ALERT_NAME_FIELD)
    }

    /// The raw (still base64-encoded) signature, if present.
    pub fn signature(&self) -> Option<&[u8]> {
        self.get(SIGNATURE_FIELD)
    }

    /// Encode the fields back into a URL-encoded body.
    pub fn to_urlencoded(&self) -> String {
        self.iter()
            .map(|(name, value)| {
                let name: String = form_urlencoded::byte_serialize(name).collect();
                let value: String = form_urlencoded::byte_serialize(value).collect();
                format!("{}={}", name, value)
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<Vec<u8>>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = BTreeMap::new();
        for (name, value) in iter {
            // First value wins for repeated names
            fields.entry(name.into()).or_insert_with(|| value.into());
        }
        Self { fields }
    }
}

/// Decode one name or value: `+` is a space, then percent-escapes.
fn decode_component(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    percent_decode(&spaced).collect()
}

#[cfg(test)]
#[path = "form_tests.rs"]
mod tests;

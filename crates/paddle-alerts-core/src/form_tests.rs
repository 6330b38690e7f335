//! Tests for form field parsing.

use super::*;

#[test]
fn test_parse_decodes_percent_escapes_and_plus() {
    let fields = FormFields::parse(b"email=qa%40example.com&event_time=2022-05-03+13%3A36%3A29");

    assert_eq!(fields.get("email"), Some(b"qa@example.com".as_slice()));
    assert_eq!(
        fields.get_str("event_time").as_deref(),
        Some("2022-05-03 13:36:29")
    );
}

#[test]
fn test_parse_first_value_wins() {
    let fields = FormFields::parse(b"status=active&status=deleted");

    assert_eq!(fields.len(), 1);
    assert_eq!(fields.get("status"), Some(b"active".as_slice()));
}

#[test]
fn test_parse_keeps_empty_values() {
    let fields = FormFields::parse(b"coupon=&currency=USD&flag");

    assert!(fields.contains("coupon"));
    assert_eq!(fields.get("coupon"), Some(b"".as_slice()));
    assert_eq!(fields.get("flag"), Some(b"".as_slice()));
}

#[test]
fn test_parse_empty_body() {
    let fields = FormFields::parse(b"");

    assert!(fields.is_empty());
    assert_eq!(fields.alert_name(), None);
    assert_eq!(fields.signature(), None);
}

#[test]
fn test_parse_skips_empty_segments() {
    let fields = FormFields::parse(b"&a=1&&b=2&");

    assert_eq!(fields.len(), 2);
}

#[test]
fn test_parse_keeps_invalid_utf8_bytes() {
    let fields = FormFields::parse(b"name=%FF%FEZo%C3%AB&%E9t%E9=1");

    assert_eq!(fields.get("name"), Some(b"\xff\xfeZo\xc3\xab".as_slice()));
    let names: Vec<&[u8]> = fields.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec![b"name".as_slice(), b"\xe9t\xe9".as_slice()]);
    assert_eq!(fields.get_str("name").as_deref(), Some("\u{fffd}\u{fffd}Zoë"));
}

#[test]
fn test_parse_keeps_malformed_escapes_verbatim() {
    let fields = FormFields::parse(b"discount=100%25&note=50%&code=%zz");

    assert_eq!(fields.get("discount"), Some(b"100%".as_slice()));
    assert_eq!(fields.get("note"), Some(b"50%".as_slice()));
    assert_eq!(fields.get("code"), Some(b"%zz".as_slice()));
}

#[test]
fn test_iteration_is_byte_wise_ascending() {
    let fields: FormFields = vec![("b", "2"), ("B", "3"), ("a", "1"), ("_", "4")]
        .into_iter()
        .collect();

    let names: Vec<&[u8]> = fields.iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec![b"B".as_slice(), b"_".as_slice(), b"a".as_slice(), b"b".as_slice()]
    );
}

#[test]
fn test_reserved_field_accessors() {
    let fields = FormFields::parse(b"alert_name=subscription_created&p_signature=abc%3D");

    assert_eq!(fields.alert_name().as_deref(), Some("subscription_created"));
    assert_eq!(fields.signature(), Some(b"abc=".as_slice()));
}

#[test]
fn test_insert_and_remove() {
    let mut fields = FormFields::new();
    assert_eq!(fields.insert("a", "1"), None);
    assert_eq!(fields.insert("a", "2"), Some(b"1".to_vec()));
    assert_eq!(fields.remove("a"), Some(b"2".to_vec()));
    assert!(fields.is_empty());
}

#[test]
fn test_to_urlencoded_parses_back() {
    let mut fields = FormFields::new();
    fields.insert("passthrough", "a=b&c d");
    fields.insert("email", "qa@example.com");
    fields.insert("customer_name", b"\xffbyte".as_slice());

    let encoded = fields.to_urlencoded();

    assert_eq!(FormFields::parse(encoded.as_bytes()), fields);
}

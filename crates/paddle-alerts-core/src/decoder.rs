//! Tag dispatch and field population for verified alerts.

use crate::alerts::{Alert, AlertKind};
use crate::converters::{ConverterRegistry, RefundType, SubscriptionStatus};
use crate::error::{FieldDecodeError, WebhookError};
use crate::form::FormFields;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use tracing::debug;

/// Alert names the provider defines but this crate intentionally does not
/// decode.
pub const UNIMPLEMENTED_ALERT_NAMES: [&str; 14] = [
    "payment_succeeded",
    "payment_refunded",
    "locker_processed",
    "payment_dispute_created",
    "payment_dispute_closed",
    "high_risk_transaction_created",
    "high_risk_transaction_updated",
    "transfer_created",
    "transfer_paid",
    "new_audience_member",
    "update_audience_member",
    "invoice_paid",
    "invoice_sent",
    "invoice_overdue",
];

/// How a tag is handled by [`AlertDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDisposition {
    /// Decoded into the given kind.
    Supported(AlertKind),
    /// Known to the provider, rejected with `NotImplemented`.
    NotImplemented,
    /// Not known at all, rejected with `UnknownAlertType`.
    Unknown,
}

/// Population of an alert record from verified form fields.
pub trait FromFields: Sized {
    fn from_fields(reader: &FieldReader<'_>) -> Result<Self, FieldDecodeError>;
}

// ============================================================================
// Field Reader
// ============================================================================

/// Typed access to form fields while populating a record.
///
/// Absent and empty values are treated the same and yield the attribute's
/// default. Text attributes replace invalid UTF-8. Conversion misses are
/// traced at `debug` with the field name only.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    fields: &'a FormFields,
    converters: &'a ConverterRegistry,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a FormFields, converters: &'a ConverterRegistry) -> Self {
        Self { fields, converters }
    }

    fn value(&self, name: &str) -> Option<Cow<'a, str>> {
        self.fields
            .get(name)
            .filter(|value| !value.is_empty())
            .map(String::from_utf8_lossy)
    }

    /// Always-present string; `""` when absent.
    pub fn string(&self, name: &str) -> String {
        self.optional_string(name).unwrap_or_default()
    }

    pub fn optional_string(&self, name: &str) -> Option<String> {
        self.value(name).map(Cow::into_owned)
    }

    /// Unsigned identifier; `0` when absent.
    pub fn unsigned(&self, name: &'static str) -> Result<u64, FieldDecodeError> {
        match self.value(name) {
            None => Ok(0),
            Some(raw) => raw.parse().map_err(|_| FieldDecodeError::InvalidInteger {
                field: name,
                value: raw.into_owned(),
            }),
        }
    }

    /// Signed count; `0` when absent.
    pub fn integer(&self, name: &'static str) -> Result<i64, FieldDecodeError> {
        match self.value(name) {
            None => Ok(0),
            Some(raw) => raw.parse().map_err(|_| FieldDecodeError::InvalidInteger {
                field: name,
                value: raw.into_owned(),
            }),
        }
    }

    /// Flag; `false` when absent.
    pub fn boolean(&self, name: &'static str) -> Result<bool, FieldDecodeError> {
        match self.value(name).as_deref() {
            None => Ok(false),
            Some("1" | "t" | "T" | "TRUE" | "true" | "True") => Ok(true),
            Some("0" | "f" | "F" | "FALSE" | "false" | "False") => Ok(false),
            Some(raw) => Err(FieldDecodeError::InvalidBoolean {
                field: name,
                value: raw.to_string(),
            }),
        }
    }

    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        let raw = self.value(name)?;
        let converted = self.converters.timestamp(&*raw);
        if converted.is_none() {
            debug!(field = name, "Timestamp not convertible, leaving unset");
        }
        converted
    }

    pub fn subscription_status(&self, name: &str) -> SubscriptionStatus {
        self.converted(name, |raw| self.converters.subscription_status(raw))
    }

    pub fn refund_type(&self, name: &str) -> RefundType {
        self.converted(name, |raw| self.converters.refund_type(raw))
    }

    fn converted<T: Default>(&self, name: &str, convert: impl Fn(&str) -> Option<T>) -> T {
        let Some(raw) = self.value(name) else {
            return T::default();
        };
        match convert(&*raw) {
            Some(value) => value,
            None => {
                debug!(field = name, "Value not convertible, using default");
                T::default()
            }
        }
    }
}

// ============================================================================
// Decoder
// ============================================================================

/// Maps alert tags to record variants and populates them.
#[derive(Debug, Clone, Default)]
pub struct AlertDecoder {
    converters: ConverterRegistry,
}

impl AlertDecoder {
    pub fn new(converters: ConverterRegistry) -> Self {
        Self { converters }
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Classify a tag without decoding anything.
    pub fn resolve(tag: &str) -> TagDisposition {
        if let Some(kind) = AlertKind::from_tag(tag) {
            TagDisposition::Supported(kind)
        } else if UNIMPLEMENTED_ALERT_NAMES.contains(&tag) {
            TagDisposition::NotImplemented
        } else {
            TagDisposition::Unknown
        }
    }

    /// Decode verified fields into the variant selected by `tag`.
    ///
    /// Extra fields are ignored. Fails with `NotImplemented` or
    /// `UnknownAlertType` for tags without a variant, and with `FieldDecode`
    /// when an integer or boolean attribute carries malformed text.
    pub fn decode(&self, tag: &str, fields: &FormFields) -> Result<Alert, WebhookError> {
        match Self::resolve(tag) {
            TagDisposition::Supported(kind) => {
                let reader = FieldReader::new(fields, &self.converters);
                Ok(Alert::from_fields(kind, &reader)?)
            }
            TagDisposition::NotImplemented => Err(WebhookError::NotImplemented {
                alert_name: tag.to_string(),
            }),
            TagDisposition::Unknown => Err(WebhookError::UnknownAlertType {
                alert_name: tag.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "decoder_tests.rs"]
mod tests;

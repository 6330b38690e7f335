//! Field value conversions used while decoding alerts.
//!
//! Each typed attribute that is not a plain string or number goes through a
//! conversion registered in [`ConverterRegistry`]. A conversion returns
//! `None` when the raw value is not convertible; the decoder then leaves the
//! attribute at its default instead of failing the alert.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conversion from a raw form value to a typed value.
pub type Converter<T> = fn(&str) -> Option<T>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// `0` stands for any ASCII digit; every other byte must match exactly.
const DATE_LAYOUT: &str = "0000-00-00";
const DATE_TIME_LAYOUT: &str = "0000-00-00 00:00:00";

// ============================================================================
// Subscription Status
// ============================================================================

/// Status of a subscription.
///
/// `Unknown` is the default and is used when the field is absent or carries
/// a value outside the known set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Unknown,
    Active,
    Trialing,
    PastDue,
    Paused,
    Deleted,
}

impl SubscriptionStatus {
    /// Wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Paused => "paused",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "trialing" => Ok(Self::Trialing),
            "past_due" => Ok(Self::PastDue),
            "paused" => Ok(Self::Paused),
            "deleted" => Ok(Self::Deleted),
            _ => Err(UnknownVariant {
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Refund Type
// ============================================================================

/// Kind of refund issued for a subscription payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundType {
    #[default]
    Unknown,
    Full,
    Vat,
    Partial,
}

impl RefundType {
    /// Wire representation of the refund type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Full => "full",
            Self::Vat => "vat",
            Self::Partial => "partial",
        }
    }
}

impl fmt::Display for RefundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "vat" => Ok(Self::Vat),
            "partial" => Ok(Self::Partial),
            _ => Err(UnknownVariant {
                value: s.to_string(),
            }),
        }
    }
}

/// A string outside an enumeration's known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown value: '{value}'")]
pub struct UnknownVariant {
    pub value: String,
}

// ============================================================================
// Standard Conversions
// ============================================================================

/// Parse `YYYY-MM-DD` (midnight) or `YYYY-MM-DD HH:MM:SS`, both in UTC.
///
/// Every field is fixed width and zero padded. Signs, surrounding
/// whitespace, single-digit fields and fractional seconds are unconvertible.
///
/// # Examples
///
/// ```rust
/// use paddle_alerts_core::converters::parse_timestamp;
///
/// assert!(parse_timestamp("2022-06-03").is_some());
/// assert!(parse_timestamp("2022-05-03 13:36:29").is_some());
/// assert!(parse_timestamp("2022-6-3").is_none());
/// assert!(parse_timestamp("03/06/2022").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if matches_layout(value, DATE_LAYOUT) {
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    } else if matches_layout(value, DATE_TIME_LAYOUT) {
        NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
            .ok()
            .map(|dt| dt.and_utc())
    } else {
        None
    }
}

fn matches_layout(value: &str, layout: &str) -> bool {
    value.len() == layout.len()
        && value.bytes().zip(layout.bytes()).all(|(v, l)| match l {
            b'0' => v.is_ascii_digit(),
            _ => v == l,
        })
}

/// Exact match against the known subscription statuses.
pub fn parse_subscription_status(value: &str) -> Option<SubscriptionStatus> {
    value.parse().ok()
}

/// Exact match against the known refund types.
pub fn parse_refund_type(value: &str) -> Option<RefundType> {
    value.parse().ok()
}

// ============================================================================
// Registry
// ============================================================================

/// Conversions applied to typed alert attributes.
///
/// The default registry carries the standard conversions. Individual
/// conversions can be replaced at construction time; the registry is
/// read-only once handed to a decoder.
///
/// # Examples
///
/// ```rust
/// use chrono::{DateTime, Utc};
/// use paddle_alerts_core::converters::{parse_timestamp, ConverterRegistry};
///
/// fn lenient_timestamp(value: &str) -> Option<DateTime<Utc>> {
///     parse_timestamp(value.trim())
/// }
///
/// let registry = ConverterRegistry::default().with_timestamp(lenient_timestamp);
/// assert!(registry.timestamp(" 2022-06-03 ").is_some());
/// ```
#[derive(Clone, Copy)]
pub struct ConverterRegistry {
    timestamp: Converter<DateTime<Utc>>,
    subscription_status: Converter<SubscriptionStatus>,
    refund_type: Converter<RefundType>,
}

impl ConverterRegistry {
    /// Create a registry with the standard conversions.
    pub fn new() -> Self {
        Self {
            timestamp: parse_timestamp,
            subscription_status: parse_subscription_status,
            refund_type: parse_refund_type,
        }
    }

    /// Register the timestamp conversion.
    pub fn with_timestamp(mut self, convert: Converter<DateTime<Utc>>) -> Self {
        self.timestamp = convert;
        self
    }

    /// Register the subscription status conversion.
    pub fn with_subscription_status(mut self, convert: Converter<SubscriptionStatus>) -> Self {
        self.subscription_status = convert;
        self
    }

    /// Register the refund type conversion.
    pub fn with_refund_type(mut self, convert: Converter<RefundType>) -> Self {
        self.refund_type = convert;
        self
    }

    /// Convert a raw timestamp value.
    pub fn timestamp(&self, value: &str) -> Option<DateTime<Utc>> {
        (self.timestamp)(value)
    }

    /// Convert a raw subscription status value.
    pub fn subscription_status(&self, value: &str) -> Option<SubscriptionStatus> {
        (self.subscription_status)(value)
    }

    /// Convert a raw refund type value.
    pub fn refund_type(&self, value: &str) -> Option<RefundType> {
        (self.refund_type)(value)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "converters_tests.rs"]
mod tests;

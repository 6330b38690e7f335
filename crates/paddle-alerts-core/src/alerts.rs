//! Typed alert records.
//!
//! Each supported `alert_name` has one record type here, populated by an
//! explicit [`FromFields`] implementation. Attribute types follow the wire
//! data:
//!
//! | Wire data                      | Rust type                    | When absent |
//! |--------------------------------|------------------------------|-------------|
//! | always-sent string             | `String`                     | `""`        |
//! | sometimes-sent string          | `Option<String>`             | `None`      |
//! | identifier                     | `u64`                        | `0`         |
//! | count                          | `i64`                        | `0`         |
//! | `0` / `1` flag                 | `bool`                       | `false`     |
//! | date or date-time              | `Option<DateTime<Utc>>`      | `None`      |
//! | free-form date or identifier   | `Option<String>`             | `None`      |
//! | subscription status / refund   | [`SubscriptionStatus`] / [`RefundType`] | `Unknown` |

use crate::converters::{RefundType, SubscriptionStatus};
use crate::decoder::{FieldReader, FromFields};
use crate::error::FieldDecodeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Alert Kinds
// ============================================================================

/// Supported alert types, one per [`Alert`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionCancelled,
    SubscriptionPaymentSucceeded,
    SubscriptionPaymentFailed,
    SubscriptionPaymentRefunded,
}

impl AlertKind {
    /// All supported kinds.
    pub const ALL: [AlertKind; 6] = [
        Self::SubscriptionCreated,
        Self::SubscriptionUpdated,
        Self::SubscriptionCancelled,
        Self::SubscriptionPaymentSucceeded,
        Self::SubscriptionPaymentFailed,
        Self::SubscriptionPaymentRefunded,
    ];

    /// The `alert_name` tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionCreated => "subscription_created",
            Self::SubscriptionUpdated => "subscription_updated",
            Self::SubscriptionCancelled => "subscription_cancelled",
            Self::SubscriptionPaymentSucceeded => "subscription_payment_succeeded",
            Self::SubscriptionPaymentFailed => "subscription_payment_failed",
            Self::SubscriptionPaymentRefunded => "subscription_payment_refunded",
        }
    }

    /// Look up a supported kind by its `alert_name` tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Alert
// ============================================================================

/// A verified, decoded alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    SubscriptionCreated(SubscriptionCreatedAlert),
    SubscriptionUpdated(SubscriptionUpdatedAlert),
    SubscriptionCancelled(SubscriptionCancelledAlert),
    SubscriptionPaymentSucceeded(SubscriptionPaymentSucceededAlert),
    SubscriptionPaymentFailed(SubscriptionPaymentFailedAlert),
    SubscriptionPaymentRefunded(SubscriptionPaymentRefundedAlert),
}

impl Alert {
    /// Kind of this alert.
    pub fn kind(&self) -> AlertKind {
        match self {
            Self::SubscriptionCreated(_) => AlertKind::SubscriptionCreated,
            Self::SubscriptionUpdated(_) => AlertKind::SubscriptionUpdated,
            Self::SubscriptionCancelled(_) => AlertKind::SubscriptionCancelled,
            Self::SubscriptionPaymentSucceeded(_) => AlertKind::SubscriptionPaymentSucceeded,
            Self::SubscriptionPaymentFailed(_) => AlertKind::SubscriptionPaymentFailed,
            Self::SubscriptionPaymentRefunded(_) => AlertKind::SubscriptionPaymentRefunded,
        }
    }

    /// Provider-assigned alert identifier.
    pub fn alert_id(&self) -> u64 {
        match self {
            Self::SubscriptionCreated(a) => a.alert_id,
            Self::SubscriptionUpdated(a) => a.alert_id,
            Self::SubscriptionCancelled(a) => a.alert_id,
            Self::SubscriptionPaymentSucceeded(a) => a.alert_id,
            Self::SubscriptionPaymentFailed(a) => a.alert_id,
            Self::SubscriptionPaymentRefunded(a) => a.alert_id,
        }
    }

    /// When the provider recorded the event.
    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::SubscriptionCreated(a) => a.event_time,
            Self::SubscriptionUpdated(a) => a.event_time,
            Self::SubscriptionCancelled(a) => a.event_time,
            Self::SubscriptionPaymentSucceeded(a) => a.event_time,
            Self::SubscriptionPaymentFailed(a) => a.event_time,
            Self::SubscriptionPaymentRefunded(a) => a.event_time,
        }
    }

    /// Subscription the alert refers to, as sent on the wire.
    ///
    /// Cancellations carry the identifier as free text, which may be absent.
    pub fn subscription_id(&self) -> Option<String> {
        match self {
            Self::SubscriptionCreated(a) => Some(a.subscription_id.to_string()),
            Self::SubscriptionUpdated(a) => Some(a.subscription_id.to_string()),
            Self::SubscriptionCancelled(a) => a.subscription_id.clone(),
            Self::SubscriptionPaymentSucceeded(a) => Some(a.subscription_id.to_string()),
            Self::SubscriptionPaymentFailed(a) => Some(a.subscription_id.to_string()),
            Self::SubscriptionPaymentRefunded(a) => Some(a.subscription_id.to_string()),
        }
    }

    /// Value passed through from the checkout, usually an application id.
    pub fn passthrough(&self) -> Option<&str> {
        match self {
            Self::SubscriptionCreated(a) => a.passthrough.as_deref(),
            Self::SubscriptionUpdated(a) => a.passthrough.as_deref(),
            Self::SubscriptionCancelled(a) => a.passthrough.as_deref(),
            Self::SubscriptionPaymentSucceeded(a) => a.passthrough.as_deref(),
            Self::SubscriptionPaymentFailed(a) => a.passthrough.as_deref(),
            Self::SubscriptionPaymentRefunded(a) => a.passthrough.as_deref(),
        }
    }

    /// Build the variant for `kind` from verified fields.
    pub(crate) fn from_fields(
        kind: AlertKind,
        reader: &FieldReader<'_>,
    ) -> Result<Self, FieldDecodeError> {
        Ok(match kind {
            AlertKind::SubscriptionCreated => {
                Self::SubscriptionCreated(SubscriptionCreatedAlert::from_fields(reader)?)
            }
            AlertKind::SubscriptionUpdated => {
                Self::SubscriptionUpdated(SubscriptionUpdatedAlert::from_fields(reader)?)
            }
            AlertKind::SubscriptionCancelled => {
                Self::SubscriptionCancelled(SubscriptionCancelledAlert::from_fields(reader)?)
            }
            AlertKind::SubscriptionPaymentSucceeded => Self::SubscriptionPaymentSucceeded(
                SubscriptionPaymentSucceededAlert::from_fields(reader)?,
            ),
            AlertKind::SubscriptionPaymentFailed => Self::SubscriptionPaymentFailed(
                SubscriptionPaymentFailedAlert::from_fields(reader)?,
            ),
            AlertKind::SubscriptionPaymentRefunded => Self::SubscriptionPaymentRefunded(
                SubscriptionPaymentRefundedAlert::from_fields(reader)?,
            ),
        })
    }
}

// ============================================================================
// Subscription Created
// ============================================================================

/// Fired when a new subscription is created and the customer has
/// successfully subscribed.
///
/// See <https://developer.paddle.com/webhook-reference/subscription-alerts/subscription-created>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionCreatedAlert {
    pub alert_name: String,
    pub alert_id: u64,
    pub cancel_url: String,
    pub checkout_id: Option<String>,
    pub currency: Option<String>,
    pub email: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
    pub marketing_consent: bool,
    pub next_bill_date: Option<DateTime<Utc>>,
    pub passthrough: Option<String>,
    pub quantity: Option<String>,
    pub source: Option<String>,
    pub status: SubscriptionStatus,
    pub subscription_id: u64,
    pub subscription_plan_id: u64,
    pub unit_price: Option<String>,
    pub user_id: u64,
    pub update_url: Option<String>,
}

impl FromFields for SubscriptionCreatedAlert {
    fn from_fields(r: &FieldReader<'_>) -> Result<Self, FieldDecodeError> {
        Ok(Self {
            alert_name: r.string("alert_name"),
            alert_id: r.unsigned("alert_id")?,
            cancel_url: r.string("cancel_url"),
            checkout_id: r.optional_string("checkout_id"),
            currency: r.optional_string("currency"),
            email: r.optional_string("email"),
            event_time: r.timestamp("event_time"),
            marketing_consent: r.boolean("marketing_consent")?,
            next_bill_date: r.timestamp("next_bill_date"),
            passthrough: r.optional_string("passthrough"),
            quantity: r.optional_string("quantity"),
            source: r.optional_string("source"),
            status: r.subscription_status("status"),
            subscription_id: r.unsigned("subscription_id")?,
            subscription_plan_id: r.unsigned("subscription_plan_id")?,
            unit_price: r.optional_string("unit_price"),
            user_id: r.unsigned("user_id")?,
            update_url: r.optional_string("update_url"),
        })
    }
}

// ============================================================================
// Subscription Updated
// ============================================================================

/// Fired when the plan, price, quantity or status of an existing
/// subscription changes, or when the payment date is rescheduled manually.
///
/// See <https://developer.paddle.com/webhook-reference/subscription-alerts/subscription-updated>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionUpdatedAlert {
    pub alert_name: String,
    pub alert_id: u64,
    pub cancel_url: String,
    pub checkout_id: Option<String>,
    pub email: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
    pub marketing_consent: bool,
    pub new_price: Option<String>,
    pub new_quantity: Option<String>,
    pub new_unit_price: Option<String>,
    pub next_bill_date: Option<DateTime<Utc>>,
    pub old_price: Option<String>,
    pub old_quantity: Option<String>,
    pub old_unit_price: Option<String>,
    pub currency: Option<String>,
    pub passthrough: Option<String>,
    pub status: SubscriptionStatus,
    pub subscription_id: u64,
    pub subscription_plan_id: u64,
    pub user_id: u64,
    pub update_url: String,
    pub old_next_bill_date: Option<DateTime<Utc>>,
    pub old_status: SubscriptionStatus,
    pub old_subscription_plan_id: Option<String>,
    pub paused_at: Option<String>,
    pub paused_from: Option<String>,
    pub paused_reason: Option<String>,
}

impl FromFields for SubscriptionUpdatedAlert {
    fn from_fields(r: &FieldReader<'_>) -> Result<Self, FieldDecodeError> {
        Ok(Self {
            alert_name: r.string("alert_name"),
            alert_id: r.unsigned("alert_id")?,
            cancel_url: r.string("cancel_url"),
            checkout_id: r.optional_string("checkout_id"),
            email: r.optional_string("email"),
            event_time: r.timestamp("event_time"),
            marketing_consent: r.boolean("marketing_consent")?,
            new_price: r.optional_string("new_price"),
            new_quantity: r.optional_string("new_quantity"),
            new_unit_price: r.optional_string("new_unit_price"),
            next_bill_date: r.timestamp("next_bill_date"),
            old_price: r.optional_string("old_price"),
            old_quantity: r.optional_string("old_quantity"),
            old_unit_price: r.optional_string("old_unit_price"),
            currency: r.optional_string("currency"),
            passthrough: r.optional_string("passthrough"),
            status: r.subscription_status("status"),
            subscription_id: r.unsigned("subscription_id")?,
            subscription_plan_id: r.unsigned("subscription_plan_id")?,
            user_id: r.unsigned("user_id")?,
            update_url: r.string("update_url"),
            old_next_bill_date: r.timestamp("old_next_bill_date"),
            old_status: r.subscription_status("old_status"),
            old_subscription_plan_id: r.optional_string("old_subscription_plan_id"),
            paused_at: r.optional_string("paused_at"),
            paused_from: r.optional_string("paused_from"),
            paused_reason: r.optional_string("paused_reason"),
        })
    }
}

// ============================================================================
// Subscription Cancelled
// ============================================================================

/// Fired whenever a user cancels a subscription.
///
/// See <https://developer.paddle.com/webhook-reference/subscription-alerts/subscription-cancelled>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionCancelledAlert {
    pub alert_name: String,
    pub alert_id: u64,
    pub cancellation_effective_date: Option<DateTime<Utc>>,
    pub checkout_id: Option<String>,
    pub currency: Option<String>,
    pub email: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
    pub marketing_consent: bool,
    pub passthrough: Option<String>,
    pub quantity: Option<String>,
    pub status: SubscriptionStatus,
    pub subscription_id: Option<String>,
    pub subscription_plan_id: Option<String>,
    pub unit_price: Option<String>,
    pub user_id: u64,
}

impl FromFields for SubscriptionCancelledAlert {
    fn from_fields(r: &FieldReader<'_>) -> Result<Self, FieldDecodeError> {
        Ok(Self {
            alert_name: r.string("alert_name"),
            alert_id: r.unsigned("alert_id")?,
            cancellation_effective_date: r.timestamp("cancellation_effective_date"),
            checkout_id: r.optional_string("checkout_id"),
            currency: r.optional_string("currency"),
            email: r.optional_string("email"),
            event_time: r.timestamp("event_time"),
            marketing_consent: r.boolean("marketing_consent")?,
            passthrough: r.optional_string("passthrough"),
            quantity: r.optional_string("quantity"),
            status: r.subscription_status("status"),
            subscription_id: r.optional_string("subscription_id"),
            subscription_plan_id: r.optional_string("subscription_plan_id"),
            unit_price: r.optional_string("unit_price"),
            user_id: r.unsigned("user_id")?,
        })
    }
}

// ============================================================================
// Subscription Payment Succeeded
// ============================================================================

/// Fired when a subscription payment is received successfully.
///
/// See <https://developer.paddle.com/webhook-reference/subscription-alerts/subscription-payment-succeeded>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPaymentSucceededAlert {
    pub alert_name: String,
    pub alert_id: u64,
    pub balance_currency: Option<String>,
    pub balance_earnings: Option<String>,
    pub balance_fee: Option<String>,
    pub balance_gross: Option<String>,
    pub balance_tax: Option<String>,
    pub checkout_id: Option<String>,
    pub country: Option<String>,
    pub coupon: Option<String>,
    pub currency: Option<String>,
    pub customer_name: Option<String>,
    pub earnings: Option<String>,
    pub email: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
    pub fee: Option<String>,
    pub initial_payment: bool,
    pub instalments: i64,
    pub marketing_consent: bool,
    pub next_bill_date: Option<String>,
    pub next_payment_amount: Option<String>,
    pub order_id: Option<String>,
    pub passthrough: Option<String>,
    pub payment_method: Option<String>,
    pub payment_tax: Option<String>,
    pub plan_name: Option<String>,
    pub quantity: Option<String>,
    pub receipt_url: Option<String>,
    pub sale_gross: Option<String>,
    pub status: SubscriptionStatus,
    pub subscription_id: u64,
    pub subscription_payment_id: u64,
    pub subscription_plan_id: u64,
    pub unit_price: Option<String>,
    pub user_id: u64,
}

impl FromFields for SubscriptionPaymentSucceededAlert {
    fn from_fields(r: &FieldReader<'_>) -> Result<Self, FieldDecodeError> {
        Ok(Self {
            alert_name: r.string("alert_name"),
            alert_id: r.unsigned("alert_id")?,
            balance_currency: r.optional_string("balance_currency"),
            balance_earnings: r.optional_string("balance_earnings"),
            balance_fee: r.optional_string("balance_fee"),
            balance_gross: r.optional_string("balance_gross"),
            balance_tax: r.optional_string("balance_tax"),
            checkout_id: r.optional_string("checkout_id"),
            country: r.optional_string("country"),
            coupon: r.optional_string("coupon"),
            currency: r.optional_string("currency"),
            customer_name: r.optional_string("customer_name"),
            earnings: r.optional_string("earnings"),
            email: r.optional_string("email"),
            event_time: r.timestamp("event_time"),
            fee: r.optional_string("fee"),
            initial_payment: r.boolean("initial_payment")?,
            instalments: r.integer("instalments")?,
            marketing_consent: r.boolean("marketing_consent")?,
            next_bill_date: r.optional_string("next_bill_date"),
            next_payment_amount: r.optional_string("next_payment_amount"),
            order_id: r.optional_string("order_id"),
            passthrough: r.optional_string("passthrough"),
            payment_method: r.optional_string("payment_method"),
            payment_tax: r.optional_string("payment_tax"),
            plan_name: r.optional_string("plan_name"),
            quantity: r.optional_string("quantity"),
            receipt_url: r.optional_string("receipt_url"),
            sale_gross: r.optional_string("sale_gross"),
            status: r.subscription_status("status"),
            subscription_id: r.unsigned("subscription_id")?,
            subscription_payment_id: r.unsigned("subscription_payment_id")?,
            subscription_plan_id: r.unsigned("subscription_plan_id")?,
            unit_price: r.optional_string("unit_price"),
            user_id: r.unsigned("user_id")?,
        })
    }
}

// ============================================================================
// Subscription Payment Failed
// ============================================================================

/// Fired when a payment for an existing subscription fails.
///
/// See <https://developer.paddle.com/webhook-reference/subscription-alerts/subscription-payment-failed>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPaymentFailedAlert {
    pub alert_name: String,
    pub alert_id: u64,
    pub amount: Option<String>,
    pub cancel_url: String,
    pub checkout_id: Option<String>,
    pub currency: Option<String>,
    pub email: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
    pub marketing_consent: bool,
    pub next_retry_date: Option<DateTime<Utc>>,
    pub passthrough: Option<String>,
    pub quantity: Option<String>,
    pub status: SubscriptionStatus,
    pub subscription_id: u64,
    pub subscription_plan_id: u64,
    pub unit_price: Option<String>,
    pub update_url: String,
    pub subscription_payment_id: u64,
    pub instalments: i64,
    pub order_id: Option<String>,
    pub user_id: u64,
    pub attempt_number: Option<String>,
}

impl FromFields for SubscriptionPaymentFailedAlert {
    fn from_fields(r: &FieldReader<'_>) -> Result<Self, FieldDecodeError> {
        Ok(Self {
            alert_name: r.string("alert_name"),
            alert_id: r.unsigned("alert_id")?,
            amount: r.optional_string("amount"),
            cancel_url: r.string("cancel_url"),
            checkout_id: r.optional_string("checkout_id"),
            currency: r.optional_string("currency"),
            email: r.optional_string("email"),
            event_time: r.timestamp("event_time"),
            marketing_consent: r.boolean("marketing_consent")?,
            next_retry_date: r.timestamp("next_retry_date"),
            passthrough: r.optional_string("passthrough"),
            quantity: r.optional_string("quantity"),
            status: r.subscription_status("status"),
            subscription_id: r.unsigned("subscription_id")?,
            subscription_plan_id: r.unsigned("subscription_plan_id")?,
            unit_price: r.optional_string("unit_price"),
            update_url: r.string("update_url"),
            subscription_payment_id: r.unsigned("subscription_payment_id")?,
            instalments: r.integer("instalments")?,
            order_id: r.optional_string("order_id"),
            user_id: r.unsigned("user_id")?,
            attempt_number: r.optional_string("attempt_number"),
        })
    }
}

// ============================================================================
// Subscription Payment Refunded
// ============================================================================

/// Fired when a refund for an existing subscription payment is issued.
///
/// See <https://developer.paddle.com/webhook-reference/4974afe939abc-subscription-payment-refunded>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPaymentRefundedAlert {
    pub alert_name: String,
    pub alert_id: u64,
    pub amount: Option<String>,
    pub balance_currency: Option<String>,
    pub balance_earnings_decrease: Option<String>,
    pub balance_fee_refund: Option<String>,
    pub balance_gross_refund: Option<String>,
    pub balance_tax_refund: Option<String>,
    pub checkout_id: Option<String>,
    pub currency: Option<String>,
    pub custom_data: Option<String>,
    pub earnings_decrease: Option<String>,
    pub email: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
    pub fee_refund: Option<String>,
    pub gross_refund: Option<String>,
    pub initial_payment: bool,
    pub instalments: i64,
    pub marketing_consent: bool,
    pub order_id: Option<String>,
    pub passthrough: Option<String>,
    pub quantity: Option<String>,
    pub refund_reason: Option<String>,
    pub refund_type: RefundType,
    pub status: SubscriptionStatus,
    pub subscription_id: u64,
    pub subscription_payment_id: u64,
    pub subscription_plan_id: u64,
    pub tax_refund: Option<String>,
    pub unit_price: Option<String>,
    pub user_id: u64,
}

impl FromFields for SubscriptionPaymentRefundedAlert {
    fn from_fields(r: &FieldReader<'_>) -> Result<Self, FieldDecodeError> {
        Ok(Self {
            alert_name: r.string("alert_name"),
            alert_id: r.unsigned("alert_id")?,
            amount: r.optional_string("amount"),
            balance_currency: r.optional_string("balance_currency"),
            balance_earnings_decrease: r.optional_string("balance_earnings_decrease"),
            balance_fee_refund: r.optional_string("balance_fee_refund"),
            balance_gross_refund: r.optional_string("balance_gross_refund"),
            balance_tax_refund: r.optional_string("balance_tax_refund"),
            checkout_id: r.optional_string("checkout_id"),
            currency: r.optional_string("currency"),
            custom_data: r.optional_string("custom_data"),
            earnings_decrease: r.optional_string("earnings_decrease"),
            email: r.optional_string("email"),
            event_time: r.timestamp("event_time"),
            fee_refund: r.optional_string("fee_refund"),
            gross_refund: r.optional_string("gross_refund"),
            initial_payment: r.boolean("initial_payment")?,
            instalments: r.integer("instalments")?,
            marketing_consent: r.boolean("marketing_consent")?,
            order_id: r.optional_string("order_id"),
            passthrough: r.optional_string("passthrough"),
            quantity: r.optional_string("quantity"),
            refund_reason: r.optional_string("refund_reason"),
            refund_type: r.refund_type("refund_type"),
            status: r.subscription_status("status"),
            subscription_id: r.unsigned("subscription_id")?,
            subscription_payment_id: r.unsigned("subscription_payment_id")?,
            subscription_plan_id: r.unsigned("subscription_plan_id")?,
            tax_refund: r.optional_string("tax_refund"),
            unit_price: r.optional_string("unit_price"),
            user_id: r.unsigned("user_id")?,
        })
    }
}

#[cfg(test)]
#[path = "alerts_tests.rs"]
mod tests;

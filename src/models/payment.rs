//! Payment models shared by the checkout flow and the payment collaborators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BillingPeriod, Guest};

/// How the guest pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment through the card processor.
    Card,
    /// Bank transfer through the ACH processor.
    Ach,
}

/// What a card charge pays for. Carried in payment metadata so that the
/// asynchronous confirmation knows how to follow up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    /// A short stay paid in full up front.
    ShortTermFullPayment,
    /// The first billing period of a long-term stay.
    LongTermFirstPayment,
    /// A later billing period of a long-term stay.
    RecurringPayment,
}

/// Metadata attached to a card payment intent and echoed back in webhook events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    /// What the charge pays for.
    pub kind: ChargeKind,
    /// Backend room id.
    pub room_id: u32,
    /// Room slug.
    pub room_slug: String,
    /// Check-in date.
    pub arrival: NaiveDate,
    /// Check-out date.
    pub departure: NaiveDate,
    /// Guest count.
    pub guests: u32,
    /// The booking guest.
    pub guest: Guest,
    /// Number of billing periods, for long-term stays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_periods: Option<u32>,
    /// Periods 2..N still to be charged, for long-term first payments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remaining_schedule: Vec<BillingPeriod>,
    /// The period a recurring charge covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_number: Option<u32>,
}

/// A future off-session card charge for one billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledCharge {
    /// Card processor customer id.
    pub customer_id: String,
    /// Saved card to charge.
    pub payment_method_id: String,
    /// Room slug.
    pub room_slug: String,
    /// Billing period number.
    pub period_number: u32,
    /// When the charge should run.
    pub scheduled_date: NaiveDate,
    /// First night of the period.
    pub period_start: NaiveDate,
    /// Last night of the period.
    pub period_end: NaiveDate,
    /// Nights in the period.
    pub nights: u32,
    /// Amount to charge, in cents.
    pub amount_cents: i64,
}

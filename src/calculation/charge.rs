//! Charge selection.
//!
//! Picks what to actually charge from a [`PricingBreakdown`]. Short stays are
//! charged in full; long-term stays are charged for their first billing
//! period now and the remaining periods later.

use rust_decimal::Decimal;

use crate::models::{BillingPeriod, ChargeKind, PaymentMethod, PricingBreakdown};

/// Returns the amount to charge now for the given payment method.
///
/// | Stay | Card | ACH |
/// |---|---|---|
/// | short | `total_with_cc_fee` | `total_ach` |
/// | long-term | period 1 `total_with_cc_fee` | period 1 `total` |
///
/// For short stays the card surcharge is zero, so both methods charge the
/// same amount.
///
/// # Examples
///
/// ```
/// use stay_pricing::calculation::{charge_amount, compute_breakdown};
/// use stay_pricing::config::PricingPolicy;
/// use stay_pricing::models::{nightly_rates_from, PaymentMethod};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let arrival = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let nights = nightly_rates_from(arrival, &[Decimal::from(50); 45]);
/// let breakdown = compute_breakdown(&nights, &PricingPolicy::new(Decimal::new(8, 2)), None);
///
/// assert_eq!(charge_amount(&breakdown, PaymentMethod::Card), Decimal::from(1545));
/// assert_eq!(charge_amount(&breakdown, PaymentMethod::Ach), Decimal::from(1500));
/// ```
pub fn charge_amount(breakdown: &PricingBreakdown, method: PaymentMethod) -> Decimal {
    let first_period = breakdown
        .is_long_term
        .then(|| breakdown.first_period())
        .flatten();

    match (method, first_period) {
        (PaymentMethod::Card, Some(period)) => period.total_with_cc_fee,
        (PaymentMethod::Card, None) => breakdown.total_with_cc_fee,
        (PaymentMethod::Ach, Some(period)) => period.total,
        (PaymentMethod::Ach, None) => breakdown.total_ach,
    }
}

/// Classifies the charge made at booking time.
pub fn charge_kind(breakdown: &PricingBreakdown) -> ChargeKind {
    if breakdown.is_long_term {
        ChargeKind::LongTermFirstPayment
    } else {
        ChargeKind::ShortTermFullPayment
    }
}

/// Returns billing periods 2..N, the ones charged after booking.
pub fn remaining_periods(breakdown: &PricingBreakdown) -> &[BillingPeriod] {
    breakdown.billing_periods().get(1..).unwrap_or(&[])
}

/// True when a long-term stay will have charges after the first.
pub fn is_recurring(breakdown: &PricingBreakdown) -> bool {
    breakdown.is_long_term && breakdown.total_periods() > 1
}

//! Monthly billing schedule for long-term stays.
//!
//! A long-term stay is not charged in one go. Its nights are split, in order,
//! into consecutive billing periods of one cycle each (30 nights by default);
//! the last period takes whatever is left. Period 1 is charged at booking and
//! the rest become recurring charges.
//!
//! Period boundaries come purely from list position. The dates in the
//! schedule are copied from the first and last entry of each chunk and are
//! only meaningful if the caller supplied contiguous dates.

use rust_decimal::Decimal;

use crate::config::PricingPolicy;
use crate::models::{BillingPeriod, NightlyRate};

use super::calculate_card_fee;

/// Splits a long-term stay into billing periods.
///
/// Each period is tax-exempt, so its `total` equals its `subtotal`, and its
/// card total adds the policy's card surcharge, rounded to cents per period.
/// `is_prorated` is set only on a period after the first that is shorter
/// than a full cycle.
///
/// Returns an empty schedule for an empty input.
///
/// # Examples
///
/// ```
/// use stay_pricing::calculation::build_billing_schedule;
/// use stay_pricing::config::PricingPolicy;
/// use stay_pricing::models::nightly_rates_from;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let arrival = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
/// let nights = nightly_rates_from(arrival, &[Decimal::from(50); 45]);
/// let schedule = build_billing_schedule(&nights, &PricingPolicy::new(Decimal::new(8, 2)));
///
/// assert_eq!(schedule.len(), 2);
/// assert_eq!(schedule[0].nights, 30);
/// assert_eq!(schedule[0].total_with_cc_fee, Decimal::from(1545));
/// assert_eq!(schedule[1].nights, 15);
/// assert!(schedule[1].is_prorated);
/// assert_eq!(schedule[1].total_with_cc_fee, Decimal::from_str("772.50").unwrap());
/// ```
pub fn build_billing_schedule(
    nightly_rates: &[NightlyRate],
    policy: &PricingPolicy,
) -> Vec<BillingPeriod> {
    // A zero-night cycle would never advance; treat it as one night.
    let cycle = policy.billing_cycle_nights.max(1) as usize;

    nightly_rates
        .chunks(cycle)
        .zip(1u32..)
        .map(|(chunk, period_number)| {
            let subtotal: Decimal = chunk.iter().map(|night| night.rate).sum();
            let total = subtotal;
            let cc_fee_amount = calculate_card_fee(total, policy.cc_fee_rate);

            // chunks() never yields an empty slice
            let start_date = chunk[0].date;
            let end_date = chunk[chunk.len() - 1].date;

            BillingPeriod {
                period_number,
                start_date,
                end_date,
                nights: chunk.len() as u32,
                subtotal,
                tax_amount: Decimal::ZERO,
                total,
                total_with_cc_fee: total + cc_fee_amount,
                is_first_payment: period_number == 1,
                is_prorated: period_number > 1 && chunk.len() < cycle,
            }
        })
        .collect()
}

//! The pricing engine entry point.
//!
//! [`compute_breakdown`] turns a stay's nightly rates into a
//! [`PricingBreakdown`]. It is a pure function: no I/O, no logging, no
//! shared state. The checkout quote and both payment endpoints call it with
//! the same nightly rates and policy, so the quoted and charged amounts
//! always agree.

use rust_decimal::Decimal;

use crate::config::PricingPolicy;
use crate::models::{NightlyRate, PricingBreakdown};

use super::{
    applicable_tax_rate, build_billing_schedule, calculate_card_fee, calculate_tax,
    card_fee_percent,
};

/// Returns true when a stay of `nights` nights is long-term under `policy`.
///
/// The threshold is inclusive.
///
/// ```
/// use stay_pricing::calculation::is_long_term_stay;
/// use stay_pricing::config::PricingPolicy;
/// use rust_decimal::Decimal;
///
/// let policy = PricingPolicy::new(Decimal::new(8, 2));
/// assert!(!is_long_term_stay(29, &policy));
/// assert!(is_long_term_stay(30, &policy));
/// ```
pub fn is_long_term_stay(nights: usize, policy: &PricingPolicy) -> bool {
    nights >= policy.long_term_threshold as usize
}

/// Computes the full price breakdown for a stay.
///
/// # Arguments
///
/// * `nightly_rates` - One entry per night, in chronological order
/// * `policy` - Tax rate, long-term threshold, card fee and billing cycle
/// * `tax_rate_override` - Replaces the policy tax rate for short stays
///
/// # Returns
///
/// A [`PricingBreakdown`] where:
/// - `subtotal` is the exact sum of the nightly rates
/// - `tax_amount` and `cc_fee_amount` are rounded to cents; nothing else is
/// - long-term stays are tax-exempt, carry the card surcharge and have a
///   billing schedule
/// - short stays are taxed, carry no card surcharge and have no schedule
/// - `total_ach` always equals `total_before_fees`
///
/// An empty input prices as zero nights with zero totals.
///
/// # Examples
///
/// ## Short stay
///
/// ```
/// use stay_pricing::calculation::compute_breakdown;
/// use stay_pricing::config::PricingPolicy;
/// use stay_pricing::models::nightly_rates_from;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let arrival = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
/// let nights = nightly_rates_from(arrival, &[Decimal::from(100); 3]);
/// let breakdown = compute_breakdown(&nights, &PricingPolicy::new(Decimal::new(10, 2)), None);
///
/// assert_eq!(breakdown.subtotal, Decimal::from(300));
/// assert_eq!(breakdown.tax_amount, Decimal::from(30));
/// assert_eq!(breakdown.total_with_cc_fee, Decimal::from(330));
/// assert_eq!(breakdown.total_ach, Decimal::from(330));
/// ```
///
/// ## Long-term stay
///
/// ```
/// use stay_pricing::calculation::compute_breakdown;
/// use stay_pricing::config::PricingPolicy;
/// use stay_pricing::models::nightly_rates_from;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let arrival = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
/// let nights = nightly_rates_from(arrival, &[Decimal::from(50); 45]);
/// let breakdown = compute_breakdown(&nights, &PricingPolicy::new(Decimal::new(10, 2)), None);
///
/// assert!(breakdown.is_long_term);
/// assert_eq!(breakdown.tax_amount, Decimal::ZERO);
/// assert_eq!(breakdown.total_periods(), 2);
/// ```
pub fn compute_breakdown(
    nightly_rates: &[NightlyRate],
    policy: &PricingPolicy,
    tax_rate_override: Option<Decimal>,
) -> PricingBreakdown {
    let nights = nightly_rates.len();
    let is_long_term = is_long_term_stay(nights, policy);
    let tax_rate = applicable_tax_rate(is_long_term, policy, tax_rate_override);

    let subtotal: Decimal = nightly_rates.iter().map(|night| night.rate).sum();
    let tax_amount = calculate_tax(subtotal, tax_rate);
    let total_before_fees = subtotal + tax_amount;

    let cc_fee_percent = card_fee_percent(is_long_term, policy);
    let cc_fee_amount = calculate_card_fee(total_before_fees, cc_fee_percent);

    let billing_schedule = is_long_term.then(|| build_billing_schedule(nightly_rates, policy));

    PricingBreakdown {
        nights: nights as u32,
        nightly_rates: nightly_rates.to_vec(),
        subtotal,
        tax_rate,
        tax_amount,
        total_before_fees,
        cc_fee_percent,
        cc_fee_amount,
        total_with_cc_fee: total_before_fees + cc_fee_amount,
        total_ach: total_before_fees,
        is_long_term,
        billing_schedule,
    }
}

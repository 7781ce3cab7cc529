//! Lodging tax.
//!
//! Short stays are taxed at the property's jurisdiction rate (or a caller
//! override). Long-term stays are exempt, unconditionally.

use rust_decimal::Decimal;

use crate::config::PricingPolicy;

use super::round_to_cents;

/// Returns the tax rate that applies to a stay.
///
/// # Arguments
///
/// * `is_long_term` - Whether the stay meets the long-term threshold
/// * `policy` - The property's pricing policy
/// * `tax_rate_override` - Replaces the policy's rate for short stays only
///
/// # Examples
///
/// ```
/// use stay_pricing::calculation::applicable_tax_rate;
/// use stay_pricing::config::PricingPolicy;
/// use rust_decimal::Decimal;
///
/// let policy = PricingPolicy::new(Decimal::new(8, 2));
///
/// assert_eq!(applicable_tax_rate(false, &policy, None), Decimal::new(8, 2));
/// assert_eq!(applicable_tax_rate(false, &policy, Some(Decimal::new(5, 2))), Decimal::new(5, 2));
/// assert_eq!(applicable_tax_rate(true, &policy, Some(Decimal::new(5, 2))), Decimal::ZERO);
/// ```
pub fn applicable_tax_rate(
    is_long_term: bool,
    policy: &PricingPolicy,
    tax_rate_override: Option<Decimal>,
) -> Decimal {
    if is_long_term {
        Decimal::ZERO
    } else {
        tax_rate_override.unwrap_or(policy.tax_rate)
    }
}

/// Tax on `subtotal` at `tax_rate`, rounded to cents.
pub fn calculate_tax(subtotal: Decimal, tax_rate: Decimal) -> Decimal {
    round_to_cents(subtotal * tax_rate)
}

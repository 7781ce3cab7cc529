//! Pricing breakdown and billing period models.
//!
//! This module contains the [`PricingBreakdown`] produced by the pricing
//! engine and the [`BillingPeriod`] entries that make up the recurring
//! billing schedule of a long-term stay.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::NightlyRate;

/// One charge cycle within a long-term stay.
///
/// Periods are emitted in order, each covering up to one billing cycle of
/// nights. Only a final period shorter than the cycle that is not also the
/// first period is prorated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// 1-based sequence number of this period.
    pub period_number: u32,
    /// The first night covered by this period.
    pub start_date: NaiveDate,
    /// The last night covered by this period.
    pub end_date: NaiveDate,
    /// The number of nights covered.
    pub nights: u32,
    /// Sum of the nightly rates in this period.
    pub subtotal: Decimal,
    /// Tax for this period. Always zero; long-term stays are tax-exempt.
    pub tax_amount: Decimal,
    /// The amount due by bank transfer.
    pub total: Decimal,
    /// The amount due by card, including the card-processing fee.
    pub total_with_cc_fee: Decimal,
    /// True for the period charged at booking time.
    pub is_first_payment: bool,
    /// True for a shortened final period.
    pub is_prorated: bool,
}

/// The full price of a stay, as computed by
/// [`compute_breakdown`](crate::calculation::compute_breakdown).
///
/// # Example
///
/// ```
/// use stay_pricing::calculation::compute_breakdown;
/// use stay_pricing::config::PricingPolicy;
/// use stay_pricing::models::nightly_rates_from;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let arrival = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
/// let nights = nightly_rates_from(arrival, &[Decimal::from(100); 3]);
/// let breakdown = compute_breakdown(&nights, &PricingPolicy::new(Decimal::new(10, 2)), None);
///
/// assert_eq!(breakdown.nights, 3);
/// assert!(!breakdown.is_long_term);
/// assert!(breakdown.billing_schedule.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    /// Number of nights in the stay.
    pub nights: u32,
    /// The nightly rates the breakdown was computed from.
    pub nightly_rates: Vec<NightlyRate>,
    /// Sum of all nightly rates, unrounded.
    pub subtotal: Decimal,
    /// The tax rate actually applied (zero for long-term stays).
    pub tax_rate: Decimal,
    /// Tax on the subtotal, rounded to cents.
    pub tax_amount: Decimal,
    /// Subtotal plus tax.
    pub total_before_fees: Decimal,
    /// The card-processing surcharge rate applied.
    pub cc_fee_percent: Decimal,
    /// The card-processing surcharge, rounded to cents.
    pub cc_fee_amount: Decimal,
    /// The amount charged when paying by card.
    pub total_with_cc_fee: Decimal,
    /// The amount charged when paying by bank transfer.
    pub total_ach: Decimal,
    /// True when the stay meets the long-term threshold.
    pub is_long_term: bool,
    /// Monthly billing schedule, present only for long-term stays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_schedule: Option<Vec<BillingPeriod>>,
}

impl PricingBreakdown {
    /// Returns the billing periods, or an empty slice for short stays.
    pub fn billing_periods(&self) -> &[BillingPeriod] {
        self.billing_schedule.as_deref().unwrap_or(&[])
    }

    /// Returns the period charged at booking time, if the stay has a schedule.
    pub fn first_period(&self) -> Option<&BillingPeriod> {
        self.billing_periods().first()
    }

    /// Returns the number of billing periods (zero for short stays).
    pub fn total_periods(&self) -> usize {
        self.billing_periods().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_short_stay_breakdown() -> PricingBreakdown {
        PricingBreakdown {
            nights: 1,
            nightly_rates: vec![NightlyRate::new(
                NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
                dec("100.00"),
            )],
            subtotal: dec("100.00"),
            tax_rate: dec("0.08"),
            tax_amount: dec("8.00"),
            total_before_fees: dec("108.00"),
            cc_fee_percent: Decimal::ZERO,
            cc_fee_amount: Decimal::ZERO,
            total_with_cc_fee: dec("108.00"),
            total_ach: dec("108.00"),
            is_long_term: false,
            billing_schedule: None,
        }
    }

    fn create_period(period_number: u32, nights: u32) -> BillingPeriod {
        BillingPeriod {
            period_number,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 30).unwrap(),
            nights,
            subtotal: dec("1500"),
            tax_amount: Decimal::ZERO,
            total: dec("1500"),
            total_with_cc_fee: dec("1545"),
            is_first_payment: period_number == 1,
            is_prorated: false,
        }
    }

    #[test]
    fn test_short_stay_omits_billing_schedule_in_json() {
        let json = serde_json::to_value(create_short_stay_breakdown()).unwrap();
        assert!(json.get("billing_schedule").is_none());
        assert_eq!(json["total_ach"], "108.00");
        assert_eq!(json["is_long_term"], false);
    }

    #[test]
    fn test_deserialize_without_billing_schedule() {
        let json = serde_json::to_string(&create_short_stay_breakdown()).unwrap();
        let breakdown: PricingBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(breakdown, create_short_stay_breakdown());
    }

    #[test]
    fn test_billing_periods_empty_for_short_stay() {
        let breakdown = create_short_stay_breakdown();
        assert!(breakdown.billing_periods().is_empty());
        assert!(breakdown.first_period().is_none());
        assert_eq!(breakdown.total_periods(), 0);
    }

    #[test]
    fn test_first_period_for_long_stay() {
        let mut breakdown = create_short_stay_breakdown();
        breakdown.is_long_term = true;
        breakdown.billing_schedule = Some(vec![create_period(1, 30), create_period(2, 15)]);

        assert_eq!(breakdown.total_periods(), 2);
        assert_eq!(breakdown.first_period().unwrap().period_number, 1);
        assert!(breakdown.first_period().unwrap().is_first_payment);
    }
}

//! Nightly rate model and validation.
//!
//! A stay is priced from an ordered list of [`NightlyRate`] entries, one per
//! night, starting at the arrival date. The pricing engine trusts the list
//! completely; [`validate_nightly_rates`] is what callers run first when the
//! list comes from an untrusted source such as a payment request body.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Highest rate accepted for a single night.
///
/// Keeps the stay subtotal, and the cents sent to payment processors, well
/// inside `Decimal` and `i64` range for any stay length.
pub const MAX_NIGHTLY_RATE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// The rate charged for the night starting on `date`.
///
/// # Example
///
/// ```
/// use stay_pricing::models::NightlyRate;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let night = NightlyRate::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), Decimal::new(12500, 2));
/// assert_eq!(night.rate.to_string(), "125.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NightlyRate {
    /// The calendar date the night starts on.
    pub date: NaiveDate,
    /// The currency amount charged for the night.
    pub rate: Decimal,
}

impl NightlyRate {
    /// Creates a nightly rate entry.
    pub fn new(date: NaiveDate, rate: Decimal) -> Self {
        Self { date, rate }
    }
}

/// Builds a contiguous run of nightly rates from `start`, one per entry in `rates`.
///
/// # Example
///
/// ```
/// use stay_pricing::models::nightly_rates_from;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
/// let nights = nightly_rates_from(start, &[Decimal::from(90), Decimal::from(95)]);
/// assert_eq!(nights[1].date, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
/// ```
pub fn nightly_rates_from(start: NaiveDate, rates: &[Decimal]) -> Vec<NightlyRate> {
    start
        .iter_days()
        .zip(rates.iter())
        .map(|(date, rate)| NightlyRate::new(date, *rate))
        .collect()
}

/// Checks a nightly-rate list against the stay it claims to price.
///
/// The list must be non-empty, hold exactly `expected_nights` entries, start
/// on `arrival`, advance one day per entry and carry rates between zero and
/// [`MAX_NIGHTLY_RATE`].
///
/// # Example
///
/// ```
/// use stay_pricing::models::{nightly_rates_from, validate_nightly_rates};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let arrival = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
/// let nights = nightly_rates_from(arrival, &[Decimal::from(100); 3]);
/// assert!(validate_nightly_rates(&nights, arrival, 3).is_ok());
/// assert!(validate_nightly_rates(&nights, arrival, 4).is_err());
/// ```
pub fn validate_nightly_rates(
    nightly_rates: &[NightlyRate],
    arrival: NaiveDate,
    expected_nights: usize,
) -> EngineResult<()> {
    if nightly_rates.is_empty() {
        return Err(EngineError::InvalidNightlyRates {
            message: "no nightly rates supplied".to_string(),
        });
    }

    if nightly_rates.len() != expected_nights {
        return Err(EngineError::InvalidNightlyRates {
            message: format!(
                "expected {} nightly rates, got {}",
                expected_nights,
                nightly_rates.len()
            ),
        });
    }

    for (expected_date, night) in arrival.iter_days().zip(nightly_rates) {
        if night.date != expected_date {
            return Err(EngineError::InvalidNightlyRates {
                message: format!(
                    "expected a rate for {}, found {}",
                    expected_date, night.date
                ),
            });
        }
        if night.rate < Decimal::ZERO {
            return Err(EngineError::InvalidNightlyRates {
                message: format!("negative rate {} on {}", night.rate, night.date),
            });
        }
        if night.rate > MAX_NIGHTLY_RATE {
            return Err(EngineError::InvalidNightlyRates {
                message: format!(
                    "rate {} on {} exceeds the maximum of {}",
                    night.rate, night.date, MAX_NIGHTLY_RATE
                ),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_deserialize_nightly_rate_from_string_amount() {
        let json = r#"{"date": "2026-02-14", "rate": "149.99"}"#;
        let night: NightlyRate = serde_json::from_str(json).unwrap();
        assert_eq!(night.date, date(2026, 2, 14));
        assert_eq!(night.rate, dec("149.99"));
    }

    #[test]
    fn test_serialize_rate_as_string() {
        let night = NightlyRate::new(date(2026, 2, 14), dec("80.50"));
        let json = serde_json::to_string(&night).unwrap();
        assert!(json.contains("\"rate\":\"80.50\""));
    }

    #[test]
    fn test_nightly_rates_from_crosses_month_end() {
        let nights = nightly_rates_from(date(2026, 2, 27), &[dec("1"), dec("2"), dec("3")]);
        let dates: Vec<_> = nights.iter().map(|n| n.date).collect();
        assert_eq!(dates, vec![date(2026, 2, 27), date(2026, 2, 28), date(2026, 3, 1)]);
    }

    #[test]
    fn test_validate_rejects_empty_list() {
        let result = validate_nightly_rates(&[], date(2026, 1, 1), 0);
        assert!(matches!(result, Err(EngineError::InvalidNightlyRates { .. })));
    }

    #[test]
    fn test_validate_rejects_gap_in_dates() {
        let nights = vec![
            NightlyRate::new(date(2026, 1, 1), dec("100")),
            NightlyRate::new(date(2026, 1, 3), dec("100")),
        ];
        match validate_nightly_rates(&nights, date(2026, 1, 1), 2) {
            Err(EngineError::InvalidNightlyRates { message }) => {
                assert!(message.contains("2026-01-02"));
            }
            other => panic!("Expected InvalidNightlyRates, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_wrong_start_date() {
        let nights = nightly_rates_from(date(2026, 1, 2), &[dec("100"); 2]);
        assert!(validate_nightly_rates(&nights, date(2026, 1, 1), 2).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_rate() {
        let nights = nightly_rates_from(date(2026, 1, 1), &[dec("100"), dec("-5")]);
        match validate_nightly_rates(&nights, date(2026, 1, 1), 2) {
            Err(EngineError::InvalidNightlyRates { message }) => {
                assert!(message.contains("negative"));
            }
            other => panic!("Expected InvalidNightlyRates, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_rates_that_would_overflow_the_subtotal() {
        let nights = nightly_rates_from(date(2026, 1, 1), &[Decimal::MAX, Decimal::MAX]);
        match validate_nightly_rates(&nights, date(2026, 1, 1), 2) {
            Err(EngineError::InvalidNightlyRates { message }) => {
                assert!(message.contains("exceeds the maximum"));
            }
            other => panic!("Expected InvalidNightlyRates, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_accepts_rate_at_maximum() {
        let nights = nightly_rates_from(date(2026, 1, 1), &[MAX_NIGHTLY_RATE, dec("100")]);
        assert!(validate_nightly_rates(&nights, date(2026, 1, 1), 2).is_ok());

        let nights = nightly_rates_from(
            date(2026, 1, 1),
            &[MAX_NIGHTLY_RATE + dec("0.01"), dec("100")],
        );
        assert!(validate_nightly_rates(&nights, date(2026, 1, 1), 2).is_err());
    }

    #[test]
    fn test_validate_accepts_zero_rate() {
        let nights = nightly_rates_from(date(2026, 1, 1), &[dec("0"), dec("100")]);
        assert!(validate_nightly_rates(&nights, date(2026, 1, 1), 2).is_ok());
    }
}

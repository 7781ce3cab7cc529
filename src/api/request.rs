//! Request types for the booking API.
//!
//! Query strings for the availability and checkout endpoints and JSON bodies
//! for the payment endpoints. Dates are accepted as `YYYY-MM-DD` or
//! `YYYYMMDD`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{BankAccount, Guest, NightlyRate, StayRequest};

/// Guest count assumed when a request does not give one.
pub const DEFAULT_GUESTS: u32 = 2;

fn default_guests() -> u32 {
    DEFAULT_GUESTS
}

/// Parses a date in `YYYY-MM-DD` or compact `YYYYMMDD` form.
///
/// # Examples
///
/// ```
/// use stay_pricing::api::parse_stay_date;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
/// assert_eq!(parse_stay_date("2026-03-04"), Some(expected));
/// assert_eq!(parse_stay_date("20260304"), Some(expected));
/// assert_eq!(parse_stay_date("03/04/2026"), None);
/// ```
pub fn parse_stay_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .ok()
}

fn stay_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_stay_date(&value).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid date '{}', expected YYYY-MM-DD or YYYYMMDD",
            value
        ))
    })
}

/// Query for `GET /availability`.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    /// Check-in date.
    #[serde(deserialize_with = "stay_date")]
    pub check_in: NaiveDate,
    /// Check-out date.
    #[serde(deserialize_with = "stay_date")]
    pub check_out: NaiveDate,
    /// Guest count.
    #[serde(default = "default_guests")]
    pub guests: u32,
}

/// Query for `GET /checkout`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutQuery {
    /// Room slug.
    pub room: String,
    /// Check-in date.
    #[serde(deserialize_with = "stay_date")]
    pub check_in: NaiveDate,
    /// Check-out date.
    #[serde(deserialize_with = "stay_date")]
    pub check_out: NaiveDate,
    /// Guest count.
    #[serde(default = "default_guests")]
    pub guests: u32,
}

impl CheckoutQuery {
    /// The stay this query asks about.
    pub fn stay(&self) -> StayRequest {
        StayRequest {
            room_slug: self.room.clone(),
            arrival: self.check_in,
            departure: self.check_out,
            guests: self.guests,
        }
    }
}

/// Body of `POST /payments/card`.
///
/// The nightly rates are the ones shown on the checkout page; the price is
/// recomputed from them and any total the client sends is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPaymentRequest {
    /// Room slug.
    pub room: String,
    /// Check-in date.
    #[serde(deserialize_with = "stay_date")]
    pub check_in: NaiveDate,
    /// Check-out date.
    #[serde(deserialize_with = "stay_date")]
    pub check_out: NaiveDate,
    /// Guest count.
    #[serde(default = "default_guests")]
    pub guests: u32,
    /// The booking guest.
    pub guest: Guest,
    /// One entry per night of the stay.
    pub nightly_rates: Vec<NightlyRate>,
}

impl CardPaymentRequest {
    /// The stay being paid for.
    pub fn stay(&self) -> StayRequest {
        StayRequest {
            room_slug: self.room.clone(),
            arrival: self.check_in,
            departure: self.check_out,
            guests: self.guests,
        }
    }
}

/// Body of `POST /payments/ach`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchPaymentRequest {
    /// Room slug.
    pub room: String,
    /// Check-in date.
    #[serde(deserialize_with = "stay_date")]
    pub check_in: NaiveDate,
    /// Check-out date.
    #[serde(deserialize_with = "stay_date")]
    pub check_out: NaiveDate,
    /// Guest count.
    #[serde(default = "default_guests")]
    pub guests: u32,
    /// The booking guest.
    pub guest: Guest,
    /// Account to debit.
    pub bank_account: BankAccount,
    /// One entry per night of the stay.
    pub nightly_rates: Vec<NightlyRate>,
}

impl AchPaymentRequest {
    /// The stay being paid for.
    pub fn stay(&self) -> StayRequest {
        StayRequest {
            room_slug: self.room.clone(),
            arrival: self.check_in,
            departure: self.check_out,
            guests: self.guests,
        }
    }
}

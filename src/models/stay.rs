//! Guest, stay and bank-account models.
//!
//! These types describe who is booking, which room and dates they want, and
//! how they pay by bank transfer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The person making a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email; receipts are sent here.
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
}

impl Guest {
    /// Returns "first last".
    ///
    /// ```
    /// use stay_pricing::models::Guest;
    ///
    /// let guest = Guest {
    ///     first_name: "Ada".to_string(),
    ///     last_name: "Moore".to_string(),
    ///     email: "ada@example.com".to_string(),
    ///     phone: String::new(),
    /// };
    /// assert_eq!(guest.full_name(), "Ada Moore");
    /// ```
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A requested stay in one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRequest {
    /// The room's slug in the property configuration.
    pub room_slug: String,
    /// Check-in date; the first night.
    pub arrival: NaiveDate,
    /// Check-out date; not a night of the stay.
    pub departure: NaiveDate,
    /// Number of guests.
    pub guests: u32,
}

impl StayRequest {
    /// Number of nights between arrival and departure.
    ///
    /// Returns a negative number when departure precedes arrival.
    pub fn nights(&self) -> i64 {
        (self.departure - self.arrival).num_days()
    }
}

/// Kind of bank account debited by an ACH payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Checking account.
    #[default]
    Checking,
    /// Savings account.
    Savings,
}

/// Bank details for an ACH payment.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// ABA routing number.
    pub routing_number: String,
    /// Account number.
    pub account_number: String,
    /// Account type, checking unless stated.
    #[serde(default)]
    pub account_type: AccountType,
}

impl BankAccount {
    /// Returns the last four digits of the account number.
    pub fn last_four(&self) -> &str {
        let len = self.account_number.len();
        self.account_number.get(len.saturating_sub(4)..).unwrap_or("")
    }
}

// Keep account numbers out of logs.
impl std::fmt::Debug for BankAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankAccount")
            .field("routing_number", &self.routing_number)
            .field("account_number", &format_args!("****{}", self.last_four()))
            .field("account_type", &self.account_type)
            .finish()
    }
}

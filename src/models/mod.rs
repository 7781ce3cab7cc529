//! Core data models for pricing and booking.
//!
//! This module contains all the domain models used throughout the crate.

mod nightly_rate;
mod offer;
mod payment;
mod pricing_breakdown;
mod stay;

pub use nightly_rate::{MAX_NIGHTLY_RATE, NightlyRate, nightly_rates_from, validate_nightly_rates};
pub use offer::RoomOffer;
pub use payment::{ChargeKind, PaymentMetadata, PaymentMethod, ScheduledCharge};
pub use pricing_breakdown::{BillingPeriod, PricingBreakdown};
pub use stay::{AccountType, BankAccount, Guest, StayRequest};

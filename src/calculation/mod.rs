//! The pricing engine.
//!
//! This module contains the pure pricing functions: currency rounding, lodging
//! tax, the card-processing surcharge, the monthly billing schedule for
//! long-term stays, the breakdown that ties them together, and the selection
//! of what to charge for each payment method.

mod billing_schedule;
mod breakdown;
mod card_fee;
mod charge;
mod rounding;
mod tax;

pub use billing_schedule::build_billing_schedule;
pub use breakdown::{compute_breakdown, is_long_term_stay};
pub use card_fee::{calculate_card_fee, card_fee_percent};
pub use charge::{charge_amount, charge_kind, is_recurring, remaining_periods};
pub use rounding::{CURRENCY_DECIMAL_PLACES, from_cents, round_to_cents, to_cents};
pub use tax::{applicable_tax_rate, calculate_tax};

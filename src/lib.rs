//! Pricing engine and booking flow for short-term and extended-stay rentals.
//!
//! The core of this crate is the pricing engine in [`calculation`]: a pure
//! transform from a list of nightly rates into a full price breakdown with
//! tax, card-processing fees and, for long stays, a monthly billing schedule.
//! The [`booking`] and [`api`] modules wrap it in a checkout and payment flow
//! over pluggable availability, payment and reservation collaborators.

#![warn(missing_docs)]

pub mod api;
pub mod booking;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;

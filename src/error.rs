//! Error types for the pricing engine and booking flow.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the booking flow can surface. The pricing engine itself
//! never fails; these errors come from configuration, validation and the
//! external collaborators around it.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the crate.
///
/// # Example
///
/// ```
/// use stay_pricing::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/property.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/property.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Room slug is not part of the property configuration.
    #[error("Room not found: {slug}")]
    RoomNotFound {
        /// The room slug that was not found.
        slug: String,
    },

    /// No rate table covers the room on the given date.
    #[error("Rate not found for room '{room}' on date {date}")]
    RateNotFound {
        /// The room slug.
        room: String,
        /// The night for which the rate was requested.
        date: NaiveDate,
    },

    /// The requested stay is malformed (dates, guest count, length).
    #[error("Invalid stay: {message}")]
    InvalidStay {
        /// A description of what made the stay invalid.
        message: String,
    },

    /// A nightly-rate list failed validation before pricing.
    #[error("Invalid nightly rates: {message}")]
    InvalidNightlyRates {
        /// A description of the problem.
        message: String,
    },

    /// The room exists but is not bookable for the requested dates.
    #[error("Room '{room}' is not available for the selected dates")]
    RoomUnavailable {
        /// The room slug.
        room: String,
    },

    /// Neither the offer nor the calendar yielded nightly rates.
    #[error("Unable to retrieve rates for room '{room}'")]
    RatesUnavailable {
        /// The room slug.
        room: String,
    },

    /// Payment details are missing or unusable.
    #[error("Invalid payment details: {message}")]
    InvalidPaymentDetails {
        /// What is wrong with the payment details.
        message: String,
    },

    /// A computed charge cannot be expressed in integer cents.
    #[error("Invalid charge amount: {message}")]
    InvalidChargeAmount {
        /// A description of the problem.
        message: String,
    },

    /// A payment processor declined the charge.
    #[error("Payment declined: {message}")]
    PaymentDeclined {
        /// The processor's decline message.
        message: String,
    },

    /// An external collaborator (availability, payments, reservations) failed.
    #[error("{service} error: {message}")]
    CollaboratorError {
        /// The collaborator that failed.
        service: String,
        /// A description of the failure.
        message: String,
    },

    /// A webhook payload failed signature verification.
    #[error("Webhook signature verification failed: {message}")]
    WebhookSignature {
        /// Why verification failed.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::CollaboratorError`].
    pub fn collaborator(service: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::CollaboratorError {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

//! Response types for the booking API.
//!
//! This module defines the success bodies that are not domain types already,
//! the error response structure and the mapping from [`EngineError`] to HTTP
//! status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::booking::CardEventOutcome;
use crate::error::EngineError;
use crate::models::RoomOffer;

/// Body of a successful `GET /availability`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// Check-in date.
    pub check_in: NaiveDate,
    /// Check-out date.
    pub check_out: NaiveDate,
    /// Nights in the range.
    pub nights: i64,
    /// Guest count.
    pub guests: u32,
    /// One offer per room that fits the party.
    pub rooms: Vec<RoomOffer>,
}

/// Body of a handled `POST /webhooks/card`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    /// Always true; the processor only checks the status code.
    pub received: bool,
    /// What the event led to.
    #[serde(flatten)]
    pub outcome: CardEventOutcome,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response with the given error body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let (status, error) = match error {
            EngineError::ConfigNotFound { path } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            ),
            EngineError::ConfigParseError { path, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            ),
            EngineError::RoomNotFound { slug } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "ROOM_NOT_FOUND",
                    format!("Room not found: {}", slug),
                    "The room is not part of this property",
                ),
            ),
            EngineError::RateNotFound { room, date } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "RATE_NOT_FOUND",
                    format!("Rate not found for room '{}' on date {}", room, date),
                    "No rate table covers the requested night",
                ),
            ),
            EngineError::InvalidStay { message } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_STAY", message),
            ),
            EngineError::InvalidNightlyRates { message } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_NIGHTLY_RATES", message),
            ),
            err @ EngineError::RoomUnavailable { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("ROOM_UNAVAILABLE", err.to_string()),
            ),
            err @ EngineError::RatesUnavailable { .. } => (
                StatusCode::BAD_GATEWAY,
                ApiError::new("RATES_UNAVAILABLE", err.to_string()),
            ),
            EngineError::InvalidPaymentDetails { message } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_PAYMENT_DETAILS", message),
            ),
            EngineError::InvalidChargeAmount { message } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_CHARGE_AMOUNT", message),
            ),
            EngineError::PaymentDeclined { message } => (
                StatusCode::PAYMENT_REQUIRED,
                ApiError::new("PAYMENT_DECLINED", message),
            ),
            // Upstream detail is logged by the handler, never returned.
            EngineError::CollaboratorError { .. } => (
                StatusCode::BAD_GATEWAY,
                ApiError::new("UPSTREAM_ERROR", "An upstream service failed"),
            ),
            EngineError::WebhookSignature { message } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_SIGNATURE", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

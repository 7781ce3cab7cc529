//! HTTP API module for the booking flow.
//!
//! This module provides the REST endpoints for availability, checkout
//! quotes, card and ACH payments and the card processor webhook.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AchPaymentRequest, AvailabilityQuery, CardPaymentRequest, CheckoutQuery, DEFAULT_GUESTS,
    parse_stay_date,
};
pub use response::{ApiError, ApiErrorResponse, AvailabilityResponse, WebhookAck};
pub use state::AppState;

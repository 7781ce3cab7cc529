//! HTTP request handlers for the booking API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler tags its log lines with a fresh correlation id and turns
//! [`EngineError`]s into JSON error bodies.

use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::booking::{SIGNATURE_HEADER, parse_event, verify_signature};
use crate::error::EngineError;

use super::request::{AchPaymentRequest, AvailabilityQuery, CardPaymentRequest, CheckoutQuery};
use super::response::{ApiError, ApiErrorResponse, AvailabilityResponse, WebhookAck};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/availability", get(availability_handler))
        .route("/checkout", get(checkout_handler))
        .route("/payments/card", post(card_payment_handler))
        .route("/payments/ach", post(ach_payment_handler))
        .route("/webhooks/card", post(card_webhook_handler))
        .with_state(state)
}

fn json_ok<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(api_error: ApiErrorResponse) -> Response {
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

/// Logs a failed operation and converts the error into a response.
fn engine_failure(correlation_id: Uuid, operation: &str, err: EngineError) -> Response {
    match &err {
        EngineError::CollaboratorError { .. }
        | EngineError::ConfigNotFound { .. }
        | EngineError::ConfigParseError { .. } => {
            error!(correlation_id = %correlation_id, operation, error = %err, "Request failed");
        }
        _ => {
            warn!(correlation_id = %correlation_id, operation, error = %err, "Request rejected");
        }
    }
    error_response(err.into())
}

fn json_rejection_error(correlation_id: Uuid, rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

fn query_rejection_error(correlation_id: Uuid, rejection: QueryRejection) -> ApiError {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Invalid query string"
    );
    ApiError::validation_error(body_text)
}

/// Handler for `GET /availability`.
async fn availability_handler(
    State(state): State<AppState>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            return error_response(ApiErrorResponse::bad_request(query_rejection_error(
                correlation_id,
                rejection,
            )));
        }
    };

    info!(
        correlation_id = %correlation_id,
        check_in = %query.check_in,
        check_out = %query.check_out,
        guests = query.guests,
        "Processing availability request"
    );

    match state
        .checkout()
        .availability(query.check_in, query.check_out, query.guests)
        .await
    {
        Ok(rooms) => {
            info!(
                correlation_id = %correlation_id,
                rooms = rooms.len(),
                available = rooms.iter().filter(|room| room.available).count(),
                "Availability returned"
            );
            json_ok(AvailabilityResponse {
                check_in: query.check_in,
                check_out: query.check_out,
                nights: (query.check_out - query.check_in).num_days(),
                guests: query.guests,
                rooms,
            })
        }
        Err(err) => engine_failure(correlation_id, "availability", err),
    }
}

/// Handler for `GET /checkout`.
///
/// Returns the room and the full price breakdown the guest will be charged.
async fn checkout_handler(
    State(state): State<AppState>,
    query: Result<Query<CheckoutQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            return error_response(ApiErrorResponse::bad_request(query_rejection_error(
                correlation_id,
                rejection,
            )));
        }
    };

    info!(
        correlation_id = %correlation_id,
        room = %query.room,
        check_in = %query.check_in,
        check_out = %query.check_out,
        "Processing checkout request"
    );

    let start_time = Instant::now();
    match state.checkout().quote(&query.stay()).await {
        Ok(quote) => {
            info!(
                correlation_id = %correlation_id,
                room = %query.room,
                nights = quote.pricing.nights,
                total = %quote.pricing.total_with_cc_fee,
                duration_us = start_time.elapsed().as_micros(),
                "Checkout quote completed"
            );
            json_ok(quote)
        }
        Err(err) => engine_failure(correlation_id, "checkout", err),
    }
}

/// Handler for `POST /payments/card`.
async fn card_payment_handler(
    State(state): State<AppState>,
    payload: Result<Json<CardPaymentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return error_response(ApiErrorResponse::bad_request(json_rejection_error(
                correlation_id,
                rejection,
            )));
        }
    };

    info!(
        correlation_id = %correlation_id,
        room = %request.room,
        nights = request.nightly_rates.len(),
        "Processing card payment request"
    );

    match state
        .checkout()
        .start_card_payment(&request.stay(), &request.guest, &request.nightly_rates)
        .await
    {
        Ok(started) => {
            info!(
                correlation_id = %correlation_id,
                payment_intent = %started.payment_intent_id,
                charge_amount = %started.charge_amount,
                is_recurring = started.is_recurring,
                "Card payment intent created"
            );
            json_ok(started)
        }
        Err(err) => engine_failure(correlation_id, "card payment", err),
    }
}

/// Handler for `POST /payments/ach`.
async fn ach_payment_handler(
    State(state): State<AppState>,
    payload: Result<Json<AchPaymentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return error_response(ApiErrorResponse::bad_request(json_rejection_error(
                correlation_id,
                rejection,
            )));
        }
    };

    info!(
        correlation_id = %correlation_id,
        room = %request.room,
        nights = request.nightly_rates.len(),
        account = %request.bank_account.last_four(),
        "Processing ACH payment request"
    );

    match state
        .checkout()
        .pay_by_ach(
            &request.stay(),
            &request.guest,
            &request.bank_account,
            &request.nightly_rates,
        )
        .await
    {
        Ok(completed) => {
            info!(
                correlation_id = %correlation_id,
                booking_id = %completed.booking_id,
                charge_amount = %completed.charge_amount,
                "ACH payment completed"
            );
            json_ok(completed)
        }
        Err(err) => engine_failure(correlation_id, "ACH payment", err),
    }
}

/// Handler for `POST /webhooks/card`.
///
/// The raw body is needed for signature verification, so it is taken as
/// bytes and parsed only after the signature checks out.
async fn card_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let Some(secret) = state.webhook_secret() else {
        error!(correlation_id = %correlation_id, "Card webhook secret not configured");
        return error_response(ApiErrorResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new("CONFIG_ERROR", "Webhook secret not configured"),
        });
    };

    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        warn!(correlation_id = %correlation_id, "Card webhook without signature");
        return error_response(ApiErrorResponse::bad_request(ApiError::new(
            "INVALID_SIGNATURE",
            "missing signature header",
        )));
    };

    if let Err(err) = verify_signature(&body, signature, secret, Utc::now().timestamp()) {
        return engine_failure(correlation_id, "card webhook", err);
    }

    let event = match parse_event(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Unparseable card event");
            return error_response(ApiErrorResponse::bad_request(ApiError::malformed_json(
                err.to_string(),
            )));
        }
    };

    info!(
        correlation_id = %correlation_id,
        event_id = %event.id,
        event_type = %event.event_type,
        "Processing card event"
    );

    match state
        .checkout()
        .handle_card_event(&event, Utc::now().date_naive())
        .await
    {
        Ok(outcome) => json_ok(WebhookAck {
            received: true,
            outcome,
        }),
        Err(err) => engine_failure(correlation_id, "card webhook", err),
    }
}

//! Card processor webhook events.
//!
//! The card processor reports the outcome of a payment intent asynchronously.
//! Deliveries are signed: the signature header carries a unix timestamp and
//! a hex HMAC-SHA256 of `"<timestamp>.<body>"` keyed with the shared secret,
//! formatted as `t=<timestamp>,v1=<hex>`.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{EngineError, EngineResult};
use crate::models::PaymentMetadata;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "card-signature";

/// How far a signed timestamp may drift from now, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Event type for a successful payment intent.
pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Event type for a failed payment intent.
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

type HmacSha256 = Hmac<Sha256>;

/// A webhook event from the card processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEvent {
    /// Processor event id.
    pub id: String,
    /// Event type, e.g. `payment_intent.succeeded`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload.
    pub data: CardEventData,
}

/// Wrapper around the object an event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEventData {
    /// The payment intent.
    pub object: PaymentIntentObject,
}

/// The payment intent as reported in an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentObject {
    /// Intent id.
    pub id: String,
    /// Amount in cents.
    pub amount: i64,
    /// Processor customer id.
    #[serde(default)]
    pub customer: Option<String>,
    /// Metadata attached when the intent was created.
    #[serde(default)]
    pub metadata: Option<PaymentMetadata>,
    /// Why the payment failed, for failure events.
    #[serde(default)]
    pub last_payment_error: Option<PaymentError>,
}

/// Failure detail on a payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentError {
    /// Processor message.
    pub message: String,
}

fn signature_error(message: &str) -> EngineError {
    EngineError::WebhookSignature {
        message: message.to_string(),
    }
}

/// Builds a signature header for `payload`. The processor side of
/// [`verify_signature`]; used by the sandbox and tests.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a webhook signature header against the raw request body.
///
/// Rejects headers missing either part, signatures that do not match, and
/// timestamps more than [`SIGNATURE_TOLERANCE_SECS`] away from `now`.
///
/// # Example
///
/// ```
/// use stay_pricing::booking::{sign_payload, verify_signature};
///
/// let body = br#"{"id":"evt_1"}"#;
/// let header = sign_payload(body, "whsec_test", 1_700_000_000);
///
/// assert!(verify_signature(body, &header, "whsec_test", 1_700_000_100).is_ok());
/// assert!(verify_signature(body, &header, "whsec_other", 1_700_000_100).is_err());
/// ```
pub fn verify_signature(payload: &[u8], header: &str, secret: &str, now: i64) -> EngineResult<()> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        if let Some(t) = part.trim().strip_prefix("t=") {
            timestamp = Some(t);
        } else if let Some(v) = part.trim().strip_prefix("v1=") {
            signature = Some(v);
        }
    }

    let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
        return Err(signature_error("malformed signature header"));
    };

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| signature_error("invalid timestamp"))?;
    let signature = hex::decode(signature).map_err(|_| signature_error("invalid signature hex"))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| signature_error("invalid secret"))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.verify_slice(&signature)
        .map_err(|_| signature_error("signature mismatch"))?;

    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(signature_error("timestamp outside tolerance"));
    }

    Ok(())
}

/// Parses a verified webhook body.
pub fn parse_event(payload: &[u8]) -> EngineResult<CardEvent> {
    serde_json::from_slice(payload).map_err(|e| EngineError::collaborator("card webhook", e.to_string()))
}

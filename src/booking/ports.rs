//! Collaborator ports.
//!
//! The booking flow talks to four external systems: the property-management
//! backend (availability and reservations), a card processor, an ACH
//! processor, and whatever executes recurring charges. It also keeps a record
//! of card payments already handled, so redelivered webhooks book once. Each
//! is an async trait so real integrations and the sandbox adapters are
//! interchangeable.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::checkout::CardEventOutcome;
use crate::error::EngineResult;
use crate::models::{
    BankAccount, Guest, NightlyRate, PaymentMetadata, PaymentMethod, RoomOffer, ScheduledCharge,
};

/// Source of room availability and nightly rates.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Returns an offer per room for the nights from `arrival` up to `departure`.
    async fn offers(
        &self,
        arrival: NaiveDate,
        departure: NaiveDate,
        guests: u32,
    ) -> EngineResult<Vec<RoomOffer>>;

    /// Returns calendar rates for one room, used when an offer has none.
    async fn calendar_rates(
        &self,
        room_id: u32,
        arrival: NaiveDate,
        departure: NaiveDate,
    ) -> EngineResult<Vec<NightlyRate>>;
}

/// A request to create a card payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardIntentRequest {
    /// Amount in cents.
    pub amount_cents: i64,
    /// ISO currency code.
    pub currency: String,
    /// Processor customer the card belongs to.
    pub customer_id: String,
    /// Keep the card on file for later off-session charges.
    pub save_for_off_session: bool,
    /// Echoed back in webhook events.
    pub metadata: PaymentMetadata,
    /// Where the processor sends the receipt.
    pub receipt_email: String,
    /// Statement description.
    pub description: String,
}

/// A created card payment intent. The client confirms it with the secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardIntent {
    /// Processor intent id.
    pub id: String,
    /// Secret handed to the browser to confirm the payment.
    pub client_secret: String,
}

/// Card payment processor.
#[async_trait]
pub trait CardProcessor: Send + Sync {
    /// Creates a processor customer for the guest and returns its id.
    async fn create_customer(&self, guest: &Guest) -> EngineResult<String>;

    /// Creates a payment intent to be confirmed by the client.
    async fn create_payment_intent(&self, request: CardIntentRequest) -> EngineResult<CardIntent>;

    /// Lists ids of cards saved on the customer, most recent first.
    async fn saved_payment_methods(&self, customer_id: &str) -> EngineResult<Vec<String>>;
}

/// A bank-transfer sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchSaleRequest {
    /// Amount to debit.
    pub amount: Decimal,
    /// Name on the account.
    pub account_holder: String,
    /// Account to debit.
    pub bank_account: BankAccount,
}

/// Result of an ACH sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchOutcome {
    /// Whether the processor approved the sale.
    pub approved: bool,
    /// Processor transaction id, present when approved.
    pub transaction_id: Option<String>,
    /// Processor response description.
    pub message: String,
}

/// ACH payment processor.
#[async_trait]
pub trait AchProcessor: Send + Sync {
    /// Debits the account. A decline is an `Ok` outcome with `approved: false`.
    async fn sale(&self, request: AchSaleRequest) -> EngineResult<AchOutcome>;
}

/// A reservation to create in the property-management backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    /// Backend room id.
    pub room_id: u32,
    /// Check-in date.
    pub arrival: NaiveDate,
    /// Check-out date.
    pub departure: NaiveDate,
    /// Booking guest.
    pub guest: Guest,
    /// Number of guests.
    pub guests: u32,
    /// Amount paid at booking.
    pub total_price: Decimal,
    /// How it was paid.
    pub payment_method: PaymentMethod,
    /// Processor transaction or intent id.
    pub payment_reference: String,
    /// Free-text notes for staff.
    pub notes: String,
}

/// Reservation system of the property-management backend.
#[async_trait]
pub trait ReservationService: Send + Sync {
    /// Creates a confirmed reservation and returns its booking id.
    async fn create(&self, request: ReservationRequest) -> EngineResult<String>;
}

/// Executes recurring charges for later billing periods.
#[async_trait]
pub trait ChargeScheduler: Send + Sync {
    /// Queues an off-session charge and returns its id.
    async fn schedule(&self, charge: ScheduledCharge) -> EngineResult<String>;
}

/// Card payments whose success has already been acted on.
///
/// Keyed by processor intent id. The processor may deliver the same success
/// event more than once.
#[async_trait]
pub trait ProcessedPayments: Send + Sync {
    /// Returns the outcome recorded for an intent, if it was handled before.
    async fn outcome(&self, payment_intent_id: &str) -> EngineResult<Option<CardEventOutcome>>;

    /// Records the outcome of handling an intent's success.
    async fn record(&self, payment_intent_id: &str, outcome: CardEventOutcome) -> EngineResult<()>;
}

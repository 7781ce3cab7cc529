//! The booking flow around the pricing engine.
//!
//! [`CheckoutService`] quotes stays, takes card and ACH payments and creates
//! reservations through the collaborator ports in this module. The sandbox
//! adapters implement every port in memory for local runs and tests.

mod checkout;
mod ports;
mod sandbox;
mod webhook;

pub use checkout::{
    AchPaymentCompleted, CardEventOutcome, CardPaymentStarted, CheckoutService, Collaborators,
    Quote, QuotedRoom,
};
pub use ports::{
    AchOutcome, AchProcessor, AchSaleRequest, AvailabilitySource, CardIntent, CardIntentRequest,
    CardProcessor, ChargeScheduler, ProcessedPayments, ReservationRequest, ReservationService,
};
pub use sandbox::{
    ConfiguredAvailability, InMemoryChargeScheduler, InMemoryProcessedPayments,
    InMemoryReservations, SandboxAchProcessor, SandboxCardProcessor, SandboxCollaborators,
};
pub use webhook::{
    CardEvent, CardEventData, EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED, PaymentError,
    PaymentIntentObject, SIGNATURE_HEADER, SIGNATURE_TOLERANCE_SECS, parse_event, sign_payload,
    verify_signature,
};

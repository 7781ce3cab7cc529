//! Checkout orchestration.
//!
//! [`CheckoutService`] drives a booking from availability through quoting,
//! payment and reservation. Every entry point that charges money recomputes
//! the price from the raw nightly rates with the property's pricing policy;
//! no client-supplied total is ever trusted.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::calculation::{
    charge_amount, charge_kind, compute_breakdown, from_cents, is_recurring, remaining_periods,
    round_to_cents, to_cents,
};
use crate::config::{ConfigLoader, RoomConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    BankAccount, ChargeKind, Guest, NightlyRate, PaymentMetadata, PaymentMethod, PricingBreakdown,
    RoomOffer, ScheduledCharge, StayRequest, nightly_rates_from, validate_nightly_rates,
};

use super::ports::{
    AchProcessor, AchSaleRequest, AvailabilitySource, CardIntentRequest, CardProcessor,
    ChargeScheduler, ProcessedPayments, ReservationRequest, ReservationService,
};
use super::webhook::{
    CardEvent, EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED, PaymentIntentObject,
};

/// The external systems the checkout flow depends on.
#[derive(Clone)]
pub struct Collaborators {
    /// Room availability and rates.
    pub availability: Arc<dyn AvailabilitySource>,
    /// Card processor.
    pub card: Arc<dyn CardProcessor>,
    /// ACH processor.
    pub ach: Arc<dyn AchProcessor>,
    /// Reservation system.
    pub reservations: Arc<dyn ReservationService>,
    /// Recurring charge scheduler.
    pub scheduler: Arc<dyn ChargeScheduler>,
    /// Card payments already turned into bookings.
    pub processed: Arc<dyn ProcessedPayments>,
}

/// The room part of a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedRoom {
    /// Backend room id.
    pub room_id: u32,
    /// Room slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Maximum occupancy.
    pub max_guests: u32,
}

/// A priced stay, shown to the guest before payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// The quoted room.
    pub room: QuotedRoom,
    /// Check-in date.
    pub arrival: NaiveDate,
    /// Check-out date.
    pub departure: NaiveDate,
    /// Guest count.
    pub guests: u32,
    /// The price breakdown.
    pub pricing: PricingBreakdown,
}

/// A card payment ready for the client to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPaymentStarted {
    /// Processor intent id.
    pub payment_intent_id: String,
    /// Secret the client confirms the intent with.
    pub client_secret: String,
    /// Processor customer id.
    pub customer_id: String,
    /// Amount charged now.
    pub charge_amount: Decimal,
    /// Whether further periods will be charged later.
    pub is_recurring: bool,
    /// The recomputed breakdown.
    pub pricing: PricingBreakdown,
}

/// A completed ACH payment and its reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchPaymentCompleted {
    /// Processor transaction id.
    pub transaction_id: String,
    /// Reservation id.
    pub booking_id: String,
    /// Amount charged now.
    pub charge_amount: Decimal,
    /// Whether further periods are due later.
    pub is_recurring: bool,
    /// The recomputed breakdown.
    pub pricing: PricingBreakdown,
}

/// What handling a card webhook event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CardEventOutcome {
    /// A reservation was created; lists the periods scheduled for later.
    BookingCreated {
        /// Reservation id.
        booking_id: String,
        /// Billing periods queued as recurring charges.
        scheduled_periods: Vec<u32>,
    },
    /// A recurring period charge went through.
    RecurringPaymentRecorded {
        /// The period paid, when known.
        period_number: Option<u32>,
    },
    /// The payment failed; nothing was booked.
    PaymentFailed {
        /// Processor intent id.
        payment_intent_id: String,
    },
    /// The event needed no action.
    Ignored,
}

/// Orchestrates quoting, payment and reservation for one property.
pub struct CheckoutService {
    config: Arc<ConfigLoader>,
    collaborators: Collaborators,
    /// Serializes success handling so a redelivered event sees the first one's record.
    booking_lock: Mutex<()>,
}

impl CheckoutService {
    /// Creates a checkout service for the configured property.
    pub fn new(config: Arc<ConfigLoader>, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
            booking_lock: Mutex::new(()),
        }
    }

    /// Returns the property configuration.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Lists room offers for a date range.
    pub async fn availability(
        &self,
        arrival: NaiveDate,
        departure: NaiveDate,
        guests: u32,
    ) -> EngineResult<Vec<RoomOffer>> {
        if departure <= arrival {
            return Err(EngineError::InvalidStay {
                message: "check-out must be after check-in".to_string(),
            });
        }
        self.collaborators
            .availability
            .offers(arrival, departure, guests)
            .await
    }

    /// Prices a stay from the availability source's current rates.
    pub async fn quote(&self, stay: &StayRequest) -> EngineResult<Quote> {
        let room = self.validate_stay(stay)?;

        let offer = self
            .collaborators
            .availability
            .offers(stay.arrival, stay.departure, stay.guests)
            .await?
            .into_iter()
            .find(|offer| offer.room_id == room.room_id);

        let offer = match offer {
            Some(offer) if offer.available => offer,
            _ => {
                return Err(EngineError::RoomUnavailable {
                    room: stay.room_slug.clone(),
                });
            }
        };

        let nightly_rates = self.resolve_nightly_rates(stay, room.room_id, offer).await?;
        let pricing = compute_breakdown(&nightly_rates, self.config.pricing_policy(), None);

        info!(
            room = %stay.room_slug,
            nights = pricing.nights,
            is_long_term = pricing.is_long_term,
            total = %pricing.total_with_cc_fee,
            "Quoted stay"
        );

        Ok(Quote {
            room: QuotedRoom {
                room_id: room.room_id,
                slug: stay.room_slug.clone(),
                name: room.name.clone(),
                max_guests: room.max_guests,
            },
            arrival: stay.arrival,
            departure: stay.departure,
            guests: stay.guests,
            pricing,
        })
    }

    /// Creates a card payment intent for the amount due now.
    ///
    /// Long-term stays save the card for the later periods and carry the
    /// remaining schedule in the intent metadata, so the success webhook can
    /// create the reservation and queue the recurring charges.
    pub async fn start_card_payment(
        &self,
        stay: &StayRequest,
        guest: &Guest,
        nightly_rates: &[NightlyRate],
    ) -> EngineResult<CardPaymentStarted> {
        let (room, pricing) = self.price_submitted_stay(stay, nightly_rates)?;
        let amount = charge_amount(&pricing, PaymentMethod::Card);
        let amount_cents = to_cents(amount)?;

        let customer_id = self.collaborators.card.create_customer(guest).await?;

        let metadata = PaymentMetadata {
            kind: charge_kind(&pricing),
            room_id: room.room_id,
            room_slug: stay.room_slug.clone(),
            arrival: stay.arrival,
            departure: stay.departure,
            guests: stay.guests,
            guest: guest.clone(),
            total_periods: pricing
                .is_long_term
                .then(|| pricing.total_periods() as u32),
            remaining_schedule: remaining_periods(&pricing).to_vec(),
            period_number: None,
        };

        let intent = self
            .collaborators
            .card
            .create_payment_intent(CardIntentRequest {
                amount_cents,
                currency: self.config.property().currency.clone(),
                customer_id: customer_id.clone(),
                save_for_off_session: pricing.is_long_term,
                metadata,
                receipt_email: guest.email.clone(),
                description: self.payment_description(stay, &pricing),
            })
            .await?;

        info!(
            room = %stay.room_slug,
            payment_intent = %intent.id,
            charge_amount = %amount,
            is_long_term = pricing.is_long_term,
            "Card payment started"
        );

        Ok(CardPaymentStarted {
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            customer_id,
            charge_amount: amount,
            is_recurring: is_recurring(&pricing),
            pricing,
        })
    }

    /// Charges the amount due now by bank transfer and books the stay.
    ///
    /// A decline is reported as [`EngineError::PaymentDeclined`] and is not
    /// retried.
    pub async fn pay_by_ach(
        &self,
        stay: &StayRequest,
        guest: &Guest,
        bank_account: &BankAccount,
        nightly_rates: &[NightlyRate],
    ) -> EngineResult<AchPaymentCompleted> {
        if bank_account.routing_number.trim().is_empty()
            || bank_account.account_number.trim().is_empty()
        {
            return Err(EngineError::InvalidPaymentDetails {
                message: "bank account details required".to_string(),
            });
        }

        let (room, pricing) = self.price_submitted_stay(stay, nightly_rates)?;
        let amount = charge_amount(&pricing, PaymentMethod::Ach);

        let outcome = self
            .collaborators
            .ach
            .sale(AchSaleRequest {
                amount,
                account_holder: guest.full_name(),
                bank_account: bank_account.clone(),
            })
            .await?;

        if !outcome.approved {
            warn!(
                room = %stay.room_slug,
                charge_amount = %amount,
                reason = %outcome.message,
                "ACH payment declined"
            );
            return Err(EngineError::PaymentDeclined {
                message: outcome.message,
            });
        }

        let transaction_id = outcome.transaction_id.ok_or_else(|| {
            EngineError::collaborator("ACH processor", "approved sale without a transaction id")
        })?;

        let notes = if pricing.is_long_term {
            format!("ACH payment. Period 1/{}", pricing.total_periods())
        } else {
            format!("ACH payment. {} nights", pricing.nights)
        };

        let booking_id = self
            .collaborators
            .reservations
            .create(ReservationRequest {
                room_id: room.room_id,
                arrival: stay.arrival,
                departure: stay.departure,
                guest: guest.clone(),
                guests: stay.guests,
                total_price: amount,
                payment_method: PaymentMethod::Ach,
                payment_reference: transaction_id.clone(),
                notes,
            })
            .await
            .inspect_err(|err| {
                error!(
                    transaction_id = %transaction_id,
                    error = %err,
                    "ACH payment captured but reservation failed"
                );
            })?;

        info!(
            room = %stay.room_slug,
            booking_id = %booking_id,
            transaction_id = %transaction_id,
            charge_amount = %amount,
            "ACH payment completed"
        );

        Ok(AchPaymentCompleted {
            transaction_id,
            booking_id,
            charge_amount: amount,
            is_recurring: is_recurring(&pricing),
            pricing,
        })
    }

    /// Acts on a verified card webhook event.
    ///
    /// A successful first or full payment creates the reservation. For a
    /// long-term stay it also queues each remaining period that starts after
    /// `today` against the customer's saved card. A period that fails to
    /// schedule is logged and skipped. A success already handled for the same
    /// intent returns the recorded outcome without booking again.
    pub async fn handle_card_event(
        &self,
        event: &CardEvent,
        today: NaiveDate,
    ) -> EngineResult<CardEventOutcome> {
        let intent = &event.data.object;

        match event.event_type.as_str() {
            EVENT_PAYMENT_SUCCEEDED => self.on_payment_succeeded(intent, today).await,
            EVENT_PAYMENT_FAILED => {
                error!(
                    payment_intent = %intent.id,
                    reason = intent
                        .last_payment_error
                        .as_ref()
                        .map(|e| e.message.as_str())
                        .unwrap_or("unknown"),
                    "Card payment failed"
                );
                Ok(CardEventOutcome::PaymentFailed {
                    payment_intent_id: intent.id.clone(),
                })
            }
            other => {
                debug!(event_id = %event.id, event_type = other, "Ignoring card event");
                Ok(CardEventOutcome::Ignored)
            }
        }
    }

    async fn on_payment_succeeded(
        &self,
        intent: &PaymentIntentObject,
        today: NaiveDate,
    ) -> EngineResult<CardEventOutcome> {
        let Some(metadata) = &intent.metadata else {
            warn!(payment_intent = %intent.id, "Payment succeeded without booking metadata");
            return Ok(CardEventOutcome::Ignored);
        };

        let notes = match metadata.kind {
            ChargeKind::RecurringPayment => {
                info!(
                    payment_intent = %intent.id,
                    room = %metadata.room_slug,
                    period_number = ?metadata.period_number,
                    "Recurring payment succeeded"
                );
                return Ok(CardEventOutcome::RecurringPaymentRecorded {
                    period_number: metadata.period_number,
                });
            }
            ChargeKind::LongTermFirstPayment => format!(
                "Long-term stay. Card payment. Period 1 of {}. Recurring billing scheduled.",
                metadata.total_periods.unwrap_or(1)
            ),
            ChargeKind::ShortTermFullPayment => "Short-term stay. Card payment.".to_string(),
        };

        let _guard = self.booking_lock.lock().await;

        if let Some(outcome) = self.collaborators.processed.outcome(&intent.id).await? {
            info!(payment_intent = %intent.id, "Payment already handled, skipping duplicate event");
            return Ok(outcome);
        }

        let booking_id = self
            .collaborators
            .reservations
            .create(ReservationRequest {
                room_id: metadata.room_id,
                arrival: metadata.arrival,
                departure: metadata.departure,
                guest: metadata.guest.clone(),
                guests: metadata.guests,
                total_price: from_cents(intent.amount),
                payment_method: PaymentMethod::Card,
                payment_reference: intent.id.clone(),
                notes,
            })
            .await?;

        info!(
            booking_id = %booking_id,
            payment_intent = %intent.id,
            room = %metadata.room_slug,
            "Reservation created"
        );

        let scheduled_periods = if metadata.kind == ChargeKind::LongTermFirstPayment {
            self.schedule_remaining_periods(intent, metadata, today).await
        } else {
            Vec::new()
        };

        let outcome = CardEventOutcome::BookingCreated {
            booking_id,
            scheduled_periods,
        };

        // The reservation exists, so a redelivery must not surface as a failure.
        if let Err(err) = self
            .collaborators
            .processed
            .record(&intent.id, outcome.clone())
            .await
        {
            error!(payment_intent = %intent.id, error = %err, "Failed to record handled payment");
        }

        Ok(outcome)
    }

    async fn schedule_remaining_periods(
        &self,
        intent: &PaymentIntentObject,
        metadata: &PaymentMetadata,
        today: NaiveDate,
    ) -> Vec<u32> {
        if metadata.remaining_schedule.is_empty() {
            return Vec::new();
        }

        let Some(customer_id) = intent.customer.as_deref() else {
            error!(payment_intent = %intent.id, "No customer on long-term payment");
            return Vec::new();
        };

        let payment_method_id = match self
            .collaborators
            .card
            .saved_payment_methods(customer_id)
            .await
        {
            Ok(methods) => match methods.into_iter().next() {
                Some(id) => id,
                None => {
                    error!(customer_id, "No saved payment method for recurring billing");
                    return Vec::new();
                }
            },
            Err(err) => {
                error!(customer_id, error = %err, "Failed to list saved payment methods");
                return Vec::new();
            }
        };

        let mut scheduled = Vec::new();
        for period in metadata
            .remaining_schedule
            .iter()
            .filter(|period| period.start_date > today)
        {
            let amount_cents = match to_cents(period.total_with_cc_fee) {
                Ok(cents) => cents,
                Err(err) => {
                    error!(period_number = period.period_number, error = %err, "Unschedulable period amount");
                    continue;
                }
            };

            let charge = ScheduledCharge {
                customer_id: customer_id.to_string(),
                payment_method_id: payment_method_id.clone(),
                room_slug: metadata.room_slug.clone(),
                period_number: period.period_number,
                scheduled_date: period.start_date,
                period_start: period.start_date,
                period_end: period.end_date,
                nights: period.nights,
                amount_cents,
            };

            match self.collaborators.scheduler.schedule(charge).await {
                Ok(schedule_id) => {
                    info!(
                        period_number = period.period_number,
                        amount = %period.total_with_cc_fee,
                        scheduled_date = %period.start_date,
                        schedule_id = %schedule_id,
                        "Scheduled recurring payment"
                    );
                    scheduled.push(period.period_number);
                }
                Err(err) => {
                    error!(
                        period_number = period.period_number,
                        error = %err,
                        "Failed to schedule recurring payment"
                    );
                }
            }
        }

        scheduled
    }

    /// Checks the room, dates and occupancy of a stay.
    fn validate_stay(&self, stay: &StayRequest) -> EngineResult<&RoomConfig> {
        let room = self.config.get_room(&stay.room_slug)?;

        let nights = stay.nights();
        if nights < 1 {
            return Err(EngineError::InvalidStay {
                message: "check-out must be after check-in".to_string(),
            });
        }

        let min_nights = self.config.min_nights();
        if nights < i64::from(min_nights) {
            return Err(EngineError::InvalidStay {
                message: format!("minimum stay is {} nights", min_nights),
            });
        }

        if stay.guests == 0 {
            return Err(EngineError::InvalidStay {
                message: "at least one guest is required".to_string(),
            });
        }

        if stay.guests > room.max_guests {
            return Err(EngineError::InvalidStay {
                message: format!("{} sleeps at most {} guests", room.name, room.max_guests),
            });
        }

        Ok(room)
    }

    /// Validates client-submitted nightly rates and prices them server-side.
    fn price_submitted_stay(
        &self,
        stay: &StayRequest,
        nightly_rates: &[NightlyRate],
    ) -> EngineResult<(&RoomConfig, PricingBreakdown)> {
        let room = self.validate_stay(stay)?;
        validate_nightly_rates(nightly_rates, stay.arrival, stay.nights() as usize)?;
        let pricing = compute_breakdown(nightly_rates, self.config.pricing_policy(), None);
        Ok((room, pricing))
    }

    /// Picks nightly rates for a quote: the offer's own, then the calendar,
    /// then the quoted total spread evenly over the nights.
    async fn resolve_nightly_rates(
        &self,
        stay: &StayRequest,
        room_id: u32,
        offer: RoomOffer,
    ) -> EngineResult<Vec<NightlyRate>> {
        if !offer.nightly_rates.is_empty() {
            return Ok(offer.nightly_rates);
        }

        let rates_unavailable = || EngineError::RatesUnavailable {
            room: stay.room_slug.clone(),
        };

        let total_price = offer
            .total_price
            .filter(|price| *price > Decimal::ZERO)
            .ok_or_else(rates_unavailable)?;

        let calendar = self
            .collaborators
            .availability
            .calendar_rates(room_id, stay.arrival, stay.departure)
            .await?;
        if !calendar.is_empty() {
            return Ok(calendar);
        }

        let nights = stay.nights() as usize;
        let average = round_to_cents(total_price / Decimal::from(nights));
        debug!(room = %stay.room_slug, %average, "Spreading quoted total over nights");
        Ok(nightly_rates_from(stay.arrival, &vec![average; nights]))
    }

    fn payment_description(&self, stay: &StayRequest, pricing: &PricingBreakdown) -> String {
        let mut description = format!(
            "{} - {} | {} to {}",
            self.config.property().name,
            stay.room_slug,
            stay.arrival,
            stay.departure
        );
        if pricing.is_long_term {
            description.push_str(&format!(" | Period 1/{}", pricing.total_periods()));
        }
        description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use async_trait::async_trait;

    use crate::booking::sandbox::SandboxCollaborators;
    use crate::booking::webhook::CardEventData;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> Arc<ConfigLoader> {
        Arc::new(ConfigLoader::load("./config/rewak-studios").expect("Failed to load config"))
    }

    fn setup() -> (CheckoutService, SandboxCollaborators) {
        let config = config();
        let sandbox = SandboxCollaborators::new(config.clone());
        (
            CheckoutService::new(config, sandbox.collaborators()),
            sandbox,
        )
    }

    fn guest() -> Guest {
        Guest {
            first_name: "Ada".to_string(),
            last_name: "Moore".to_string(),
            email: "ada@example.com".to_string(),
            phone: "907-555-0100".to_string(),
        }
    }

    fn bank() -> BankAccount {
        BankAccount {
            routing_number: "125000105".to_string(),
            account_number: "000123456789".to_string(),
            account_type: Default::default(),
        }
    }

    fn stay(room: &str, arrival: NaiveDate, departure: NaiveDate) -> StayRequest {
        StayRequest {
            room_slug: room.to_string(),
            arrival,
            departure,
            guests: 2,
        }
    }

    /// 45 nights at 100 from 2026-03-02: periods of 30 and 15 nights.
    fn long_stay() -> (StayRequest, Vec<NightlyRate>) {
        let arrival = date(2026, 3, 2);
        let rates = nightly_rates_from(arrival, &[dec("100"); 45]);
        (stay("studio-king", arrival, date(2026, 4, 16)), rates)
    }

    fn succeeded_event(intent_id: &str, amount: i64, customer: &str, metadata: PaymentMetadata) -> CardEvent {
        CardEvent {
            id: "evt_1".to_string(),
            event_type: EVENT_PAYMENT_SUCCEEDED.to_string(),
            data: CardEventData {
                object: PaymentIntentObject {
                    id: intent_id.to_string(),
                    amount,
                    customer: Some(customer.to_string()),
                    metadata: Some(metadata),
                    last_payment_error: None,
                },
            },
        }
    }

    #[tokio::test]
    async fn test_quote_short_stay_from_rate_tables() {
        let (service, _) = setup();
        // Wed and Thu nights at the weekday rate
        let quote = service
            .quote(&stay("studio-king", date(2026, 3, 4), date(2026, 3, 6)))
            .await
            .unwrap();

        assert_eq!(quote.room.room_id, 101);
        assert_eq!(quote.room.name, "King Studio");
        assert_eq!(quote.pricing.nights, 2);
        assert_eq!(quote.pricing.subtotal, dec("258.00"));
        assert_eq!(quote.pricing.tax_amount, dec("20.64"));
        assert_eq!(quote.pricing.total_with_cc_fee, dec("278.64"));
        assert_eq!(quote.pricing.total_ach, dec("278.64"));
        assert!(quote.pricing.billing_schedule.is_none());
    }

    #[tokio::test]
    async fn test_quote_rejects_short_minimum_stay() {
        let (service, _) = setup();
        let result = service
            .quote(&stay("studio-king", date(2026, 3, 4), date(2026, 3, 5)))
            .await;
        match result {
            Err(EngineError::InvalidStay { message }) => {
                assert_eq!(message, "minimum stay is 2 nights");
            }
            other => panic!("Expected InvalidStay error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quote_rejects_too_many_guests() {
        let (service, _) = setup();
        let mut request = stay("studio-queen", date(2026, 3, 4), date(2026, 3, 6));
        request.guests = 3;
        assert!(matches!(
            service.quote(&request).await,
            Err(EngineError::InvalidStay { .. })
        ));
    }

    #[tokio::test]
    async fn test_quote_unknown_room() {
        let (service, _) = setup();
        let result = service
            .quote(&stay("penthouse", date(2026, 3, 4), date(2026, 3, 6)))
            .await;
        assert!(matches!(result, Err(EngineError::RoomNotFound { .. })));
    }

    #[tokio::test]
    async fn test_quote_blocked_room_is_unavailable() {
        let (service, sandbox) = setup();
        sandbox.availability.block("studio-king", date(2026, 3, 5));
        let result = service
            .quote(&stay("studio-king", date(2026, 3, 4), date(2026, 3, 6)))
            .await;
        assert!(matches!(result, Err(EngineError::RoomUnavailable { .. })));
    }

    struct TotalOnlyAvailability {
        total_price: Option<Decimal>,
    }

    #[async_trait]
    impl AvailabilitySource for TotalOnlyAvailability {
        async fn offers(
            &self,
            _arrival: NaiveDate,
            _departure: NaiveDate,
            _guests: u32,
        ) -> EngineResult<Vec<RoomOffer>> {
            Ok(vec![RoomOffer {
                room_id: 101,
                slug: "studio-king".to_string(),
                name: "King Studio".to_string(),
                available: true,
                total_price: self.total_price,
                nightly_rates: Vec::new(),
                max_guests: 2,
            }])
        }

        async fn calendar_rates(
            &self,
            _room_id: u32,
            _arrival: NaiveDate,
            _departure: NaiveDate,
        ) -> EngineResult<Vec<NightlyRate>> {
            Ok(Vec::new())
        }
    }

    fn service_with_total(total_price: Option<Decimal>) -> CheckoutService {
        let config = config();
        let mut collaborators = SandboxCollaborators::new(config.clone()).collaborators();
        collaborators.availability = Arc::new(TotalOnlyAvailability { total_price });
        CheckoutService::new(config, collaborators)
    }

    #[tokio::test]
    async fn test_quote_spreads_total_when_no_nightly_rates() {
        let service = service_with_total(Some(dec("301.00")));
        let quote = service
            .quote(&stay("studio-king", date(2026, 3, 4), date(2026, 3, 7)))
            .await
            .unwrap();

        // 301 / 3 = 100.333.. rounds to 100.33 per night
        assert!(quote.pricing.nightly_rates.iter().all(|n| n.rate == dec("100.33")));
        assert_eq!(quote.pricing.nightly_rates[0].date, date(2026, 3, 4));
        assert_eq!(quote.pricing.subtotal, dec("300.99"));
    }

    #[tokio::test]
    async fn test_quote_without_any_rates_fails() {
        let service = service_with_total(None);
        let result = service
            .quote(&stay("studio-king", date(2026, 3, 4), date(2026, 3, 7)))
            .await;
        assert!(matches!(result, Err(EngineError::RatesUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_card_payment_short_stay_charges_full_total() {
        let (service, sandbox) = setup();
        let arrival = date(2026, 3, 4);
        let request = stay("studio-king", arrival, date(2026, 3, 6));
        let rates = nightly_rates_from(arrival, &[dec("129.00"), dec("129.00")]);

        let started = service
            .start_card_payment(&request, &guest(), &rates)
            .await
            .unwrap();

        assert_eq!(started.charge_amount, dec("278.64"));
        assert!(!started.is_recurring);

        let intents = sandbox.card.intents();
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].amount_cents, 27864);
        assert_eq!(intents[0].currency, "usd");
        assert!(!intents[0].save_for_off_session);
        assert_eq!(intents[0].metadata.kind, ChargeKind::ShortTermFullPayment);
        assert!(intents[0].metadata.total_periods.is_none());
        assert!(intents[0].metadata.remaining_schedule.is_empty());
        assert_eq!(
            intents[0].description,
            "Rewak Studios - studio-king | 2026-03-04 to 2026-03-06"
        );
    }

    #[tokio::test]
    async fn test_card_payment_long_stay_charges_first_period() {
        let (service, sandbox) = setup();
        let (request, rates) = long_stay();

        let started = service
            .start_card_payment(&request, &guest(), &rates)
            .await
            .unwrap();

        // 30 nights * 100 + 3% card fee
        assert_eq!(started.charge_amount, dec("3090.00"));
        assert!(started.is_recurring);
        assert_eq!(started.pricing.total_periods(), 2);

        let intent = &sandbox.card.intents()[0];
        assert_eq!(intent.amount_cents, 309000);
        assert!(intent.save_for_off_session);
        assert_eq!(intent.metadata.kind, ChargeKind::LongTermFirstPayment);
        assert_eq!(intent.metadata.total_periods, Some(2));
        assert_eq!(intent.metadata.remaining_schedule.len(), 1);
        assert_eq!(intent.metadata.remaining_schedule[0].period_number, 2);
        assert!(intent.description.ends_with(" | Period 1/2"));
    }

    #[tokio::test]
    async fn test_card_payment_rejects_mismatched_rates() {
        let (service, sandbox) = setup();
        let arrival = date(2026, 3, 4);
        let request = stay("studio-king", arrival, date(2026, 3, 7));
        let rates = nightly_rates_from(arrival, &[dec("129.00"), dec("129.00")]);

        let result = service.start_card_payment(&request, &guest(), &rates).await;
        assert!(matches!(result, Err(EngineError::InvalidNightlyRates { .. })));
        assert!(sandbox.card.intents().is_empty());
    }

    #[tokio::test]
    async fn test_card_payment_rejects_rates_above_maximum() {
        let (service, sandbox) = setup();
        let arrival = date(2026, 3, 4);
        let request = stay("studio-king", arrival, date(2026, 3, 6));
        let rates = nightly_rates_from(arrival, &[Decimal::MAX, Decimal::MAX]);

        let result = service.start_card_payment(&request, &guest(), &rates).await;
        assert!(matches!(result, Err(EngineError::InvalidNightlyRates { .. })));
        assert!(sandbox.card.intents().is_empty());

        let result = service
            .pay_by_ach(&request, &guest(), &bank(), &rates)
            .await;
        assert!(matches!(result, Err(EngineError::InvalidNightlyRates { .. })));
        assert!(sandbox.ach.sales().is_empty());
    }

    #[tokio::test]
    async fn test_ach_payment_short_stay_books_reservation() {
        let (service, sandbox) = setup();
        let arrival = date(2026, 3, 4);
        let request = stay("studio-king", arrival, date(2026, 3, 6));
        let rates = nightly_rates_from(arrival, &[dec("129.00"), dec("129.00")]);

        let completed = service
            .pay_by_ach(&request, &guest(), &bank(), &rates)
            .await
            .unwrap();

        assert_eq!(completed.charge_amount, dec("278.64"));
        assert_eq!(completed.booking_id, "BK1000");
        assert!(completed.transaction_id.starts_with("trn_"));

        let sales = sandbox.ach.sales();
        assert_eq!(sales[0].amount, dec("278.64"));
        assert_eq!(sales[0].account_holder, "Ada Moore");

        let reservations = sandbox.reservations.reservations();
        assert_eq!(reservations.len(), 1);
        let (_, reservation) = &reservations[0];
        assert_eq!(reservation.payment_method, PaymentMethod::Ach);
        assert_eq!(reservation.payment_reference, completed.transaction_id);
        assert_eq!(reservation.notes, "ACH payment. 2 nights");
    }

    #[tokio::test]
    async fn test_ach_payment_long_stay_charges_first_period_without_fee() {
        let (service, sandbox) = setup();
        let (request, rates) = long_stay();

        let completed = service
            .pay_by_ach(&request, &guest(), &bank(), &rates)
            .await
            .unwrap();

        assert_eq!(completed.charge_amount, dec("3000"));
        assert!(completed.is_recurring);
        assert_eq!(sandbox.reservations.reservations()[0].1.notes, "ACH payment. Period 1/2");
        // Later ACH periods are not auto-scheduled
        assert!(sandbox.scheduler.scheduled().is_empty());
    }

    #[tokio::test]
    async fn test_ach_decline_books_nothing() {
        let (service, sandbox) = setup();
        sandbox.ach.decline_account("000123456789");
        let arrival = date(2026, 3, 4);
        let request = stay("studio-king", arrival, date(2026, 3, 6));
        let rates = nightly_rates_from(arrival, &[dec("129.00"), dec("129.00")]);

        match service.pay_by_ach(&request, &guest(), &bank(), &rates).await {
            Err(EngineError::PaymentDeclined { message }) => {
                assert_eq!(message, "DECLINED: insufficient funds");
            }
            other => panic!("Expected PaymentDeclined error, got {:?}", other),
        }
        assert!(sandbox.reservations.reservations().is_empty());
    }

    #[tokio::test]
    async fn test_ach_requires_bank_details() {
        let (service, sandbox) = setup();
        let (request, rates) = long_stay();
        let mut account = bank();
        account.routing_number = "  ".to_string();

        let result = service.pay_by_ach(&request, &guest(), &account, &rates).await;
        assert!(matches!(result, Err(EngineError::InvalidPaymentDetails { .. })));
        assert!(sandbox.ach.sales().is_empty());
    }

    #[tokio::test]
    async fn test_succeeded_long_term_event_books_and_schedules() {
        let (service, sandbox) = setup();
        let (request, rates) = long_stay();
        let started = service
            .start_card_payment(&request, &guest(), &rates)
            .await
            .unwrap();
        let metadata = sandbox.card.intents()[0].metadata.clone();

        let event = succeeded_event(&started.payment_intent_id, 309000, &started.customer_id, metadata);
        let outcome = service
            .handle_card_event(&event, date(2026, 3, 2))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CardEventOutcome::BookingCreated {
                booking_id: "BK1000".to_string(),
                scheduled_periods: vec![2],
            }
        );

        let (_, reservation) = &sandbox.reservations.reservations()[0];
        assert_eq!(reservation.total_price, dec("3090.00"));
        assert_eq!(reservation.payment_method, PaymentMethod::Card);
        assert_eq!(
            reservation.notes,
            "Long-term stay. Card payment. Period 1 of 2. Recurring billing scheduled."
        );

        let scheduled = sandbox.scheduler.scheduled();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].customer_id, started.customer_id);
        assert_eq!(scheduled[0].scheduled_date, date(2026, 4, 1));
        assert_eq!(scheduled[0].period_end, date(2026, 4, 15));
        assert_eq!(scheduled[0].nights, 15);
        // 15 * 100 + 3%
        assert_eq!(scheduled[0].amount_cents, 154500);
    }

    #[tokio::test]
    async fn test_repeated_success_event_books_once() {
        let (service, sandbox) = setup();
        let (request, rates) = long_stay();
        let started = service
            .start_card_payment(&request, &guest(), &rates)
            .await
            .unwrap();
        let metadata = sandbox.card.intents()[0].metadata.clone();
        let event = succeeded_event(&started.payment_intent_id, 309000, &started.customer_id, metadata);

        let first = service
            .handle_card_event(&event, date(2026, 3, 2))
            .await
            .unwrap();
        let second = service
            .handle_card_event(&event, date(2026, 3, 2))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(sandbox.reservations.reservations().len(), 1);
        assert_eq!(sandbox.scheduler.scheduled().len(), 1);
        assert_eq!(sandbox.processed.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_success_events_book_once() {
        let (service, sandbox) = setup();
        let arrival = date(2026, 3, 4);
        let request = stay("studio-king", arrival, date(2026, 3, 6));
        let rates = nightly_rates_from(arrival, &[dec("129.00"), dec("129.00")]);
        let started = service
            .start_card_payment(&request, &guest(), &rates)
            .await
            .unwrap();
        let metadata = sandbox.card.intents()[0].metadata.clone();
        let event = succeeded_event(&started.payment_intent_id, 27864, &started.customer_id, metadata);

        let (first, second) = tokio::join!(
            service.handle_card_event(&event, date(2026, 3, 1)),
            service.handle_card_event(&event, date(2026, 3, 1)),
        );

        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(sandbox.reservations.reservations().len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_intents_each_book() {
        let (service, sandbox) = setup();
        let arrival = date(2026, 3, 4);
        let request = stay("studio-king", arrival, date(2026, 3, 6));
        let rates = nightly_rates_from(arrival, &[dec("129.00"), dec("129.00")]);

        service
            .start_card_payment(&request, &guest(), &rates)
            .await
            .unwrap();
        for intent_id in ["pi_a", "pi_b"] {
            let metadata = sandbox.card.intents()[0].metadata.clone();
            let event = succeeded_event(intent_id, 27864, "cus_x", metadata);
            service
                .handle_card_event(&event, date(2026, 3, 1))
                .await
                .unwrap();
        }

        assert_eq!(sandbox.reservations.reservations().len(), 2);
    }

    #[tokio::test]
    async fn test_periods_already_started_are_not_scheduled() {
        let (service, sandbox) = setup();
        let (request, rates) = long_stay();
        let started = service
            .start_card_payment(&request, &guest(), &rates)
            .await
            .unwrap();
        let metadata = sandbox.card.intents()[0].metadata.clone();

        let event = succeeded_event(&started.payment_intent_id, 309000, &started.customer_id, metadata);
        let outcome = service
            .handle_card_event(&event, date(2026, 4, 1))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            CardEventOutcome::BookingCreated { ref scheduled_periods, .. } if scheduled_periods.is_empty()
        ));
        assert!(sandbox.scheduler.scheduled().is_empty());
    }

    #[tokio::test]
    async fn test_schedule_failure_still_books() {
        let (service, sandbox) = setup();
        sandbox.scheduler.fail_period(2);
        let (request, rates) = long_stay();
        let started = service
            .start_card_payment(&request, &guest(), &rates)
            .await
            .unwrap();
        let metadata = sandbox.card.intents()[0].metadata.clone();

        let event = succeeded_event(&started.payment_intent_id, 309000, &started.customer_id, metadata);
        let outcome = service
            .handle_card_event(&event, date(2026, 3, 2))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CardEventOutcome::BookingCreated {
                booking_id: "BK1000".to_string(),
                scheduled_periods: Vec::new(),
            }
        );
        assert_eq!(sandbox.reservations.reservations().len(), 1);
    }

    #[tokio::test]
    async fn test_succeeded_short_stay_event_books_without_schedule() {
        let (service, sandbox) = setup();
        let arrival = date(2026, 3, 4);
        let request = stay("studio-king", arrival, date(2026, 3, 6));
        let rates = nightly_rates_from(arrival, &[dec("129.00"), dec("129.00")]);
        let started = service
            .start_card_payment(&request, &guest(), &rates)
            .await
            .unwrap();
        let metadata = sandbox.card.intents()[0].metadata.clone();

        let event = succeeded_event(&started.payment_intent_id, 27864, &started.customer_id, metadata);
        service
            .handle_card_event(&event, date(2026, 3, 1))
            .await
            .unwrap();

        let (_, reservation) = &sandbox.reservations.reservations()[0];
        assert_eq!(reservation.total_price, dec("278.64"));
        assert_eq!(reservation.notes, "Short-term stay. Card payment.");
        assert!(sandbox.scheduler.scheduled().is_empty());
    }

    #[tokio::test]
    async fn test_recurring_payment_event_books_nothing() {
        let (service, sandbox) = setup();
        let (request, rates) = long_stay();
        service
            .start_card_payment(&request, &guest(), &rates)
            .await
            .unwrap();
        let mut metadata = sandbox.card.intents()[0].metadata.clone();
        metadata.kind = ChargeKind::RecurringPayment;
        metadata.period_number = Some(2);

        let event = succeeded_event("pi_recurring", 154500, "cus_1", metadata);
        let outcome = service
            .handle_card_event(&event, date(2026, 4, 1))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CardEventOutcome::RecurringPaymentRecorded {
                period_number: Some(2)
            }
        );
        assert!(sandbox.reservations.reservations().is_empty());
    }

    #[tokio::test]
    async fn test_failed_and_unknown_events() {
        let (service, sandbox) = setup();
        let failed = CardEvent {
            id: "evt_2".to_string(),
            event_type: EVENT_PAYMENT_FAILED.to_string(),
            data: CardEventData {
                object: PaymentIntentObject {
                    id: "pi_failed".to_string(),
                    amount: 27864,
                    customer: None,
                    metadata: None,
                    last_payment_error: None,
                },
            },
        };
        assert_eq!(
            service.handle_card_event(&failed, date(2026, 3, 1)).await.unwrap(),
            CardEventOutcome::PaymentFailed {
                payment_intent_id: "pi_failed".to_string()
            }
        );

        let mut other = failed.clone();
        other.event_type = "charge.refunded".to_string();
        assert_eq!(
            service.handle_card_event(&other, date(2026, 3, 1)).await.unwrap(),
            CardEventOutcome::Ignored
        );
        assert!(sandbox.reservations.reservations().is_empty());
    }
}

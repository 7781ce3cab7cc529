//! In-memory collaborators.
//!
//! These adapters stand in for the property-management backend and the
//! payment processors when running locally and in tests. Availability and
//! rates come from the property configuration; payments are approved unless
//! told otherwise; reservations and scheduled charges are kept in memory.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{Guest, NightlyRate, RoomOffer, ScheduledCharge};

use super::Collaborators;
use super::ports::{
    AchOutcome, AchProcessor, AchSaleRequest, AvailabilitySource, CardIntent, CardIntentRequest,
    CardProcessor, ChargeScheduler, ProcessedPayments, ReservationRequest, ReservationService,
};
use super::CardEventOutcome;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..16].to_string()
}

/// Availability backed by the configured rate tables.
///
/// Every room is available unless one of its nights has been blocked or no
/// rate table covers it.
pub struct ConfiguredAvailability {
    config: Arc<ConfigLoader>,
    blocked: Mutex<HashMap<String, HashSet<NaiveDate>>>,
}

impl ConfiguredAvailability {
    /// Creates an availability source over the given configuration.
    pub fn new(config: Arc<ConfigLoader>) -> Self {
        Self {
            config,
            blocked: Mutex::new(HashMap::new()),
        }
    }

    /// Marks a night as booked for a room.
    pub fn block(&self, room_slug: &str, night: NaiveDate) {
        lock(&self.blocked)
            .entry(room_slug.to_string())
            .or_default()
            .insert(night);
    }

    fn rates_for(
        &self,
        room_slug: &str,
        arrival: NaiveDate,
        departure: NaiveDate,
    ) -> EngineResult<Vec<NightlyRate>> {
        arrival
            .iter_days()
            .take_while(|night| *night < departure)
            .map(|night| {
                self.config
                    .get_nightly_rate(room_slug, night)
                    .map(|rate| NightlyRate::new(night, rate))
            })
            .collect()
    }

    fn is_blocked(&self, room_slug: &str, arrival: NaiveDate, departure: NaiveDate) -> bool {
        lock(&self.blocked).get(room_slug).is_some_and(|nights| {
            nights
                .iter()
                .any(|night| *night >= arrival && *night < departure)
        })
    }
}

#[async_trait]
impl AvailabilitySource for ConfiguredAvailability {
    async fn offers(
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

        let mut offers: Vec<RoomOffer> = self
            .config
            .config()
            .rooms()
            .iter()
            .filter(|(_, room)| guests <= room.max_guests)
            .map(|(slug, room)| {
                let nightly_rates = self.rates_for(slug, arrival, departure).ok();
                let available =
                    nightly_rates.is_some() && !self.is_blocked(slug, arrival, departure);
                let nightly_rates = nightly_rates.unwrap_or_default();
                let total_price = (!nightly_rates.is_empty())
                    .then(|| nightly_rates.iter().map(|night| night.rate).sum::<Decimal>());

                RoomOffer {
                    room_id: room.room_id,
                    slug: slug.clone(),
                    name: room.name.clone(),
                    available,
                    total_price,
                    nightly_rates,
                    max_guests: room.max_guests,
                }
            })
            .collect();

        offers.sort_by_key(|offer| offer.room_id);
        debug!(%arrival, %departure, guests, rooms = offers.len(), "Built sandbox offers");
        Ok(offers)
    }

    async fn calendar_rates(
        &self,
        room_id: u32,
        arrival: NaiveDate,
        departure: NaiveDate,
    ) -> EngineResult<Vec<NightlyRate>> {
        let slug = self
            .config
            .room_slug(room_id)
            .ok_or_else(|| EngineError::RoomNotFound {
                slug: format!("room-{}", room_id),
            })?;
        self.rates_for(slug, arrival, departure)
    }
}

/// Card processor that approves everything and records what it was asked.
#[derive(Default)]
pub struct SandboxCardProcessor {
    customers: Mutex<HashMap<String, Guest>>,
    intents: Mutex<Vec<CardIntentRequest>>,
    saved_cards: Mutex<HashMap<String, Vec<String>>>,
}

impl SandboxCardProcessor {
    /// Creates an empty processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every intent request received so far.
    pub fn intents(&self) -> Vec<CardIntentRequest> {
        lock(&self.intents).clone()
    }

    /// Saves a card on a customer, as if the client had confirmed with it.
    pub fn save_card(&self, customer_id: &str, payment_method_id: &str) {
        lock(&self.saved_cards)
            .entry(customer_id.to_string())
            .or_default()
            .insert(0, payment_method_id.to_string());
    }
}

#[async_trait]
impl CardProcessor for SandboxCardProcessor {
    async fn create_customer(&self, guest: &Guest) -> EngineResult<String> {
        let id = format!("cus_{}", short_id());
        lock(&self.customers).insert(id.clone(), guest.clone());
        Ok(id)
    }

    async fn create_payment_intent(&self, request: CardIntentRequest) -> EngineResult<CardIntent> {
        if !lock(&self.customers).contains_key(&request.customer_id) {
            return Err(EngineError::collaborator(
                "card processor",
                format!("no such customer: {}", request.customer_id),
            ));
        }

        let id = format!("pi_{}", short_id());
        let client_secret = format!("{}_secret_{}", id, short_id());

        if request.save_for_off_session {
            self.save_card(&request.customer_id, &format!("pm_{}", short_id()));
        }
        lock(&self.intents).push(request);

        Ok(CardIntent { id, client_secret })
    }

    async fn saved_payment_methods(&self, customer_id: &str) -> EngineResult<Vec<String>> {
        Ok(lock(&self.saved_cards)
            .get(customer_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// ACH processor that approves every sale except for declined accounts.
#[derive(Default)]
pub struct SandboxAchProcessor {
    declined_accounts: Mutex<HashSet<String>>,
    sales: Mutex<Vec<AchSaleRequest>>,
}

impl SandboxAchProcessor {
    /// Creates an empty processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every sale against this account number decline.
    pub fn decline_account(&self, account_number: &str) {
        lock(&self.declined_accounts).insert(account_number.to_string());
    }

    /// Returns every sale request received so far.
    pub fn sales(&self) -> Vec<AchSaleRequest> {
        lock(&self.sales).clone()
    }
}

#[async_trait]
impl AchProcessor for SandboxAchProcessor {
    async fn sale(&self, request: AchSaleRequest) -> EngineResult<AchOutcome> {
        let declined = lock(&self.declined_accounts).contains(&request.bank_account.account_number);
        lock(&self.sales).push(request);

        if declined {
            return Ok(AchOutcome {
                approved: false,
                transaction_id: None,
                message: "DECLINED: insufficient funds".to_string(),
            });
        }

        Ok(AchOutcome {
            approved: true,
            transaction_id: Some(format!("trn_{}", Uuid::new_v4())),
            message: "APPROVED".to_string(),
        })
    }
}

/// Reservation store kept in memory.
#[derive(Default)]
pub struct InMemoryReservations {
    reservations: Mutex<Vec<(String, ReservationRequest)>>,
}

impl InMemoryReservations {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every reservation with its booking id.
    pub fn reservations(&self) -> Vec<(String, ReservationRequest)> {
        lock(&self.reservations).clone()
    }
}

#[async_trait]
impl ReservationService for InMemoryReservations {
    async fn create(&self, request: ReservationRequest) -> EngineResult<String> {
        let mut reservations = lock(&self.reservations);
        let booking_id = format!("BK{}", 1000 + reservations.len());
        reservations.push((booking_id.clone(), request));
        Ok(booking_id)
    }
}

/// Charge scheduler kept in memory.
#[derive(Default)]
pub struct InMemoryChargeScheduler {
    scheduled: Mutex<Vec<ScheduledCharge>>,
    failing_periods: Mutex<HashSet<u32>>,
}

impl InMemoryChargeScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes scheduling the given billing period fail.
    pub fn fail_period(&self, period_number: u32) {
        lock(&self.failing_periods).insert(period_number);
    }

    /// Returns every charge scheduled so far.
    pub fn scheduled(&self) -> Vec<ScheduledCharge> {
        lock(&self.scheduled).clone()
    }
}

#[async_trait]
impl ChargeScheduler for InMemoryChargeScheduler {
    async fn schedule(&self, charge: ScheduledCharge) -> EngineResult<String> {
        if lock(&self.failing_periods).contains(&charge.period_number) {
            return Err(EngineError::collaborator(
                "charge scheduler",
                format!("could not schedule period {}", charge.period_number),
            ));
        }

        lock(&self.scheduled).push(charge);
        Ok(format!("sch_{}", short_id()))
    }
}

/// Handled card payments kept in memory.
#[derive(Default)]
pub struct InMemoryProcessedPayments {
    outcomes: Mutex<HashMap<String, CardEventOutcome>>,
}

impl InMemoryProcessedPayments {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many intents have been recorded.
    pub fn len(&self) -> usize {
        lock(&self.outcomes).len()
    }

    /// Returns true when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        lock(&self.outcomes).is_empty()
    }
}

#[async_trait]
impl ProcessedPayments for InMemoryProcessedPayments {
    async fn outcome(&self, payment_intent_id: &str) -> EngineResult<Option<CardEventOutcome>> {
        Ok(lock(&self.outcomes).get(payment_intent_id).cloned())
    }

    async fn record(&self, payment_intent_id: &str, outcome: CardEventOutcome) -> EngineResult<()> {
        lock(&self.outcomes).insert(payment_intent_id.to_string(), outcome);
        Ok(())
    }
}

/// The full set of sandbox collaborators, with typed handles for inspection.
#[derive(Clone)]
pub struct SandboxCollaborators {
    /// Rate-table availability.
    pub availability: Arc<ConfiguredAvailability>,
    /// Card processor.
    pub card: Arc<SandboxCardProcessor>,
    /// ACH processor.
    pub ach: Arc<SandboxAchProcessor>,
    /// Reservation store.
    pub reservations: Arc<InMemoryReservations>,
    /// Recurring charge scheduler.
    pub scheduler: Arc<InMemoryChargeScheduler>,
    /// Handled card payments.
    pub processed: Arc<InMemoryProcessedPayments>,
}

impl SandboxCollaborators {
    /// Creates fresh sandbox collaborators over the given configuration.
    pub fn new(config: Arc<ConfigLoader>) -> Self {
        Self {
            availability: Arc::new(ConfiguredAvailability::new(config)),
            card: Arc::new(SandboxCardProcessor::new()),
            ach: Arc::new(SandboxAchProcessor::new()),
            reservations: Arc::new(InMemoryReservations::new()),
            scheduler: Arc::new(InMemoryChargeScheduler::new()),
            processed: Arc::new(InMemoryProcessedPayments::new()),
        }
    }

    /// Returns the collaborators as trait objects for the checkout service.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            availability: self.availability.clone(),
            card: self.card.clone(),
            ach: self.ach.clone(),
            reservations: self.reservations.clone(),
            scheduler: self.scheduler.clone(),
            processed: self.processed.clone(),
        }
    }
}

//! Configuration types for property pricing.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default number of nights at which a stay becomes long-term.
pub const DEFAULT_LONG_TERM_THRESHOLD: u32 = 30;

/// Default card-processing surcharge on long-term stays (3%).
pub const DEFAULT_CC_FEE_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 2);

/// Default length of one billing period, in nights.
pub const DEFAULT_BILLING_CYCLE_NIGHTS: u32 = 30;

/// Default minimum stay length, in nights.
pub const DEFAULT_MIN_NIGHTS: u32 = 1;

fn default_long_term_threshold() -> u32 {
    DEFAULT_LONG_TERM_THRESHOLD
}

fn default_cc_fee_rate() -> Decimal {
    DEFAULT_CC_FEE_RATE
}

fn default_billing_cycle_nights() -> u32 {
    DEFAULT_BILLING_CYCLE_NIGHTS
}

fn default_min_nights() -> u32 {
    DEFAULT_MIN_NIGHTS
}

fn default_currency() -> String {
    "usd".to_string()
}

/// Jurisdiction-specific pricing rules injected into the pricing engine.
///
/// Only the tax rate has no sensible default; the threshold, fee and cycle
/// length default to 30 nights, 3% and 30 nights.
///
/// # Example
///
/// ```
/// use stay_pricing::config::PricingPolicy;
/// use rust_decimal::Decimal;
///
/// let policy = PricingPolicy::new(Decimal::new(8, 2));
/// assert_eq!(policy.long_term_threshold, 30);
/// assert_eq!(policy.cc_fee_rate, Decimal::new(3, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Default tax rate for short stays, as a fraction (0.08 = 8%).
    pub tax_rate: Decimal,
    /// Stays of at least this many nights are long-term.
    #[serde(default = "default_long_term_threshold")]
    pub long_term_threshold: u32,
    /// Card surcharge applied to long-term stays, as a fraction.
    #[serde(default = "default_cc_fee_rate")]
    pub cc_fee_rate: Decimal,
    /// Maximum nights per billing period.
    #[serde(default = "default_billing_cycle_nights")]
    pub billing_cycle_nights: u32,
}

impl PricingPolicy {
    /// Creates a policy with the given tax rate and default thresholds.
    pub fn new(tax_rate: Decimal) -> Self {
        Self {
            tax_rate,
            long_term_threshold: DEFAULT_LONG_TERM_THRESHOLD,
            cc_fee_rate: DEFAULT_CC_FEE_RATE,
            billing_cycle_nights: DEFAULT_BILLING_CYCLE_NIGHTS,
        }
    }

    /// Checks that the policy can drive the pricing engine.
    ///
    /// Rates must be fractions in `[0, 1]` and both night counts must be at
    /// least one.
    pub fn validate(&self) -> Result<(), String> {
        let fraction = |name: &str, value: Decimal| {
            if value < Decimal::ZERO || value > Decimal::ONE {
                Err(format!("{} must be between 0 and 1, got {}", name, value))
            } else {
                Ok(())
            }
        };

        fraction("tax_rate", self.tax_rate)?;
        fraction("cc_fee_rate", self.cc_fee_rate)?;

        if self.long_term_threshold == 0 {
            return Err("long_term_threshold must be at least 1 night".to_string());
        }
        if self.billing_cycle_nights == 0 {
            return Err("billing_cycle_nights must be at least 1 night".to_string());
        }

        Ok(())
    }
}

/// Metadata about the property, from property.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyMetadata {
    /// Short identifier (e.g., "rewak-studios").
    pub code: String,
    /// Display name.
    pub name: String,
    /// City and region, for display.
    pub location: String,
    /// ISO currency code used for charges.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Shortest bookable stay.
    #[serde(default = "default_min_nights")]
    pub min_nights: u32,
    /// Pricing rules for this property.
    pub pricing: PricingPolicy,
}

/// A bookable room.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomConfig {
    /// The room id in the property-management backend.
    pub room_id: u32,
    /// Display name.
    pub name: String,
    /// Maximum occupancy.
    pub max_guests: u32,
}

/// Rooms configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomsConfig {
    /// Map of room slug to room details.
    pub rooms: HashMap<String, RoomConfig>,
}

/// Nightly rates effective from a given date.
#[derive(Debug, Clone, Deserialize)]
pub struct RateTable {
    /// The first night these rates apply to.
    pub effective_date: NaiveDate,
    /// Map of room slug to nightly rate.
    pub rates: HashMap<String, Decimal>,
    /// Optional map of room slug to Friday and Saturday night rate.
    #[serde(default)]
    pub weekend_rates: HashMap<String, Decimal>,
}

/// The complete property configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PropertyConfig {
    metadata: PropertyMetadata,
    rooms: HashMap<String, RoomConfig>,
    /// Rate tables by effective date (sorted oldest first).
    rates: Vec<RateTable>,
}

impl PropertyConfig {
    /// Creates a new PropertyConfig from its component parts.
    pub fn new(
        metadata: PropertyMetadata,
        rooms: HashMap<String, RoomConfig>,
        rates: Vec<RateTable>,
    ) -> Self {
        let mut sorted_rates = rates;
        sorted_rates.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            metadata,
            rooms,
            rates: sorted_rates,
        }
    }

    /// Returns the property metadata.
    pub fn property(&self) -> &PropertyMetadata {
        &self.metadata
    }

    /// Returns all rooms keyed by slug.
    pub fn rooms(&self) -> &HashMap<String, RoomConfig> {
        &self.rooms
    }

    /// Returns all rate tables, oldest first.
    pub fn rates(&self) -> &[RateTable] {
        &self.rates
    }
}

//! Room offer model returned by the availability source.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::NightlyRate;

/// Availability and pricing for one room over a requested date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomOffer {
    /// Backend room id.
    pub room_id: u32,
    /// Room slug used in URLs and configuration.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Whether the room can be booked for the whole range.
    pub available: bool,
    /// Total price for the range, when the backend quotes one.
    #[serde(default)]
    pub total_price: Option<Decimal>,
    /// Per-night rates for the range. May be empty when only a total is quoted.
    #[serde(default)]
    pub nightly_rates: Vec<NightlyRate>,
    /// Maximum occupancy.
    pub max_guests: u32,
}

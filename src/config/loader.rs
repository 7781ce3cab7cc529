//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading property
//! configurations from YAML files.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{PricingPolicy, PropertyConfig, PropertyMetadata, RoomConfig, RoomsConfig, RateTable};

/// Loads and provides access to property configuration.
///
/// # Directory Structure
///
/// ```text
/// config/rewak-studios/
/// ├── property.yaml        # Metadata, currency, pricing policy
/// ├── rooms.yaml           # Bookable rooms
/// └── rates/
///     └── 2026-01-01.yaml  # Nightly rates effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use stay_pricing::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/rewak-studios").unwrap();
/// let room = loader.get_room("studio-king").unwrap();
/// println!("Room: {}", room.name);
///
/// let night = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
/// let rate = loader.get_nightly_rate("studio-king", night).unwrap();
/// println!("Nightly rate: ${}", rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PropertyConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Fails with `ConfigNotFound` when a file or the rates directory is
    /// missing, and with `ConfigParseError` when a file is not valid YAML
    /// for its expected shape or the pricing policy is out of range.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let property_path = path.join("property.yaml");
        let metadata = Self::load_yaml::<PropertyMetadata>(&property_path)?;
        metadata
            .pricing
            .validate()
            .map_err(|message| EngineError::ConfigParseError {
                path: property_path.display().to_string(),
                message,
            })?;

        let rooms_config = Self::load_yaml::<RoomsConfig>(&path.join("rooms.yaml"))?;
        let rates = Self::load_rates(&path.join("rates"))?;

        let config = PropertyConfig::new(metadata, rooms_config.rooms, rates);

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: PropertyConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rate tables from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<RateTable>> {
        let rates_dir_str = rates_dir.display().to_string();

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut rates = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                rates.push(Self::load_yaml::<RateTable>(&path)?);
            }
        }

        if rates.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(rates)
    }

    /// Returns the underlying property configuration.
    pub fn config(&self) -> &PropertyConfig {
        &self.config
    }

    /// Returns the property metadata.
    pub fn property(&self) -> &PropertyMetadata {
        self.config.property()
    }

    /// Returns the pricing policy handed to the pricing engine.
    pub fn pricing_policy(&self) -> &PricingPolicy {
        &self.config.property().pricing
    }

    /// Returns the shortest bookable stay, in nights.
    pub fn min_nights(&self) -> u32 {
        self.config.property().min_nights
    }

    /// Gets a room by its slug.
    pub fn get_room(&self, slug: &str) -> EngineResult<&RoomConfig> {
        self.config
            .rooms()
            .get(slug)
            .ok_or_else(|| EngineError::RoomNotFound {
                slug: slug.to_string(),
            })
    }

    /// Finds the slug of the room with the given backend id.
    pub fn room_slug(&self, room_id: u32) -> Option<&str> {
        self.config
            .rooms()
            .iter()
            .find(|(_, room)| room.room_id == room_id)
            .map(|(slug, _)| slug.as_str())
    }

    /// Gets the configured rate for a room on a given night.
    ///
    /// Uses the most recent rate table effective on or before the night.
    /// Friday and Saturday nights use the table's weekend rate when one is
    /// configured for the room.
    pub fn get_nightly_rate(&self, slug: &str, date: NaiveDate) -> EngineResult<Decimal> {
        let not_found = || EngineError::RateNotFound {
            room: slug.to_string(),
            date,
        };

        let table = self
            .config
            .rates()
            .iter()
            .rev()
            .find(|table| table.effective_date <= date)
            .ok_or_else(not_found)?;

        let is_weekend_night = matches!(date.weekday(), Weekday::Fri | Weekday::Sat);

        is_weekend_night
            .then(|| table.weekend_rates.get(slug))
            .flatten()
            .or_else(|| table.rates.get(slug))
            .copied()
            .ok_or_else(not_found)
    }
}

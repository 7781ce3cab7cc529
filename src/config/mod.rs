//! Configuration loading and management.
//!
//! This module loads property configurations from YAML files: property
//! metadata with its pricing policy, the room catalogue and dated nightly
//! rate tables.
//!
//! # Example
//!
//! ```no_run
//! use stay_pricing::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/rewak-studios").unwrap();
//! println!("Loaded property: {}", config.property().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DEFAULT_BILLING_CYCLE_NIGHTS, DEFAULT_CC_FEE_RATE, DEFAULT_LONG_TERM_THRESHOLD,
    DEFAULT_MIN_NIGHTS, PricingPolicy, PropertyConfig, PropertyMetadata, RateTable, RoomConfig,
};

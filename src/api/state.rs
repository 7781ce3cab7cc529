//! Application state for the booking API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::booking::CheckoutService;
use crate::config::ConfigLoader;

/// Shared application state.
///
/// Holds the checkout service, which owns the property configuration and the
/// collaborators, and the secret card webhooks are signed with.
#[derive(Clone)]
pub struct AppState {
    checkout: Arc<CheckoutService>,
    webhook_secret: Option<Arc<str>>,
}

impl AppState {
    /// Creates a new application state around a checkout service.
    ///
    /// Without a webhook secret every card webhook is rejected.
    pub fn new(checkout: CheckoutService, webhook_secret: Option<String>) -> Self {
        Self {
            checkout: Arc::new(checkout),
            webhook_secret: webhook_secret
                .filter(|secret| !secret.is_empty())
                .map(Arc::from),
        }
    }

    /// Returns the checkout service.
    pub fn checkout(&self) -> &CheckoutService {
        &self.checkout
    }

    /// Returns the property configuration.
    pub fn config(&self) -> &ConfigLoader {
        self.checkout.config()
    }

    /// Returns the card webhook secret, if configured.
    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref()
    }
}

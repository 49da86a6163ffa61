//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use tokio_util::sync::CancellationToken;

use crate::config::ConfigLoader;
use crate::processing::PayrollService;

/// Shared application state.
///
/// Holds the payroll service (configuration plus stores) and the shutdown
/// token that payroll runs derive their cancellation from.
#[derive(Clone)]
pub struct AppState {
    service: PayrollService,
    shutdown: CancellationToken,
}

impl AppState {
    /// Creates state over an existing service.
    pub fn new(service: PayrollService, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }

    /// Creates state with in-memory stores and a fresh shutdown token.
    pub fn in_memory(config: ConfigLoader) -> Self {
        Self::new(PayrollService::in_memory(config), CancellationToken::new())
    }

    /// Returns the payroll service.
    pub fn service(&self) -> &PayrollService {
        &self.service
    }

    /// Returns the server shutdown token.
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }
}

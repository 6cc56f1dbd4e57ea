//! Shared application state for the API server

use crate::datasource::Datasource;

/// Shared application state
///
/// Read-only after startup; every request works on its own query data.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Data source used for query batches and health checks
    pub datasource: Datasource,
}

impl AppState {
    /// Creates a new application state
    pub fn new(datasource: Datasource) -> Self {
        AppState { datasource }
    }
}

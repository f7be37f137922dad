//! # Application State
//!
//! Shared state for the Axum application: the SQLite connection behind a
//! mutex (every ledger write wants exclusive use of the connection for
//! its transaction anyway) and the injected capability check.

use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;

use bursar_core::{CapabilityCheck, StaticCapabilities};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Single writer connection. Handlers take the lock for the duration
    /// of one ledger call and never hold it across an await point.
    pub db: Arc<Mutex<Connection>>,
    /// Role/module/action permission source.
    pub caps: Arc<dyn CapabilityCheck>,
}

impl AppState {
    /// State with the built-in static capability table.
    pub fn new(conn: Connection) -> Self {
        Self::with_capabilities(conn, Arc::new(StaticCapabilities))
    }

    /// State with a caller-supplied capability source.
    pub fn with_capabilities(conn: Connection, caps: Arc<dyn CapabilityCheck>) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            caps,
        }
    }
}

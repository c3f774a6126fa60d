// Expense Tracker - Core Library
// Exposes the record store, its HTTP API and the chat intake agent for the
// server and bot binaries and for tests.

pub mod config;
pub mod db;
pub mod error;
pub mod record;
pub mod report;
pub mod response;

#[cfg(feature = "server")]
pub mod api;

#[cfg(feature = "bot")]
pub mod client;
#[cfg(feature = "bot")]
pub mod intake;
#[cfg(feature = "bot")]
pub mod telegram;

// Re-export commonly used types
pub use db::{setup_database, ExpenseStore};
pub use error::{StoreError, StoreResult};
pub use record::{
    format_date, parse_amount, parse_date, ExpensePayload, ExpenseRecord, DATE_FORMAT,
};
pub use report::ExpenseReport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global tracing subscriber, honouring `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

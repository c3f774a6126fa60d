// Expense Tracker - Web Server
// REST API over the SQLite record store

use anyhow::{Context, Result};
use expense_tracker::api::{router, AppState};
use expense_tracker::config::ServerConfig;
use expense_tracker::{init_tracing, ExpenseStore, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ServerConfig::from_env()?;
    tracing::info!(version = VERSION, "expense server starting");

    let store = ExpenseStore::open(&config.database)
        .with_context(|| format!("failed to open database {}", config.database.display()))?;
    tracing::info!(records = store.count()?, "database ready");

    let app = router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind))?;

    tracing::info!("server running on http://{}", config.bind);
    tracing::info!("API: http://{}/api/expenses", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await
        .context("server error")?;

    Ok(())
}

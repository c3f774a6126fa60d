// Expense Tracker - Configuration
// Flags with environment fallbacks; binaries load `.env` first via dotenvy.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

/// Settings for the record store HTTP server
#[derive(Parser, Debug, Clone)]
#[command(name = "expense-server", about = "Expense record store HTTP API")]
pub struct ServerConfig {
    /// SQLite database file
    #[arg(long, env = "EXPENSES_DB", default_value = "expenses.db")]
    pub database: PathBuf,

    /// Address to listen on
    #[arg(long, env = "EXPENSES_BIND", default_value = "127.0.0.1:8001")]
    pub bind: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::try_parse().map_err(|e| anyhow!(e))
    }
}

/// Settings for the Telegram intake bot
#[derive(Parser, Debug, Clone)]
#[command(name = "expense-bot", about = "Conversational front end for the expense store")]
pub struct BotConfig {
    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Base URL of the expense server
    #[arg(long, env = "EXPENSES_API_URL", default_value = "http://127.0.0.1:8001")]
    pub api_url: String,

    /// Base URL of the Telegram Bot API
    #[arg(long, env = "TELEGRAM_API_URL", default_value = "https://api.telegram.org")]
    pub telegram_url: String,

    /// Long-poll timeout for getUpdates, in seconds
    #[arg(long, env = "POLL_TIMEOUT_SECS", default_value_t = 30)]
    pub poll_timeout: u64,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::try_parse().map_err(|e| anyhow!(e))
    }
}

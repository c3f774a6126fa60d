// Expense Tracker - Telegram Bot
// Conversational front end forwarding completed requests to the expense server

use anyhow::{Context, Result};
use expense_tracker::client::HttpExpenseApi;
use expense_tracker::config::BotConfig;
use expense_tracker::telegram::{self, TelegramBot};
use expense_tracker::{init_tracing, VERSION};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = BotConfig::from_env()?;
    tracing::info!(version = VERSION, api = %config.api_url, "expense bot starting");

    // Long polls hold the request open for `poll_timeout` seconds
    let telegram_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.poll_timeout + 15))
        .build()
        .context("failed to build telegram client")?;
    let bot = TelegramBot::new(telegram_client, &config.telegram_url, &config.bot_token);

    let api = Arc::new(HttpExpenseApi::new(config.api_url.clone()));

    telegram::run(bot, api, config.poll_timeout).await?;

    tracing::info!("bot stopped");
    Ok(())
}

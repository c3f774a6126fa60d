// Expense Tracker - Telegram Transport
// Long-polls the Bot API and routes every chat to its own worker task, which
// owns that chat's Conversation. Replies flow back through one delivery task.

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::client::ExpenseApi;
use crate::intake::{Conversation, Reply};
use crate::report::REPORT_CONTENT_TYPE;

pub type ChatId = i64;

/// A chat with no messages for this long loses its worker and any open flow
pub const CHAT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

// ============================================================================
// BOT API TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram api error: {0}")]
    Api(String),
}

// ============================================================================
// CLIENT
// ============================================================================

/// Minimal Bot API client: getUpdates, sendMessage, sendDocument
pub struct TelegramBot {
    client: Client,
    base_url: String,
}

impl TelegramBot {
    pub fn new(client: Client, telegram_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/bot{}", telegram_url.trim_end_matches('/'), token),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, TelegramError> {
        let body: TelegramResponse<T> = request.send().await?.json().await?;
        match (body.ok, body.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api(
                body.description.unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }

    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        let request = self.client.get(self.method_url("getUpdates")).query(&[
            ("offset", offset.to_string()),
            ("timeout", timeout_secs.to_string()),
            ("allowed_updates", "[\"message\"]".to_string()),
        ]);
        Self::call(request).await
    }

    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TelegramError> {
        let request = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }));
        Self::call::<serde_json::Value>(request).await.map(|_| ())
    }

    pub async fn send_document(
        &self,
        chat_id: ChatId,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<(), TelegramError> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(REPORT_CONTENT_TYPE)?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let request = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form);
        Self::call::<serde_json::Value>(request).await.map(|_| ())
    }

    pub async fn send_reply(&self, chat_id: ChatId, reply: Reply) -> Result<(), TelegramError> {
        match reply {
            Reply::Text(text) => self.send_message(chat_id, &text).await,
            Reply::Document { filename, bytes } => self.send_document(chat_id, &filename, bytes).await,
        }
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// A reply addressed to a chat
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub chat_id: ChatId,
    pub reply: Reply,
}

struct ChatWorker {
    inbox: UnboundedSender<String>,
    last_seen: Instant,
}

/// Maps each chat to the inbox of its worker task, spawning workers on demand.
/// A worker handles its messages strictly in order, so one chat never has two
/// steps in flight while different chats progress independently.
pub struct Dispatcher {
    api: Arc<dyn ExpenseApi>,
    outbound: UnboundedSender<Outgoing>,
    chats: HashMap<ChatId, ChatWorker>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn ExpenseApi>, outbound: UnboundedSender<Outgoing>) -> Self {
        Self {
            api,
            outbound,
            chats: HashMap::new(),
        }
    }

    pub fn active_chats(&self) -> usize {
        self.chats.len()
    }

    /// Queue `text` for the worker of `chat_id`
    pub fn dispatch(&mut self, chat_id: ChatId, text: String) {
        let worker = self.chats.entry(chat_id).or_insert_with(|| ChatWorker {
            inbox: spawn_chat(chat_id, self.api.clone(), self.outbound.clone()),
            last_seen: Instant::now(),
        });
        worker.last_seen = Instant::now();

        if let Err(mpsc::error::SendError(text)) = worker.inbox.send(text) {
            // Worker is gone; start over with a fresh conversation
            tracing::warn!(chat_id, "chat worker stopped, restarting");
            worker.inbox = spawn_chat(chat_id, self.api.clone(), self.outbound.clone());
            let _ = worker.inbox.send(text);
        }
    }

    /// Drop workers of chats silent for `CHAT_IDLE_TIMEOUT` as of `now`.
    /// A dropped inbox lets the worker finish its queue and exit.
    pub fn evict_idle(&mut self, now: Instant) -> usize {
        let before = self.chats.len();
        self.chats.retain(|chat_id, worker| {
            let keep = now.saturating_duration_since(worker.last_seen) < CHAT_IDLE_TIMEOUT;
            if !keep {
                tracing::debug!(chat_id, "chat worker idle, stopping");
            }
            keep
        });
        before - self.chats.len()
    }
}

fn spawn_chat(
    chat_id: ChatId,
    api: Arc<dyn ExpenseApi>,
    outbound: UnboundedSender<Outgoing>,
) -> UnboundedSender<String> {
    let (inbox, messages) = mpsc::unbounded_channel();
    tokio::spawn(run_chat(chat_id, messages, api, outbound));
    tracing::debug!(chat_id, "chat worker started");
    inbox
}

async fn run_chat(
    chat_id: ChatId,
    mut messages: UnboundedReceiver<String>,
    api: Arc<dyn ExpenseApi>,
    outbound: UnboundedSender<Outgoing>,
) {
    let mut conversation = Conversation::new();

    while let Some(text) = messages.recv().await {
        for reply in conversation.handle(&text, api.as_ref()).await {
            if outbound.send(Outgoing { chat_id, reply }).is_err() {
                return;
            }
        }
    }

    tracing::debug!(chat_id, "chat worker stopped");
}

async fn deliver(bot: Arc<TelegramBot>, mut outbound: UnboundedReceiver<Outgoing>) {
    while let Some(Outgoing { chat_id, reply }) = outbound.recv().await {
        if let Err(e) = bot.send_reply(chat_id, reply).await {
            tracing::error!(chat_id, error = %e, "failed to deliver reply");
        }
    }
}

/// Poll for updates until Ctrl+C
pub async fn run(bot: TelegramBot, api: Arc<dyn ExpenseApi>, poll_timeout: u64) -> Result<()> {
    let bot = Arc::new(bot);
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    tokio::spawn(deliver(bot.clone(), outbound_rx));

    let mut dispatcher = Dispatcher::new(api, outbound_tx);
    let mut offset = 0;

    tracing::info!("bot polling started");

    loop {
        let updates = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(chats = dispatcher.active_chats(), "bot shutting down");
                return Ok(());
            }
            updates = bot.get_updates(offset, poll_timeout) => updates,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed");
                tokio::time::sleep(Duration::from_secs(3)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(Message { chat, text: Some(text) }) = update.message else {
                continue;
            };
            dispatcher.dispatch(chat.id, text);
        }

        dispatcher.evict_idle(Instant::now());
    }
}

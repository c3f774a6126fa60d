// Expense Tracker - Conversation State Machine
// Advances one chat by exactly one step per received message. Requests reach
// the store only once every field of a flow has been validated.

use crate::client::{ClientError, ExpenseApi};
use crate::record::ExpensePayload;
use crate::report::REPORT_FILENAME;

use super::flow::{parse_id, parse_range, FieldOutcome, FieldStep, FlowState};
use super::messages;

/// Something to send back to the user
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Document { filename: String, bytes: Vec<u8> },
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }
}

/// Slash commands understood by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Add,
    Report,
    List,
    Delete,
    Edit,
    Cancel,
    Unknown(String),
}

impl Command {
    /// Parse `/name` or `/name@botname`, ignoring trailing arguments.
    /// Returns `None` for plain text.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name).to_lowercase();

        Some(match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "add_expense" | "add" => Command::Add,
            "get_expenses" | "report" => Command::Report,
            "list_expenses" | "list" => Command::List,
            "delete_expense" | "delete" => Command::Delete,
            "edit_expense" | "edit" => Command::Edit,
            "cancel" => Command::Cancel,
            _ => Command::Unknown(name),
        })
    }
}

/// Intake state of a single chat
#[derive(Debug, Default)]
pub struct Conversation {
    state: FlowState,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Feed one user message and return the replies for it
    pub async fn handle(&mut self, text: &str, api: &dyn ExpenseApi) -> Vec<Reply> {
        // A command always wins over the flow in progress
        if let Some(command) = Command::parse(text) {
            return self.start(command, api).await;
        }

        match std::mem::take(&mut self.state) {
            FlowState::Idle => vec![Reply::text(messages::UNKNOWN_INPUT)],
            FlowState::Add(step) => self.on_add_field(step, text, api).await,
            FlowState::AwaitingRange => self.on_range(text, api).await,
            FlowState::AwaitingDeleteId => self.on_delete_id(text, api).await,
            FlowState::AwaitingEditId => self.on_edit_id(text),
            FlowState::Edit { id, step } => self.on_edit_field(id, step, text, api).await,
        }
    }

    async fn start(&mut self, command: Command, api: &dyn ExpenseApi) -> Vec<Reply> {
        let previous = std::mem::take(&mut self.state);
        if previous != FlowState::Idle && !matches!(command, Command::Unknown(_)) {
            tracing::debug!(?previous, ?command, "flow abandoned by new command");
        }

        match command {
            Command::Start | Command::Help => vec![Reply::text(messages::MENU)],
            Command::Add => {
                self.state = FlowState::Add(FieldStep::AwaitingName);
                vec![Reply::text(messages::ASK_NAME)]
            }
            Command::Report => {
                self.state = FlowState::AwaitingRange;
                vec![Reply::text(messages::ASK_RANGE)]
            }
            Command::Delete => {
                self.state = FlowState::AwaitingDeleteId;
                vec![Reply::text(messages::ASK_DELETE_ID)]
            }
            Command::Edit => {
                self.state = FlowState::AwaitingEditId;
                vec![Reply::text(messages::ASK_EDIT_ID)]
            }
            Command::List => match api.list().await {
                Ok(records) => messages::record_list(&records).into_iter().map(Reply::Text).collect(),
                Err(err) => vec![Reply::text(failure("fetching expenses", &err))],
            },
            Command::Cancel => {
                let text = if previous == FlowState::Idle {
                    messages::NOTHING_TO_CANCEL
                } else {
                    messages::CANCELLED
                };
                vec![Reply::text(text)]
            }
            // A mistyped command keeps the flow and its collected fields
            Command::Unknown(name) => {
                tracing::debug!(command = %name, "unknown command");
                let mut replies = vec![Reply::text(messages::UNKNOWN_COMMAND)];
                replies.extend(current_prompt(&previous).map(Reply::text));
                self.state = previous;
                replies
            }
        }
    }

    // ========================================================================
    // ADD
    // ========================================================================

    async fn on_add_field(&mut self, step: FieldStep, text: &str, api: &dyn ExpenseApi) -> Vec<Reply> {
        match step.accept(text) {
            Err(error) => {
                self.state = FlowState::Add(step);
                vec![Reply::text(messages::input_error(error))]
            }
            Ok(FieldOutcome::Next(next)) => {
                let prompt = add_prompt(&next);
                self.state = FlowState::Add(next);
                vec![Reply::text(prompt)]
            }
            // State is already Idle: cleared whatever the outcome
            Ok(FieldOutcome::Complete(payload)) => match api.add(&payload).await {
                Ok(record) => {
                    tracing::info!(id = record.id, "expense submitted");
                    vec![Reply::text(messages::added(&record))]
                }
                Err(err) => vec![Reply::text(failure("adding the expense", &err))],
            },
        }
    }

    // ========================================================================
    // REPORT
    // ========================================================================

    async fn on_range(&mut self, text: &str, api: &dyn ExpenseApi) -> Vec<Reply> {
        let (start, end) = match parse_range(text) {
            Ok(range) => range,
            Err(error) => {
                self.state = FlowState::AwaitingRange;
                return vec![Reply::text(messages::input_error(error))];
            }
        };

        match api.report(&start, &end).await {
            Ok(bytes) => vec![Reply::Document {
                filename: REPORT_FILENAME.to_string(),
                bytes,
            }],
            Err(ClientError::NotFound(_)) => vec![Reply::text(messages::NOT_FOUND_RANGE)],
            Err(err) => vec![Reply::text(failure("fetching the report", &err))],
        }
    }

    // ========================================================================
    // DELETE
    // ========================================================================

    async fn on_delete_id(&mut self, text: &str, api: &dyn ExpenseApi) -> Vec<Reply> {
        let id = match parse_id(text) {
            Ok(id) => id,
            Err(error) => {
                self.state = FlowState::AwaitingDeleteId;
                return vec![Reply::text(messages::input_error(error))];
            }
        };

        let outcome = match api.delete(id).await {
            Ok(message) => format!("✅ {}", message),
            Err(ClientError::NotFound(_)) => messages::NOT_FOUND_ID.to_string(),
            Err(err) => failure("deleting the expense", &err),
        };

        vec![Reply::Text(outcome), Reply::text(messages::MENU)]
    }

    // ========================================================================
    // EDIT
    // ========================================================================

    fn on_edit_id(&mut self, text: &str) -> Vec<Reply> {
        match parse_id(text) {
            Ok(id) => {
                self.state = FlowState::Edit {
                    id,
                    step: FieldStep::AwaitingName,
                };
                vec![Reply::text(messages::ASK_NEW_NAME)]
            }
            Err(error) => {
                self.state = FlowState::AwaitingEditId;
                vec![Reply::text(messages::input_error(error))]
            }
        }
    }

    async fn on_edit_field(
        &mut self,
        id: i64,
        step: FieldStep,
        text: &str,
        api: &dyn ExpenseApi,
    ) -> Vec<Reply> {
        match step.accept(text) {
            Err(error) => {
                self.state = FlowState::Edit { id, step };
                vec![Reply::text(messages::input_error(error))]
            }
            Ok(FieldOutcome::Next(next)) => {
                let prompt = edit_prompt(&next);
                self.state = FlowState::Edit { id, step: next };
                vec![Reply::text(prompt)]
            }
            Ok(FieldOutcome::Complete(payload)) => submit_edit(id, &payload, api).await,
        }
    }
}

async fn submit_edit(id: i64, payload: &ExpensePayload, api: &dyn ExpenseApi) -> Vec<Reply> {
    match api.edit(id, payload).await {
        Ok(record) => {
            tracing::info!(id, "expense edit submitted");
            vec![Reply::text(messages::updated(&record))]
        }
        Err(ClientError::NotFound(_)) => vec![Reply::text(messages::NOT_FOUND_ID)],
        Err(err) => vec![Reply::text(failure("updating the expense", &err))],
    }
}

fn add_prompt(step: &FieldStep) -> &'static str {
    match step {
        FieldStep::AwaitingName => messages::ASK_NAME,
        FieldStep::AwaitingDate { .. } => messages::ASK_DATE,
        FieldStep::AwaitingAmount { .. } => messages::ASK_AMOUNT,
    }
}

fn edit_prompt(step: &FieldStep) -> &'static str {
    match step {
        FieldStep::AwaitingName => messages::ASK_NEW_NAME,
        FieldStep::AwaitingDate { .. } => messages::ASK_NEW_DATE,
        FieldStep::AwaitingAmount { .. } => messages::ASK_NEW_AMOUNT,
    }
}

/// Prompt for the input the flow is waiting on, `None` when idle
fn current_prompt(state: &FlowState) -> Option<&'static str> {
    match state {
        FlowState::Idle => None,
        FlowState::Add(step) => Some(add_prompt(step)),
        FlowState::AwaitingRange => Some(messages::ASK_RANGE),
        FlowState::AwaitingDeleteId => Some(messages::ASK_DELETE_ID),
        FlowState::AwaitingEditId => Some(messages::ASK_EDIT_ID),
        FlowState::Edit { step, .. } => Some(edit_prompt(step)),
    }
}

/// User-facing text for a failed store request
fn failure(action: &str, err: &ClientError) -> String {
    tracing::warn!(%err, action, "store request failed");
    match err {
        ClientError::Transport(reason) => {
            format!("❌ Could not reach the expense service: {}", reason)
        }
        ClientError::BadRequest(reason) | ClientError::NotFound(reason) => {
            format!("❌ Error {}: {}", action, reason)
        }
        ClientError::Server(_) => format!("❌ Error {}. Please try again.", action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientResult;
    use crate::db::ExpenseStore;
    use crate::error::StoreError;
    use crate::intake::flow::InputError;
    use crate::record::ExpenseRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-process store standing in for the HTTP backend
    struct LocalApi {
        store: Mutex<ExpenseStore>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl LocalApi {
        fn new() -> Self {
            Self {
                store: Mutex::new(ExpenseStore::open_in_memory().unwrap()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record_call(&self, name: &'static str) {
            self.calls.lock().unwrap().push(name);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn records(&self) -> Vec<ExpenseRecord> {
            self.store.lock().unwrap().list_all().unwrap()
        }
    }

    fn to_client(err: StoreError) -> ClientError {
        match err {
            StoreError::NotFound(msg) => ClientError::NotFound(msg),
            StoreError::Internal(msg) => ClientError::Server(msg),
            other => ClientError::BadRequest(other.to_string()),
        }
    }

    #[async_trait]
    impl ExpenseApi for LocalApi {
        async fn add(&self, payload: &ExpensePayload) -> ClientResult<ExpenseRecord> {
            self.record_call("add");
            self.store.lock().unwrap().add(payload).map_err(to_client)
        }

        async fn list(&self) -> ClientResult<Vec<ExpenseRecord>> {
            self.record_call("list");
            self.store.lock().unwrap().list_all().map_err(to_client)
        }

        async fn report(&self, start_date: &str, end_date: &str) -> ClientResult<Vec<u8>> {
            self.record_call("report");
            let report = self
                .store
                .lock()
                .unwrap()
                .report(start_date, end_date)
                .map_err(to_client)?;
            report.to_xlsx().map_err(to_client)
        }

        async fn delete(&self, id: i64) -> ClientResult<String> {
            self.record_call("delete");
            self.store.lock().unwrap().delete(id).map_err(to_client)
        }

        async fn edit(&self, id: i64, payload: &ExpensePayload) -> ClientResult<ExpenseRecord> {
            self.record_call("edit");
            self.store.lock().unwrap().edit(id, payload).map_err(to_client)
        }
    }

    /// Backend that is always down
    struct DownApi;

    #[async_trait]
    impl ExpenseApi for DownApi {
        async fn add(&self, _: &ExpensePayload) -> ClientResult<ExpenseRecord> {
            Err(ClientError::Transport("connection refused".into()))
        }

        async fn list(&self) -> ClientResult<Vec<ExpenseRecord>> {
            Err(ClientError::Transport("connection refused".into()))
        }

        async fn report(&self, _: &str, _: &str) -> ClientResult<Vec<u8>> {
            Err(ClientError::Server("HTTP 500".into()))
        }

        async fn delete(&self, _: i64) -> ClientResult<String> {
            Err(ClientError::Server("HTTP 500".into()))
        }

        async fn edit(&self, _: i64, _: &ExpensePayload) -> ClientResult<ExpenseRecord> {
            Err(ClientError::Transport("connection refused".into()))
        }
    }

    fn texts(replies: &[Reply]) -> Vec<String> {
        replies
            .iter()
            .filter_map(|r| match r {
                Reply::Text(t) => Some(t.clone()),
                Reply::Document { .. } => None,
            })
            .collect()
    }

    async fn say(conv: &mut Conversation, api: &dyn ExpenseApi, text: &str) -> Vec<Reply> {
        conv.handle(text, api).await
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/add_expense@ExpenseBot"), Some(Command::Add));
        assert_eq!(Command::parse(" /EDIT "), Some(Command::Edit));
        assert_eq!(Command::parse("/get_expenses now"), Some(Command::Report));
        assert_eq!(Command::parse("/nope"), Some(Command::Unknown("nope".into())));
        assert_eq!(Command::parse("Coffee"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[tokio::test]
    async fn test_add_flow_submits_once_complete() {
        let api = LocalApi::new();
        let mut conv = Conversation::new();

        say(&mut conv, &api, "/add_expense").await;
        say(&mut conv, &api, "Coffee").await;
        say(&mut conv, &api, "01.01.2024").await;
        assert!(api.calls().is_empty(), "nothing submitted before the amount");

        let replies = say(&mut conv, &api, "3.5").await;
        assert!(texts(&replies)[0].starts_with("✅"));
        assert_eq!(conv.state(), &FlowState::Idle);

        let records = api.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Coffee");
        assert_eq!(records[0].date_text(), "01.01.2024");
        assert_eq!(records[0].amount, 3.5);
    }

    #[tokio::test]
    async fn test_bad_amount_reprompts_and_keeps_fields() {
        let api = LocalApi::new();
        let mut conv = Conversation::new();

        say(&mut conv, &api, "/add").await;
        say(&mut conv, &api, "Coffee").await;
        say(&mut conv, &api, "01.01.2024").await;

        let replies = say(&mut conv, &api, "abc").await;
        assert_eq!(texts(&replies), vec![messages::input_error(InputError::InvalidAmount)]);
        assert_eq!(
            conv.state(),
            &FlowState::Add(FieldStep::AwaitingAmount {
                name: "Coffee".into(),
                date: "01.01.2024".into(),
            })
        );
        assert!(api.calls().is_empty());

        say(&mut conv, &api, "4").await;
        assert_eq!(api.records()[0].amount, 4.0);
    }

    #[tokio::test]
    async fn test_bad_dates_do_not_advance() {
        let api = LocalApi::new();
        let mut conv = Conversation::new();

        say(&mut conv, &api, "/add_expense").await;
        say(&mut conv, &api, "Coffee").await;

        for bad in ["2024-01-01", "31.13.2024"] {
            say(&mut conv, &api, bad).await;
            assert_eq!(
                conv.state(),
                &FlowState::Add(FieldStep::AwaitingDate { name: "Coffee".into() })
            );
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_name_reprompts() {
        let api = LocalApi::new();
        let mut conv = Conversation::new();

        say(&mut conv, &api, "/add_expense").await;
        say(&mut conv, &api, "   ").await;
        assert_eq!(conv.state(), &FlowState::Add(FieldStep::AwaitingName));
    }

    #[tokio::test]
    async fn test_add_failure_clears_state() {
        let mut conv = Conversation::new();

        say(&mut conv, &DownApi, "/add_expense").await;
        say(&mut conv, &DownApi, "Coffee").await;
        say(&mut conv, &DownApi, "01.01.2024").await;
        let replies = say(&mut conv, &DownApi, "3").await;

        assert!(texts(&replies)[0].starts_with("❌"));
        assert_eq!(conv.state(), &FlowState::Idle);
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let api = LocalApi::new();
        for i in 0..7 {
            api.add(&ExpensePayload::new(format!("E{}", i), "01.01.2024", 1.0))
                .await
                .unwrap();
        }
        let mut conv = Conversation::new();

        say(&mut conv, &api, "/delete_expense").await;
        let replies = say(&mut conv, &api, "-7").await;
        assert_eq!(conv.state(), &FlowState::AwaitingDeleteId);
        assert_eq!(texts(&replies).len(), 1);

        let replies = say(&mut conv, &api, "7").await;
        let replies = texts(&replies);
        assert!(replies[0].starts_with("✅") && replies[0].contains('7'));
        assert_eq!(replies[1], messages::MENU);
        assert_eq!(conv.state(), &FlowState::Idle);

        say(&mut conv, &api, "/delete_expense").await;
        let replies = say(&mut conv, &api, "7").await;
        assert_eq!(texts(&replies)[0], messages::NOT_FOUND_ID);
        assert_eq!(api.records().len(), 6);
    }

    #[tokio::test]
    async fn test_delete_server_error_clears_and_shows_menu() {
        let mut conv = Conversation::new();
        say(&mut conv, &DownApi, "/delete").await;
        let replies = texts(&say(&mut conv, &DownApi, "3").await);

        assert!(replies[0].starts_with("❌"));
        assert_eq!(replies[1], messages::MENU);
        assert_eq!(conv.state(), &FlowState::Idle);
    }

    #[tokio::test]
    async fn test_edit_flow_reports_updated_fields() {
        let api = LocalApi::new();
        let original = api
            .add(&ExpensePayload::new("Old", "01.01.2024", 1.0))
            .await
            .unwrap();
        let mut conv = Conversation::new();

        say(&mut conv, &api, "/edit_expense").await;
        say(&mut conv, &api, "abc").await;
        assert_eq!(conv.state(), &FlowState::AwaitingEditId);

        say(&mut conv, &api, &original.id.to_string()).await;
        say(&mut conv, &api, "New").await;
        say(&mut conv, &api, "1.1.2024").await;
        say(&mut conv, &api, "02.02.2024").await;
        let replies = texts(&say(&mut conv, &api, "2.5").await);

        assert!(replies[0].contains("Name: New"));
        assert!(replies[0].contains("Date: 02.02.2024"));
        assert!(replies[0].contains("Amount: 2.5"));
        assert_eq!(conv.state(), &FlowState::Idle);
        assert_eq!(api.records()[0].name, "New");
    }

    #[tokio::test]
    async fn test_edit_missing_id_reports_not_found() {
        let api = LocalApi::new();
        let mut conv = Conversation::new();

        for input in ["/edit", "99", "Ghost", "01.01.2024", "1"] {
            say(&mut conv, &api, input).await;
        }

        assert_eq!(api.calls(), vec!["edit"]);
        assert!(api.records().is_empty());
        assert_eq!(conv.state(), &FlowState::Idle);
    }

    #[tokio::test]
    async fn test_report_flow_delivers_document() {
        let api = LocalApi::new();
        api.add(&ExpensePayload::new("A", "01.01.2024", 100.0)).await.unwrap();
        api.add(&ExpensePayload::new("B", "15.01.2024", 50.0)).await.unwrap();
        api.add(&ExpensePayload::new("C", "01.02.2024", 9.0)).await.unwrap();
        let mut conv = Conversation::new();

        say(&mut conv, &api, "/get_expenses").await;
        let replies = say(&mut conv, &api, "01.01.2024").await;
        assert_eq!(texts(&replies), vec![messages::input_error(InputError::InvalidRange)]);
        assert_eq!(conv.state(), &FlowState::AwaitingRange);

        let replies = say(&mut conv, &api, "01.01.2024-31.01.2024").await;
        let Reply::Document { filename, bytes } = &replies[0] else {
            panic!("expected a document, got {:?}", replies);
        };
        assert_eq!(filename, REPORT_FILENAME);
        let rows = crate::report::read_rows(bytes);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|row| row[2] != "01.02.2024"));
        assert_eq!(rows[3], ["", "", "Total", "150"]);
        assert_eq!(conv.state(), &FlowState::Idle);
    }

    #[tokio::test]
    async fn test_report_empty_range_clears_state() {
        let api = LocalApi::new();
        let mut conv = Conversation::new();

        say(&mut conv, &api, "/report").await;
        let replies = say(&mut conv, &api, "01.01.2024-31.01.2024").await;
        assert_eq!(texts(&replies), vec![messages::NOT_FOUND_RANGE]);
        assert_eq!(conv.state(), &FlowState::Idle);
    }

    #[tokio::test]
    async fn test_list_command() {
        let api = LocalApi::new();
        let mut conv = Conversation::new();

        let replies = say(&mut conv, &api, "/list_expenses").await;
        assert_eq!(texts(&replies), vec![messages::NO_EXPENSES]);

        api.add(&ExpensePayload::new("Tea", "03.03.2024", 2.0)).await.unwrap();
        let replies = texts(&say(&mut conv, &api, "/list").await);
        assert_eq!(replies[0], "#1 03.03.2024 Tea: 2.00");

        let replies = texts(&say(&mut conv, &DownApi, "/list").await);
        assert!(replies[0].contains("Could not reach"));
    }

    #[tokio::test]
    async fn test_list_command_splits_long_lists() {
        let api = LocalApi::new();
        for i in 0..150 {
            api.add(&ExpensePayload::new(format!("Lunch with the team {}", i), "05.03.2024", 18.75))
                .await
                .unwrap();
        }
        let mut conv = Conversation::new();

        let replies = texts(&say(&mut conv, &api, "/list").await);
        assert!(replies.len() > 1);
        assert!(replies.iter().all(|t| t.chars().count() <= messages::MAX_MESSAGE_CHARS));
        assert_eq!(replies.iter().map(|t| t.lines().count()).sum::<usize>(), 150);
    }

    #[tokio::test]
    async fn test_unknown_command_keeps_collected_fields() {
        let api = LocalApi::new();
        let mut conv = Conversation::new();

        say(&mut conv, &api, "/add_expense").await;
        say(&mut conv, &api, "Coffee").await;
        say(&mut conv, &api, "01.01.2024").await;

        for typo in ["/oops", "/12.5"] {
            let replies = say(&mut conv, &api, typo).await;
            assert_eq!(texts(&replies), vec![messages::UNKNOWN_COMMAND, messages::ASK_AMOUNT]);
            assert_eq!(
                conv.state(),
                &FlowState::Add(FieldStep::AwaitingAmount {
                    name: "Coffee".into(),
                    date: "01.01.2024".into(),
                })
            );
        }

        say(&mut conv, &api, "12.5").await;
        assert_eq!(api.records()[0].amount, 12.5);
        assert_eq!(api.calls(), vec!["add"]);

        let replies = say(&mut conv, &api, "/oops").await;
        assert_eq!(texts(&replies), vec![messages::UNKNOWN_COMMAND]);
        assert_eq!(conv.state(), &FlowState::Idle);
    }

    #[tokio::test]
    async fn test_command_interrupts_flow() {
        let api = LocalApi::new();
        let mut conv = Conversation::new();

        say(&mut conv, &api, "/add_expense").await;
        say(&mut conv, &api, "Coffee").await;
        say(&mut conv, &api, "/delete_expense").await;
        assert_eq!(conv.state(), &FlowState::AwaitingDeleteId);

        let replies = say(&mut conv, &api, "/cancel").await;
        assert_eq!(texts(&replies), vec![messages::CANCELLED]);
        assert_eq!(conv.state(), &FlowState::Idle);

        let replies = say(&mut conv, &api, "/cancel").await;
        assert_eq!(texts(&replies), vec![messages::NOTHING_TO_CANCEL]);
    }

    #[tokio::test]
    async fn test_free_text_when_idle() {
        let api = LocalApi::new();
        let mut conv = Conversation::new();

        let replies = say(&mut conv, &api, "hello").await;
        assert_eq!(texts(&replies), vec![messages::UNKNOWN_INPUT]);
        assert!(api.calls().is_empty());
    }
}

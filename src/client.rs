// Expense Tracker - Store Client
// The intake agent's view of the record store, plus its HTTP implementation.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::record::{ExpensePayload, ExpenseRecord};
use crate::response::{ApiResponse, DeleteResponse, ReportQuery};

/// Failure of one request to the store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The store rejected the input (bad date, amount, name)
    #[error("rejected: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("server error: {0}")]
    Server(String),

    /// The store could not be reached or answered garbage
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Operations the intake agent can request from the store
#[async_trait]
pub trait ExpenseApi: Send + Sync {
    async fn add(&self, payload: &ExpensePayload) -> ClientResult<ExpenseRecord>;

    async fn list(&self) -> ClientResult<Vec<ExpenseRecord>>;

    /// Spreadsheet bytes for the inclusive range
    async fn report(&self, start_date: &str, end_date: &str) -> ClientResult<Vec<u8>>;

    /// Confirmation message on success
    async fn delete(&self, id: i64) -> ClientResult<String>;

    async fn edit(&self, id: i64, payload: &ExpensePayload) -> ClientResult<ExpenseRecord>;
}

/// `ExpenseApi` over the JSON REST surface of `expense-server`
#[derive(Clone)]
pub struct HttpExpenseApi {
    client: Client,
    base_url: String,
}

impl HttpExpenseApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }
}

#[async_trait]
impl ExpenseApi for HttpExpenseApi {
    async fn add(&self, payload: &ExpensePayload) -> ClientResult<ExpenseRecord> {
        let response = self.client.post(self.url("/expenses")).json(payload).send().await?;
        read_data(response).await
    }

    async fn list(&self) -> ClientResult<Vec<ExpenseRecord>> {
        let response = self.client.get(self.url("/expenses")).send().await?;
        read_data(response).await
    }

    async fn report(&self, start_date: &str, end_date: &str) -> ClientResult<Vec<u8>> {
        let query = ReportQuery {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        };
        let response = self
            .client
            .get(self.url("/expenses/report"))
            .query(&query)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn delete(&self, id: i64) -> ClientResult<String> {
        let response = self
            .client
            .delete(self.url(&format!("/expenses/{}", id)))
            .send()
            .await?;
        let body: DeleteResponse = read_data(response).await?;
        Ok(body.message)
    }

    async fn edit(&self, id: i64, payload: &ExpensePayload) -> ClientResult<ExpenseRecord> {
        let response = self
            .client
            .put(self.url(&format!("/expenses/{}", id)))
            .json(payload)
            .send()
            .await?;
        read_data(response).await
    }
}

/// Turn non-success statuses into typed errors, keeping the server's message
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text)
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    tracing::warn!(status = status.as_u16(), %message, "expense store returned an error");
    Err(status_error(status, message))
}

fn status_error(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::BadRequest(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        _ => ClientError::Server(message),
    }
}

async fn read_data<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let response = check_status(response).await?;
    let body: ApiResponse<T> = response.json().await?;
    body.data
        .ok_or_else(|| ClientError::Transport("response envelope carried no data".to_string()))
}

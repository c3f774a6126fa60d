// Expense Tracker - REST API
// Axum routes over the record store. Store errors map onto HTTP statuses here.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::ExpenseStore;
use crate::error::StoreError;
use crate::record::{ExpensePayload, ExpenseRecord};
use crate::report::{REPORT_CONTENT_TYPE, REPORT_FILENAME};
use crate::response::{ApiResponse, DeleteResponse, ReportQuery};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<ExpenseStore>>,
}

impl AppState {
    pub fn new(store: ExpenseStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// The single connection serializes every store operation
    fn store(&self) -> Result<MutexGuard<'_, ExpenseStore>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::internal_error("expense store lock poisoned"))
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalError(String),
}

impl ApiError {
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::InternalError(msg) => msg,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            err if err.is_validation() => ApiError::BadRequest(err.to_string()),
            err => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.message(), "request failed");
        } else {
            tracing::debug!(%status, error = %self.message(), "request rejected");
        }

        let body = ApiResponse::<serde_json::Value>::error(self.message());
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/expenses - Add an expense
async fn add_expense(
    State(state): State<AppState>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> ApiResult<ExpenseRecord> {
    let Json(payload) = payload?;
    let record = state.store()?.add(&payload)?;
    tracing::info!(id = record.id, "expense added");
    Ok(Json(ApiResponse::ok(record)))
}

/// GET /api/expenses - All expenses
async fn list_expenses(State(state): State<AppState>) -> ApiResult<Vec<ExpenseRecord>> {
    let records = state.store()?.list_all()?;
    Ok(Json(ApiResponse::ok(records)))
}

/// GET /api/expenses/:id - One expense
async fn get_expense(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ExpenseRecord> {
    let Path(id) = id?;
    let record = state.store()?.get(id)?;
    Ok(Json(ApiResponse::ok(record)))
}

/// GET /api/expenses/report?start_date=..&end_date=.. - XLSX report download
async fn expenses_report(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let report = state.store()?.report(&query.start_date, &query.end_date)?;
    let bytes = report.to_xlsx()?;

    tracing::info!(
        rows = report.records().len(),
        total = report.total(),
        "expense report generated"
    );

    let disposition = format!("attachment; filename={}", REPORT_FILENAME);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, REPORT_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// PUT /api/expenses/:id - Replace an expense
async fn edit_expense(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ExpensePayload>, JsonRejection>,
) -> ApiResult<ExpenseRecord> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let record = state.store()?.edit(id, &payload)?;
    tracing::info!(id, "expense updated");
    Ok(Json(ApiResponse::ok(record)))
}

/// DELETE /api/expenses/:id - Remove an expense
async fn delete_expense(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<DeleteResponse> {
    let Path(id) = id?;
    let message = state.store()?.delete(id)?;
    tracing::info!(id, "expense deleted");
    Ok(Json(ApiResponse::ok(DeleteResponse { message })))
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/expenses", get(list_expenses).post(add_expense))
        .route("/expenses/report", get(expenses_report))
        .route(
            "/expenses/:id",
            get(get_expense).put(edit_expense).delete(delete_expense),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

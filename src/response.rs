// Expense Tracker - Wire Envelope
// JSON shapes shared by the HTTP server and its client.

use serde::{Deserialize, Serialize};

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Confirmation returned by DELETE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Query string of the report endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportQuery {
    pub start_date: String,
    pub end_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_omits_data() {
        let json = serde_json::to_value(ApiResponse::<DeleteResponse>::error("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "boom" }));

        let back: ApiResponse<DeleteResponse> = serde_json::from_value(json).unwrap();
        assert!(back.data.is_none());
        assert_eq!(back.error.as_deref(), Some("boom"));
    }
}

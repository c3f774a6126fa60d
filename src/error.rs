// Expense Tracker - Error Types
// Every store operation returns one of these kinds; callers pick the wording.

use thiserror::Error;

/// Errors produced by the record store and its input validation
#[derive(Error, Debug)]
pub enum StoreError {
    /// Date text does not match `dd.mm.yyyy` or is not a real calendar date
    #[error("Invalid date format '{0}' (use dd.mm.yyyy)")]
    InvalidDateFormat(String),

    /// Amount is not a finite number
    #[error("Invalid amount '{0}'")]
    InvalidNumber(String),

    /// Name is empty after trimming
    #[error("Expense name must not be empty")]
    EmptyName,

    /// Referenced id is absent, or a report selected nothing
    #[error("{0}")]
    NotFound(String),

    /// Unexpected persistence failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn expense_not_found(id: i64) -> Self {
        Self::NotFound(format!("Expense with ID {} not found", id))
    }

    /// True for the kinds caused by bad client input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDateFormat(_) | Self::InvalidNumber(_) | Self::EmptyName
        )
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for StoreError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Internal(format!("report export failed: {}", err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_kinds() {
        assert!(StoreError::InvalidDateFormat("x".into()).is_validation());
        assert!(StoreError::InvalidNumber("x".into()).is_validation());
        assert!(StoreError::EmptyName.is_validation());
        assert!(!StoreError::expense_not_found(3).is_validation());
        assert!(!StoreError::Internal("disk".into()).is_validation());
    }

    #[test]
    fn test_not_found_mentions_id() {
        let err = StoreError::expense_not_found(7);
        assert!(err.to_string().contains('7'));
    }
}

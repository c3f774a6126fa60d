// Expense Tracker - Intake Flow States
// One tagged state per conversation plus the per-field validators.

use crate::record::{parse_amount, parse_date, validate_name, ExpensePayload};

/// Where a conversation currently is
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FlowState {
    /// No flow in progress
    #[default]
    Idle,
    /// Collecting a new record
    Add(FieldStep),
    /// Waiting for `dd.mm.yyyy-dd.mm.yyyy`
    AwaitingRange,
    /// Waiting for the id to delete
    AwaitingDeleteId,
    /// Waiting for the id to edit
    AwaitingEditId,
    /// Collecting replacement fields for record `id`
    Edit { id: i64, step: FieldStep },
}

/// Name → date → amount collection shared by the add and edit flows.
/// Each variant carries everything accepted so far.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldStep {
    #[default]
    AwaitingName,
    AwaitingDate {
        name: String,
    },
    AwaitingAmount {
        name: String,
        date: String,
    },
}

/// Why a reply was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    EmptyName,
    InvalidDate,
    InvalidAmount,
    InvalidId,
    InvalidRange,
}

/// Result of feeding one reply into a `FieldStep`
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    Next(FieldStep),
    Complete(ExpensePayload),
}

impl FieldStep {
    /// Validate `input` for the current step. On error the step is unchanged
    /// so the caller can keep it and re-prompt.
    pub fn accept(&self, input: &str) -> Result<FieldOutcome, InputError> {
        match self {
            FieldStep::AwaitingName => {
                let name = validate_name(input).map_err(|_| InputError::EmptyName)?;
                Ok(FieldOutcome::Next(FieldStep::AwaitingDate { name }))
            }
            FieldStep::AwaitingDate { name } => {
                let date = input.trim();
                parse_date(date).map_err(|_| InputError::InvalidDate)?;
                Ok(FieldOutcome::Next(FieldStep::AwaitingAmount {
                    name: name.clone(),
                    date: date.to_string(),
                }))
            }
            FieldStep::AwaitingAmount { name, date } => {
                let amount = parse_amount(input).map_err(|_| InputError::InvalidAmount)?;
                Ok(FieldOutcome::Complete(ExpensePayload::new(name.clone(), date.clone(), amount)))
            }
        }
    }
}

/// A record id: ASCII digits only, fitting in `i64`
pub fn parse_id(input: &str) -> Result<i64, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::InvalidId);
    }
    trimmed.parse().map_err(|_| InputError::InvalidId)
}

/// Split `dd.mm.yyyy-dd.mm.yyyy` into its two validated halves
pub fn parse_range(input: &str) -> Result<(String, String), InputError> {
    let parts: Vec<&str> = input.split('-').map(str::trim).collect();
    let [start, end] = parts.as_slice() else {
        return Err(InputError::InvalidRange);
    };

    if parse_date(start).is_err() || parse_date(end).is_err() {
        return Err(InputError::InvalidRange);
    }

    Ok((start.to_string(), end.to_string()))
}

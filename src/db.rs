// Expense Tracker - Record Store
// SQLite persistence for expense records. Every mutation runs in its own
// transaction, which rolls back on drop if it is not committed.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::error::{StoreError, StoreResult};
use crate::record::{parse_date, ExpensePayload, ExpenseRecord, STORAGE_DATE_FORMAT};
use crate::report::ExpenseReport;

/// Owner of the persisted expense collection
pub struct ExpenseStore {
    conn: Connection,
}

impl ExpenseStore {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        setup_database(&conn)?;
        tracing::info!(path = %path.as_ref().display(), "expense database opened");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(Self { conn })
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    /// Validate and persist a new record; the id comes from SQLite
    pub fn add(&mut self, payload: &ExpensePayload) -> StoreResult<ExpenseRecord> {
        let expense = payload.validate()?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO expenses (name, date, amount) VALUES (?1, ?2, ?3)",
            params![
                expense.name,
                expense.date.format(STORAGE_DATE_FORMAT).to_string(),
                expense.amount,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::debug!(id, name = %expense.name, "expense added");

        Ok(ExpenseRecord {
            id,
            name: expense.name,
            date: expense.date,
            amount: expense.amount,
        })
    }

    /// Every record, oldest id first. An empty store yields an empty list.
    pub fn list_all(&self) -> StoreResult<Vec<ExpenseRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, date, amount FROM expenses ORDER BY id")?;

        let records = stmt
            .query_map([], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn get(&self, id: i64) -> StoreResult<ExpenseRecord> {
        self.conn
            .query_row(
                "SELECT id, name, date, amount FROM expenses WHERE id = ?1",
                [id],
                record_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::expense_not_found(id))
    }

    /// Records with `start <= date <= end`, ordered by date then id
    pub fn in_range(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<Vec<ExpenseRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, date, amount FROM expenses
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date, id",
        )?;

        let records = stmt
            .query_map(
                params![
                    start.format(STORAGE_DATE_FORMAT).to_string(),
                    end.format(STORAGE_DATE_FORMAT).to_string(),
                ],
                record_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Build the spreadsheet report for an inclusive date range
    pub fn report(&self, start_text: &str, end_text: &str) -> StoreResult<ExpenseReport> {
        let start = parse_date(start_text)?;
        let end = parse_date(end_text)?;

        let records = self.in_range(start, end)?;
        if records.is_empty() {
            return Err(StoreError::NotFound(format!(
                "No expenses found between {} and {}",
                start_text.trim(),
                end_text.trim()
            )));
        }

        Ok(ExpenseReport::new(records))
    }

    /// Remove a record permanently, returning a confirmation message
    pub fn delete(&mut self, id: i64) -> StoreResult<String> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM expenses WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(StoreError::expense_not_found(id));
        }
        tx.commit()?;

        tracing::debug!(id, "expense deleted");
        Ok(format!("Expense with ID {} deleted successfully", id))
    }

    /// Replace name, date and amount of an existing record
    pub fn edit(&mut self, id: i64, payload: &ExpensePayload) -> StoreResult<ExpenseRecord> {
        let tx = self.conn.transaction()?;

        let exists = tx
            .query_row("SELECT 1 FROM expenses WHERE id = ?1", [id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::expense_not_found(id));
        }

        let expense = payload.validate()?;
        tx.execute(
            "UPDATE expenses SET name = ?1, date = ?2, amount = ?3 WHERE id = ?4",
            params![
                expense.name,
                expense.date.format(STORAGE_DATE_FORMAT).to_string(),
                expense.amount,
                id,
            ],
        )?;
        tx.commit()?;

        tracing::debug!(id, "expense updated");

        Ok(ExpenseRecord {
            id,
            name: expense.name,
            date: expense.date,
            amount: expense.amount,
        })
    }

    pub fn count(&self) -> StoreResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Make every UPDATE and DELETE on `expenses` abort inside SQLite
    #[cfg(test)]
    pub(crate) fn fail_writes(&self) {
        self.conn
            .execute_batch(
                "CREATE TRIGGER fail_update BEFORE UPDATE ON expenses
                 BEGIN SELECT RAISE(ABORT, 'disk unavailable'); END;
                 CREATE TRIGGER fail_delete BEFORE DELETE ON expenses
                 BEGIN SELECT RAISE(ABORT, 'disk unavailable'); END;",
            )
            .unwrap();
    }
}

pub fn setup_database(conn: &Connection) -> StoreResult<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // AUTOINCREMENT keeps ids from being reused after a delete
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        [],
    )?;

    Ok(())
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ExpenseRecord> {
    let date_str: String = row.get(2)?;
    let date = NaiveDate::parse_from_str(&date_str, STORAGE_DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(ExpenseRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        date,
        amount: row.get(3)?,
    })
}

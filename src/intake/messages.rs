// Expense Tracker - Bot Texts

use crate::record::ExpenseRecord;

use super::flow::InputError;

pub const MENU: &str = "I track your expenses. Commands:\n\
/add_expense - add an expense\n\
/get_expenses - download a report for a date range\n\
/list_expenses - show all expenses\n\
/delete_expense - delete an expense by ID\n\
/edit_expense - edit an expense\n\
/cancel - abandon the current action";

pub const ASK_NAME: &str = "Enter the expense name:";
pub const ASK_DATE: &str = "Now enter the date (dd.mm.yyyy):";
pub const ASK_AMOUNT: &str = "Enter the amount:";
pub const ASK_RANGE: &str = "Enter the date range as dd.mm.yyyy-dd.mm.yyyy";
pub const ASK_DELETE_ID: &str = "Enter the ID of the expense to delete:";
pub const ASK_EDIT_ID: &str = "Enter the ID of the expense to edit:";
pub const ASK_NEW_NAME: &str = "Enter the new expense name:";
pub const ASK_NEW_DATE: &str = "Enter the new date (dd.mm.yyyy):";
pub const ASK_NEW_AMOUNT: &str = "Enter the new amount:";

pub const CANCELLED: &str = "Cancelled.";
pub const NOTHING_TO_CANCEL: &str = "Nothing to cancel.";
pub const UNKNOWN_INPUT: &str = "I didn't understand that. Send /help to see the commands.";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Send /help to see the commands.";
pub const NO_EXPENSES: &str = "No expenses recorded yet.";
pub const NOT_FOUND_ID: &str = "❌ No expense with that ID was found.";
pub const NOT_FOUND_RANGE: &str = "❌ No expenses found for that period.";

/// Telegram rejects longer `sendMessage` texts
pub const MAX_MESSAGE_CHARS: usize = 4096;

pub fn input_error(error: InputError) -> &'static str {
    match error {
        InputError::EmptyName => "❌ The expense name cannot be empty.",
        InputError::InvalidDate => "❌ Invalid date format. Use dd.mm.yyyy.",
        InputError::InvalidAmount => "❌ Enter a valid number for the amount.",
        InputError::InvalidId => "❌ Enter a valid numeric expense ID.",
        InputError::InvalidRange => "❌ Invalid format. Enter the range as dd.mm.yyyy-dd.mm.yyyy",
    }
}

pub fn added(record: &ExpenseRecord) -> String {
    format!("✅ Expense added (ID {}).", record.id)
}

pub fn updated(record: &ExpenseRecord) -> String {
    format!(
        "✅ Expense updated:\nID: {}\nName: {}\nDate: {}\nAmount: {}",
        record.id,
        record.name,
        record.date_text(),
        record.amount
    )
}

/// One line per record, packed into as few messages as the size limit allows
pub fn record_list(records: &[ExpenseRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec![NO_EXPENSES.to_string()];
    }

    let lines = records
        .iter()
        .map(|r| format!("#{} {} {}: {:.2}", r.id, r.date_text(), r.name, r.amount));
    pack_lines(lines, MAX_MESSAGE_CHARS)
}

/// Join lines with `\n` into chunks of at most `limit` chars. A single line
/// longer than `limit` is split across chunks.
fn pack_lines(lines: impl Iterator<Item = String>, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in lines {
        let line_len = line.chars().count();
        let needed = if current.is_empty() { line_len } else { line_len + 1 };

        if current_len + needed <= limit {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(&line);
            current_len += needed;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        let mut chars = line.chars().peekable();
        while chars.peek().is_some() {
            let piece: String = chars.by_ref().take(limit).collect();
            current_len = piece.chars().count();
            if current_len == limit {
                chunks.push(piece);
                current_len = 0;
            } else {
                current = piece;
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: i64, name: &str, amount: f64) -> ExpenseRecord {
        ExpenseRecord {
            id,
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount,
        }
    }

    #[test]
    fn test_long_list_is_split_under_limit() {
        let records: Vec<ExpenseRecord> = (1..=150)
            .map(|id| record(id, &format!("Monthly subscription number {}", id), 12.5))
            .collect();

        let chunks = record_list(&records);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_MESSAGE_CHARS));

        // Nothing lost or reordered across chunks
        let lines: Vec<&str> = chunks.iter().flat_map(|c| c.lines()).collect();
        assert_eq!(lines.len(), 150);
        assert!(lines[0].starts_with("#1 "));
        assert!(lines[149].starts_with("#150 "));
    }

    #[test]
    fn test_oversized_line_is_cut() {
        let chunks = pack_lines(vec!["a".repeat(7), "bb".to_string()].into_iter(), 5);
        assert_eq!(chunks, vec!["aaaaa", "aa\nbb"]);
    }

    #[test]
    fn test_updated_echoes_exact_amount() {
        let text = updated(&record(3, "Rent", 1234.5678));
        assert!(text.contains("Amount: 1234.5678"));
    }
}

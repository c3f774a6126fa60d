// Expense Tracker - Conversational Intake
// Per-chat state machines that collect and validate record fields before
// anything is sent to the store.

pub mod conversation;
pub mod flow;
pub mod messages;

pub use conversation::{Command, Conversation, Reply};
pub use flow::{FieldOutcome, FieldStep, FlowState, InputError};

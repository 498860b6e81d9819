//! Append-only message log over the `ChatLog` table.

use crate::core::{DbError, Result, Row, Value};
use crate::executor::{ExecutionContext, Invocation, Query, QueryContext, require_args};
use crate::ledger::Ledger;
use crate::storage::{CHAT_LOG_TABLE, StorageEngine};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub const SEND_MESSAGE: &str = "sendMessage";
pub const READ_MESSAGES: &str = "readMessages";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLog {
    pub sender: String,
    pub message: String,
}

impl ChatLog {
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message: message.into(),
        }
    }

    fn into_row(self) -> Row {
        vec![Value::String(self.sender), Value::String(self.message)]
    }

    fn from_row(row: Row) -> Result<Self> {
        let mut values = row.into_iter();
        match (values.next(), values.next()) {
            (Some(Value::String(sender)), Some(Value::String(message))) => Ok(Self { sender, message }),
            _ => Err(DbError::SchemaMismatch(format!(
                "{} rows must be (STRING, STRING)",
                CHAT_LOG_TABLE
            ))),
        }
    }
}

pub struct MessageLog;

impl MessageLog {
    /// Append one entry. Any insertion failure is reported as `SendFailed`.
    pub fn send<L: Ledger + ?Sized>(ledger: &mut L, entry: ChatLog) -> Result<()> {
        ledger.insert_row(CHAT_LOG_TABLE, entry.into_row()).map_err(|e| {
            error!("system error {}", e);
            DbError::SendFailed(Box::new(e))
        })
    }

    /// Every entry, in scan order.
    pub fn read_all<L: Ledger + ?Sized>(ledger: &L) -> Result<Vec<ChatLog>> {
        ledger
            .get_rows(CHAT_LOG_TABLE, &[])?
            .map(|row| row.and_then(ChatLog::from_row))
            .collect()
    }

    /// JSON array of `{"sender", "message"}` objects; `[]` when empty.
    pub fn encode(entries: &[ChatLog]) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(entries)?)
    }
}

/// `sendMessage(sender, message)`; extra arguments are ignored.
pub struct SendMessage;

impl Invocation for SendMessage {
    fn name(&self) -> &'static str {
        SEND_MESSAGE
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[String]) -> Result<Vec<u8>> {
        require_args(SEND_MESSAGE, args, 2)?;
        let entry = ChatLog::new(args[0].as_str(), args[1].as_str());
        debug!("tx {}: {} sends {} bytes", ctx.tx_id, entry.sender, entry.message.len());
        MessageLog::send(ctx.ledger, entry)?;
        Ok(Vec::new())
    }
}

/// `readMessages()`; arguments are ignored.
pub struct ReadMessages;

impl Query for ReadMessages {
    fn name(&self) -> &'static str {
        READ_MESSAGES
    }

    fn execute(&self, ctx: &QueryContext<'_>, _args: &[String]) -> Result<Vec<u8>> {
        let entries = MessageLog::read_all(ctx.ledger)?;
        debug!("tx {}: read {} messages", ctx.tx_id, entries.len());
        MessageLog::encode(&entries)
    }
}

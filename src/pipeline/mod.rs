//! Outbound buffer validation and the sent/received message log.

use crate::error::ClientError;
use log::debug;

mod json;
mod message_log;

pub use self::json::{
    format, pretty_received, validate, ParseError, ValidationResult, EMPTY_INPUT_MESSAGE,
    FORMATTED_MESSAGE, NOTHING_TO_FORMAT_MESSAGE, VALID_MESSAGE,
};
pub use self::message_log::{Direction, LogEntry, MessageLog};

/// Holds the outbound buffer, its validation and the message log
#[derive(Debug, Clone)]
pub struct MessagePipeline {
    buffer: String,
    validation: ValidationResult,
    log: MessageLog,
    /// Reject non-JSON payloads in `check_outbound`
    enforce_json: bool,
}

impl MessagePipeline {
    pub fn new(enforce_json: bool) -> Self {
        Self {
            buffer: String::new(),
            validation: validate(""),
            log: MessageLog::new(),
            enforce_json,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Replace the buffer and recompute its validation
    pub fn set_buffer(&mut self, text: impl Into<String>) -> &ValidationResult {
        self.buffer = text.into();
        self.validation = validate(&self.buffer);
        &self.validation
    }

    /// Blank the validation display until the buffer is checked again
    pub fn clear_validation(&mut self) -> &ValidationResult {
        self.validation = ValidationResult::invalid("");
        &self.validation
    }

    /// Recompute validation from the current buffer
    pub fn revalidate(&mut self) -> &ValidationResult {
        self.validation = validate(&self.buffer);
        &self.validation
    }

    /// Pretty-print the buffer in place. On failure the buffer is untouched.
    pub fn format_buffer(&mut self) -> Result<&ValidationResult, ParseError> {
        let formatted = format(&self.buffer)?;
        self.buffer = formatted;
        self.validation = ValidationResult::valid(FORMATTED_MESSAGE);
        Ok(&self.validation)
    }

    /// Check that `text` may be handed to the transport
    pub fn check_outbound(&self, text: &str) -> Result<(), ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        if self.enforce_json {
            let result = validate(text);
            if !result.valid {
                return Err(ClientError::Parse(result.message));
            }
        }
        Ok(())
    }

    /// Log a payload that was handed to the transport
    pub fn record_sent(&mut self, text: &str) -> &LogEntry {
        self.log.append(Direction::Sent, text)
    }

    /// Log an inbound payload, pretty-printing it when it is JSON
    pub fn on_receive(&mut self, raw: &str) -> &LogEntry {
        debug!("Received {} bytes", raw.len());
        self.log.append(Direction::Received, pretty_received(raw))
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl Default for MessagePipeline {
    fn default() -> Self {
        Self::new(false)
    }
}

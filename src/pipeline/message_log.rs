use chrono::{DateTime, Local};
use std::fmt;

/// Which way a logged payload travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => write!(f, "Sent"),
            Direction::Received => write!(f, "Received"),
        }
    }
}

/// One line of the message log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub direction: Direction,
    pub payload: String,
}

impl LogEntry {
    pub fn new(direction: Direction, payload: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            direction,
            payload: payload.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format("%H:%M:%S"),
            self.direction,
            self.payload
        )
    }
}

/// Ordered record of sent and received payloads
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with the current time
    pub fn append(&mut self, direction: Direction, payload: impl Into<String>) -> &LogEntry {
        self.entries.push(LogEntry::new(direction, payload));
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The whole log as display text, entries separated by a blank line
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}\n\n", entry))
            .collect()
    }
}

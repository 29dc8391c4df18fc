//! Log sinks receiving stage output
//!
//! A sink is append-only: the executor writes leveled lines and never reads
//! them back. Process output and executor status messages share one sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Destination for stage log lines
pub trait LogSink: Send + Sync {
    fn write(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }
}

/// One recorded log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.message.clone()).collect()
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Whether any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|e| e.message.contains(needle))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        // A panicking writer cannot leave a Vec half-pushed
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LogSink for MemoryLogSink {
    fn write(&self, level: LogLevel, message: &str) {
        self.lock().push(LogEntry {
            level,
            message: message.to_string(),
            timestamp: Utc::now(),
        });
    }
}

// crates/billing-e2e-store/src/audit.rs
// ============================================================================
// Module: Store Audit Logging
// Description: Structured events for shared store mutations and warnings.
// Purpose: Emit JSON-lines events without a hard logging dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Store events are serialized as one JSON object per line. The default sink
//! writes to stderr so malformed entries surface in test output; a file sink
//! keeps a session log alongside the run artifacts. Events never carry store
//! values, which may hold credentials.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::document::MalformedEntry;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Severity attached to a store event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditLevel {
    /// Routine mutation.
    Info,
    /// Operator attention required (for example, file corruption).
    Warn,
}

/// Shared store event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event severity.
    pub level: AuditLevel,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Backing file path.
    pub path: String,
    /// Key involved in the event, when any.
    pub key: Option<String>,
    /// One-based line number in the backing file, when any.
    pub line_number: Option<usize>,
    /// Human-readable detail.
    pub detail: Option<String>,
}

impl StoreAuditEvent {
    fn base(event: &'static str, level: AuditLevel, path: &Path) -> Self {
        Self {
            event,
            level,
            timestamp_ms: now_millis(),
            path: path.display().to_string(),
            key: None,
            line_number: None,
            detail: None,
        }
    }

    /// Builds the warning emitted for a line that is not `KEY=VALUE`.
    #[must_use]
    pub fn malformed_entry(path: &Path, entry: &MalformedEntry) -> Self {
        Self {
            line_number: Some(entry.line_number),
            detail: Some(format!("skipped malformed line: {}", entry.reason)),
            ..Self::base("malformed_entry", AuditLevel::Warn, path)
        }
    }

    /// Builds the event emitted when a key is written.
    #[must_use]
    pub fn entry_set(path: &Path, key: &str, replaced: bool) -> Self {
        let detail = if replaced { "updated in place" } else { "appended" };
        Self {
            key: Some(key.to_string()),
            detail: Some(detail.to_string()),
            ..Self::base("entry_set", AuditLevel::Info, path)
        }
    }

    /// Builds the event emitted when a key is removed.
    #[must_use]
    pub fn entry_unset(path: &Path, key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            ..Self::base("entry_unset", AuditLevel::Info, path)
        }
    }

    /// Builds the event emitted when the backing file is first created.
    #[must_use]
    pub fn store_created(path: &Path) -> Self {
        Self::base("store_created", AuditLevel::Info, path)
    }

    /// Builds the event emitted after a bulk reset.
    #[must_use]
    pub fn store_reset(path: &Path, removed: usize) -> Self {
        Self {
            detail: Some(format!("removed {removed} keys")),
            ..Self::base("store_reset", AuditLevel::Info, path)
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink for store events.
pub trait StoreAuditSink: Send + Sync {
    /// Records a store event.
    fn record(&self, event: &StoreAuditEvent);
}

/// Writes events to stderr as JSON lines.
pub struct StderrAuditSink;

impl StoreAuditSink for StderrAuditSink {
    fn record(&self, event: &StoreAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Appends events to a file as JSON lines.
pub struct FileAuditSink {
    /// Open log file guarded for concurrent writers.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens (or creates) the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl StoreAuditSink for FileAuditSink {
    fn record(&self, event: &StoreAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
        }
    }
}

/// Discards every event.
pub struct NoopAuditSink;

impl StoreAuditSink for NoopAuditSink {
    fn record(&self, _event: &StoreAuditEvent) {}
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// crates/billing-e2e-store/src/store.rs
// ============================================================================
// Module: Shared Test-State Store
// Description: Durable `KEY=VALUE` store shared across test processes.
// Purpose: Persist created-entity identifiers for downstream tests.
// Dependencies: thiserror, serde_json (via audit sinks)
// ============================================================================

//! ## Overview
//! [`SharedStore`] wraps the environment file used to pass identifiers from
//! producer tests to consumer tests. Every write is a read-modify-write of the
//! whole file: the existing document is parsed, the key is replaced in place
//! (or appended), and the result is written to a sibling temporary file and
//! renamed over the original.
//!
//! Writers in one process are serialized by an internal mutex. Writers in
//! separate processes are not coordinated; two processes writing different
//! keys at the same instant can lose one write. The ordered runner executes
//! one test process at a time for this reason.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use thiserror::Error;

use crate::audit::StderrAuditSink;
use crate::audit::StoreAuditEvent;
use crate::audit::StoreAuditSink;
use crate::document::StoreDocument;
use crate::document::key_violation;
use crate::document::value_violation;
use crate::snapshot::KeySpec;
use crate::snapshot::StoreSnapshot;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Attempts made to allocate a unique temporary file beside the store.
const TEMP_ATTEMPTS: usize = 16;
/// Counter distinguishing temporary files created by one process.
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Shared store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file could not be read or written.
    #[error("shared store io error at {}: {message}", .path.display())]
    Io {
        /// Backing file path.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// Store is not usable as configured (for example, a required file is missing).
    #[error("shared store configuration error: {0}")]
    Configuration(String),
    /// A required key is absent.
    #[error(
        "required key `{key}` is absent from {}{}",
        .path.display(),
        producer_hint(.producer.as_deref())
    )]
    MissingKey {
        /// Missing key.
        key: String,
        /// Backing file path.
        path: PathBuf,
        /// Test expected to have written the key.
        producer: Option<String>,
    },
    /// Key cannot be written to the file format.
    #[error("invalid store key {key:?}: {reason}")]
    InvalidKey {
        /// Offending key.
        key: String,
        /// Validation failure.
        reason: String,
    },
    /// Value cannot be written or parsed as the requested type.
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue {
        /// Key holding the value.
        key: String,
        /// Validation failure.
        reason: String,
    },
    /// A previous writer panicked while holding the store lock.
    #[error("shared store lock poisoned")]
    Poisoned,
}

fn producer_hint(producer: Option<&str>) -> String {
    producer.map_or_else(String::new, |name| format!(" (expected to be set by `{name}`)"))
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// File-backed key/value store shared between test processes.
pub struct SharedStore {
    /// Backing file path.
    path: PathBuf,
    /// Serializes read-modify-write cycles within the process.
    lock: Mutex<()>,
    /// Destination for store events.
    audit: Arc<dyn StoreAuditSink>,
}

impl std::fmt::Debug for SharedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStore").field("path", &self.path).finish_non_exhaustive()
    }
}

impl SharedStore {
    /// Opens a store at `path`. The file is not touched until first use.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            audit: Arc::new(StderrAuditSink),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn StoreAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` when the backing file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the store; a missing file yields an empty snapshot.
    ///
    /// Malformed lines are skipped and reported through the audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file exists but cannot be read.
    pub fn load(&self) -> Result<StoreSnapshot, StoreError> {
        let _guard = self.guard()?;
        let document = self.read_document()?.unwrap_or_default();
        Ok(self.snapshot_of(&document))
    }

    /// Loads the store, failing when the backing file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] when the file is missing and
    /// [`StoreError::Io`] when it cannot be read.
    pub fn load_required(&self) -> Result<StoreSnapshot, StoreError> {
        let _guard = self.guard()?;
        let document = self.read_document()?.ok_or_else(|| {
            StoreError::Configuration(format!(
                "shared store {} does not exist",
                self.path.display()
            ))
        })?;
        Ok(self.snapshot_of(&document))
    }

    /// Looks up a key, distinguishing absence from an empty value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file cannot be read.
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.get(key).map(ToString::to_string))
    }

    /// Looks up a key that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingKey`] naming the key and its producer when
    /// absent, or [`StoreError::Io`] when the file cannot be read.
    pub fn require<K: KeySpec + ?Sized>(&self, key: &K) -> Result<String, StoreError> {
        self.load()?.require_str(key).map(ToString::to_string)
    }

    /// Inserts or replaces `key`. A missing file (and its parent directory) is created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] or [`StoreError::InvalidValue`] when
    /// the pair cannot be represented in the file, and [`StoreError::Io`] when
    /// the file cannot be read or written.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(reason) = key_violation(key) {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
                reason: reason.to_string(),
            });
        }
        if let Some(reason) = value_violation(value) {
            return Err(StoreError::InvalidValue {
                key: key.to_string(),
                reason: reason.to_string(),
            });
        }
        let _guard = self.guard()?;
        let existing = self.read_document()?;
        let created = existing.is_none();
        let mut document = existing.unwrap_or_default();
        let replaced = document.upsert(key, value);
        self.write_document(&document)?;
        if created {
            self.audit.record(&StoreAuditEvent::store_created(&self.path));
        }
        self.audit.record(&StoreAuditEvent::entry_set(&self.path, key, replaced));
        Ok(())
    }

    /// Removes `key`; returns `false` (and leaves the file untouched) when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file cannot be read or written.
    pub fn unset(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.guard()?;
        let Some(mut document) = self.read_document()? else {
            return Ok(false);
        };
        if !document.remove(key) {
            return Ok(false);
        }
        self.write_document(&document)?;
        self.audit.record(&StoreAuditEvent::entry_unset(&self.path, key));
        Ok(true)
    }

    /// Removes every listed key in one rewrite, returning how many were present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file cannot be read or written.
    pub fn unset_all<I, S>(&self, keys: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let _guard = self.guard()?;
        let Some(mut document) = self.read_document()? else {
            return Ok(0);
        };
        let removed = keys.into_iter().filter(|key| document.remove(key.as_ref())).count();
        if removed > 0 {
            self.write_document(&document)?;
        }
        self.audit.record(&StoreAuditEvent::store_reset(&self.path, removed));
        Ok(removed)
    }

    // ------------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------------

    fn guard(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.lock.lock().map_err(|_| StoreError::Poisoned)
    }

    fn io_error(&self, err: &std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }

    /// Reads and parses the backing file; `None` when it does not exist.
    fn read_document(&self) -> Result<Option<StoreDocument>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(&err)),
        };
        let (document, malformed) = StoreDocument::parse(&contents);
        for entry in &malformed {
            self.audit.record(&StoreAuditEvent::malformed_entry(&self.path, entry));
        }
        Ok(Some(document))
    }

    fn snapshot_of(&self, document: &StoreDocument) -> StoreSnapshot {
        let entries: BTreeMap<String, String> = document
            .entries()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect();
        StoreSnapshot::new(self.path.clone(), entries)
    }

    /// Writes the document to a sibling temporary file and renames it into place.
    fn write_document(&self, document: &StoreDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| self.io_error(&err))?;
        }
        let (temp_path, mut file) = self.create_temp_file()?;
        let written = file
            .write_all(document.render().as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|err| self.io_error(&err));
        drop(file);
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }
        self.persist_temp_file(&temp_path)
    }

    fn create_temp_file(&self) -> Result<(PathBuf, fs::File), StoreError> {
        let parent = self.path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                StoreError::Configuration(format!(
                    "shared store path {} does not name a file",
                    self.path.display()
                ))
            })?;
        for _ in 0 .. TEMP_ATTEMPTS {
            let attempt = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
            let temp_path =
                parent.join(format!(".{file_name}.tmp.{}.{attempt}", std::process::id()));
            match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
                Ok(file) => return Ok((temp_path, file)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
                Err(err) => return Err(self.io_error(&err)),
            }
        }
        Err(StoreError::Io {
            path: self.path.clone(),
            message: "failed to allocate temporary store file".to_string(),
        })
    }

    fn persist_temp_file(&self, temp_path: &Path) -> Result<(), StoreError> {
        match fs::rename(temp_path, &self.path) {
            Ok(()) => Ok(()),
            Err(err) => {
                if self.path.exists() {
                    fs::remove_file(&self.path).map_err(|err| self.io_error(&err))?;
                    fs::rename(temp_path, &self.path).map_err(|err| self.io_error(&err))?;
                    return Ok(());
                }
                let _ = fs::remove_file(temp_path);
                Err(self.io_error(&err))
            }
        }
    }
}

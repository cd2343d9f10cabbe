// crates/billing-e2e-store/src/snapshot.rs
// ============================================================================
// Module: Store Snapshot
// Description: In-memory view of the store with typed accessors.
// Purpose: Validate raw string values once at the boundary.
// Dependencies: url
// ============================================================================

//! ## Overview
//! A [`StoreSnapshot`] is the mapping produced by
//! [`SharedStore::load`](crate::SharedStore::load). Raw lookups return
//! `Option<&str>` so absence and the empty string stay distinct. The
//! `require_*` accessors turn absence into [`StoreError::MissingKey`] and
//! parse the value into the type the caller needs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use url::Url;

use crate::store::StoreError;

// ============================================================================
// SECTION: Key Specs
// ============================================================================

/// A key name plus an optional hint naming the test that produces it.
pub trait KeySpec {
    /// Returns the key as written in the backing file.
    fn name(&self) -> &str;

    /// Returns the test expected to have written this key, if known.
    fn producer(&self) -> Option<&str> {
        None
    }
}

impl KeySpec for str {
    fn name(&self) -> &str {
        self
    }
}

impl KeySpec for String {
    fn name(&self) -> &str {
        self
    }
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Mapping loaded from the backing file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Backing file the snapshot was read from.
    path: PathBuf,
    /// Key/value pairs.
    entries: BTreeMap<String, String>,
}

impl StoreSnapshot {
    pub(crate) fn new(path: PathBuf, entries: BTreeMap<String, String>) -> Self {
        Self {
            path,
            entries,
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns `true` when the key is present (even with an empty value).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Consumes the snapshot, returning the raw mapping.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.entries
    }

    /// Returns a required value as a string slice.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingKey`] when the key is absent.
    pub fn require_str<K: KeySpec + ?Sized>(&self, key: &K) -> Result<&str, StoreError> {
        self.get(key.name()).ok_or_else(|| StoreError::MissingKey {
            key: key.name().to_string(),
            path: self.path.clone(),
            producer: key.producer().map(ToString::to_string),
        })
    }

    /// Returns a required value that must be non-empty after trimming.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingKey`] when absent and
    /// [`StoreError::InvalidValue`] when blank.
    pub fn require_nonempty<K: KeySpec + ?Sized>(&self, key: &K) -> Result<&str, StoreError> {
        let value = self.require_str(key)?;
        if value.trim().is_empty() {
            return Err(invalid(key, "value must not be empty"));
        }
        Ok(value)
    }

    /// Returns a required numeric entity identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingKey`] when absent and
    /// [`StoreError::InvalidValue`] when the value is not an unsigned integer.
    pub fn require_id<K: KeySpec + ?Sized>(&self, key: &K) -> Result<u64, StoreError> {
        let value = self.require_str(key)?;
        value.trim().parse::<u64>().map_err(|_| invalid(key, "value must be an unsigned integer"))
    }

    /// Returns a required absolute `http`/`https` URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingKey`] when absent and
    /// [`StoreError::InvalidValue`] when the value is not an HTTP(S) URL.
    pub fn require_url<K: KeySpec + ?Sized>(&self, key: &K) -> Result<Url, StoreError> {
        let value = self.require_str(key)?;
        let url = Url::parse(value.trim()).map_err(|err| invalid(key, &err.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(invalid(key, "url scheme must be http or https")),
        }
    }
}

fn invalid<K: KeySpec + ?Sized>(key: &K, reason: &str) -> StoreError {
    StoreError::InvalidValue {
        key: key.name().to_string(),
        reason: reason.to_string(),
    }
}

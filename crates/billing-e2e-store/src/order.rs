// crates/billing-e2e-store/src/order.rs
// ============================================================================
// Module: Execution Order Plan
// Description: Deterministic reordering of discovered tests by name patterns.
// Purpose: Run producer tests before the consumers that read their output.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! An [`OrderPlan`] is an ordered list of plain substrings. Reordering walks
//! the patterns in sequence and, for each one, takes every not-yet-taken test
//! whose identifier contains the pattern, in discovery order. Tests matching
//! no pattern are appended afterwards in discovery order, so the output is
//! always a permutation of the input.
//!
//! Plans are validated when constructed. Empty or duplicate patterns, and
//! plan files whose entries are not strings, are rejected before any test
//! runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Invalid execution order plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderingConfigError {
    /// A pattern is empty or whitespace-only.
    #[error("order plan pattern #{index} is empty")]
    EmptyPattern {
        /// Zero-based pattern position.
        index: usize,
    },
    /// A pattern appears more than once.
    #[error("order plan pattern {pattern:?} is listed more than once")]
    DuplicatePattern {
        /// Repeated pattern.
        pattern: String,
    },
    /// Plan file is not valid TOML or has non-string patterns.
    #[error("order plan is invalid: {0}")]
    Parse(String),
    /// Plan file could not be read.
    #[error("order plan {path} could not be read: {message}")]
    Io {
        /// Plan file path.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

// ============================================================================
// SECTION: Plan File
// ============================================================================

/// On-disk plan layout: `patterns = ["auth::test_auth", ...]`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanFile {
    /// Ordered substring patterns.
    patterns: Vec<String>,
}

// ============================================================================
// SECTION: Plan
// ============================================================================

/// Validated ordered pattern list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    /// Ordered substring patterns.
    patterns: Vec<String>,
}

/// Result of arranging a discovered list against a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrangement {
    /// Indices into the discovered list, in execution order.
    pub order: Vec<usize>,
    /// Number of leading entries in `order` that matched a pattern.
    pub matched_len: usize,
    /// Patterns that matched nothing.
    pub unused_patterns: Vec<String>,
}

impl Arrangement {
    /// Indices of tests that matched no pattern, in discovery order.
    #[must_use]
    pub fn unmatched(&self) -> &[usize] {
        &self.order[self.matched_len ..]
    }

    /// Applies the arrangement to the discovered list.
    #[must_use]
    pub fn apply<T: Clone>(&self, discovered: &[T]) -> Vec<T> {
        self.order.iter().filter_map(|index| discovered.get(*index).cloned()).collect()
    }
}

impl OrderPlan {
    /// Builds a plan from patterns.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingConfigError`] when a pattern is blank or repeated.
    pub fn new<I, S>(patterns: I) -> Result<Self, OrderingConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut seen = BTreeSet::new();
        for (index, pattern) in patterns.iter().enumerate() {
            if pattern.trim().is_empty() {
                return Err(OrderingConfigError::EmptyPattern {
                    index,
                });
            }
            if !seen.insert(pattern.as_str()) {
                return Err(OrderingConfigError::DuplicatePattern {
                    pattern: pattern.clone(),
                });
            }
        }
        Ok(Self {
            patterns,
        })
    }

    /// Parses a TOML plan document.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingConfigError::Parse`] for invalid TOML or non-string
    /// patterns, and the [`OrderPlan::new`] errors for invalid patterns.
    pub fn from_toml_str(raw: &str) -> Result<Self, OrderingConfigError> {
        let file: PlanFile =
            toml::from_str(raw).map_err(|err| OrderingConfigError::Parse(err.to_string()))?;
        Self::new(file.patterns)
    }

    /// Reads and parses a TOML plan file.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingConfigError::Io`] when unreadable, otherwise the
    /// [`OrderPlan::from_toml_str`] errors.
    pub fn from_file(path: &Path) -> Result<Self, OrderingConfigError> {
        let raw = fs::read_to_string(path).map_err(|err| OrderingConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Returns the patterns in order.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Computes the execution order for `discovered`.
    #[must_use]
    pub fn arrange<T: AsRef<str>>(&self, discovered: &[T]) -> Arrangement {
        let mut taken = vec![false; discovered.len()];
        let mut order = Vec::with_capacity(discovered.len());
        let mut unused_patterns = Vec::new();
        for pattern in &self.patterns {
            let before = order.len();
            for (index, test) in discovered.iter().enumerate() {
                if !taken[index] && test.as_ref().contains(pattern.as_str()) {
                    taken[index] = true;
                    order.push(index);
                }
            }
            if order.len() == before {
                unused_patterns.push(pattern.clone());
            }
        }
        let matched_len = order.len();
        order.extend(taken.iter().enumerate().filter(|(_, taken)| !**taken).map(|(index, _)| index));
        Arrangement {
            order,
            matched_len,
            unused_patterns,
        }
    }

    /// Returns `discovered` reordered by the plan, unmatched tests last.
    #[must_use]
    pub fn reorder<T: AsRef<str> + Clone>(&self, discovered: &[T]) -> Vec<T> {
        self.arrange(discovered).apply(discovered)
    }
}

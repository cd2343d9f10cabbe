// crates/billing-e2e-store/src/document.rs
// ============================================================================
// Module: Store Document
// Description: Line-preserving model of the `KEY=VALUE` backing file.
// Purpose: Parse, edit, and render the store without disturbing other lines.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The backing file is kept as a sequence of lines. Entry lines are parsed
//! into [`ConfigEntry`] values; blank lines, `#` comments, and malformed
//! lines are carried verbatim so a rewrite never loses operator content.
//! Entries split on the first `=` only, so values may themselves contain `=`.

// ============================================================================
// SECTION: Types
// ============================================================================

/// UTF-8 byte order mark some editors prepend to the file.
const BYTE_ORDER_MARK: char = '\u{feff}';

/// One key/value pair persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Stable key (for example `API_URL`).
    pub key: String,
    /// Opaque value.
    pub value: String,
}

/// A line that does not conform to `KEY=VALUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEntry {
    /// One-based line number in the backing file.
    pub line_number: usize,
    /// Reason the line was rejected.
    pub reason: &'static str,
}

/// A single physical line of the backing file.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StoreLine {
    /// Parsed `KEY=VALUE` entry.
    Entry(ConfigEntry),
    /// Blank, comment, or malformed line kept as-is.
    Verbatim(String),
}

/// Parsed backing file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreDocument {
    /// Lines in file order.
    lines: Vec<StoreLine>,
}

// ============================================================================
// SECTION: Key Validation
// ============================================================================

/// Returns why `key` cannot be used as a store key, if it cannot.
#[must_use]
pub fn key_violation(key: &str) -> Option<&'static str> {
    if key.is_empty() {
        return Some("key must not be empty");
    }
    if key.contains('=') {
        return Some("key must not contain '='");
    }
    if key.chars().any(char::is_whitespace) {
        return Some("key must not contain whitespace");
    }
    if key.starts_with('#') {
        return Some("key must not start with '#'");
    }
    None
}

/// Returns why `value` cannot be stored, if it cannot.
#[must_use]
pub fn value_violation(value: &str) -> Option<&'static str> {
    if value.contains('\n') || value.contains('\r') {
        return Some("value must not contain line breaks");
    }
    None
}

// ============================================================================
// SECTION: Document
// ============================================================================

impl StoreDocument {
    /// Parses file contents, returning the document and any malformed lines.
    ///
    /// A leading UTF-8 byte order mark is dropped and not written back.
    #[must_use]
    pub fn parse(contents: &str) -> (Self, Vec<MalformedEntry>) {
        let contents = contents.strip_prefix(BYTE_ORDER_MARK).unwrap_or(contents);
        let mut lines = Vec::new();
        let mut malformed = Vec::new();
        for (index, raw) in contents.lines().enumerate() {
            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                lines.push(StoreLine::Verbatim(raw.to_string()));
                continue;
            }
            match raw.split_once('=') {
                Some((key, value)) if key_violation(key).is_none() => {
                    lines.push(StoreLine::Entry(ConfigEntry {
                        key: key.to_string(),
                        value: value.to_string(),
                    }));
                }
                split => {
                    let reason = split
                        .and_then(|(key, _)| key_violation(key))
                        .unwrap_or("missing '=' separator");
                    malformed.push(MalformedEntry {
                        line_number: index + 1,
                        reason,
                    });
                    lines.push(StoreLine::Verbatim(raw.to_string()));
                }
            }
        }
        (
            Self {
                lines,
            },
            malformed,
        )
    }

    /// Renders the document; non-empty output always ends with a newline.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                StoreLine::Entry(entry) => {
                    out.push_str(&entry.key);
                    out.push('=');
                    out.push_str(&entry.value);
                }
                StoreLine::Verbatim(raw) => out.push_str(raw),
            }
            out.push('\n');
        }
        out
    }

    /// Iterates parsed entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.lines.iter().filter_map(|line| match line {
            StoreLine::Entry(entry) => Some(entry),
            StoreLine::Verbatim(_) => None,
        })
    }

    /// Looks up a key; when a hand-edited file repeats a key the last one wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries().filter(|entry| entry.key == key).last().map(|entry| entry.value.as_str())
    }

    /// Inserts or replaces `key`, returning `true` when an existing line was replaced.
    ///
    /// The first line for `key` is rewritten in place and any later duplicates
    /// are dropped so the key ends up on exactly one line.
    pub fn upsert(&mut self, key: &str, value: &str) -> bool {
        let first = self
            .lines
            .iter()
            .position(|line| matches!(line, StoreLine::Entry(entry) if entry.key == key));
        let Some(first) = first else {
            self.lines.push(StoreLine::Entry(ConfigEntry {
                key: key.to_string(),
                value: value.to_string(),
            }));
            return false;
        };
        self.lines[first] = StoreLine::Entry(ConfigEntry {
            key: key.to_string(),
            value: value.to_string(),
        });
        let mut index = 0usize;
        self.lines.retain(|line| {
            let keep = index <= first
                || !matches!(line, StoreLine::Entry(entry) if entry.key == key);
            index += 1;
            keep
        });
        true
    }

    /// Removes every line for `key`, returning `true` when anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| !matches!(line, StoreLine::Entry(entry) if entry.key == key));
        self.lines.len() != before
    }

    /// Returns the number of physical lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Per-test artifact directories and run summaries.
// Purpose: Leave a summary and every written artifact under the session root.
// Dependencies: system-tests, serde, serde_jcs
// ============================================================================

//! ## Overview
//! Each test writes into `<session run root>/<test name>`, where the session
//! root is the one the ordered runner forwards (or a fresh default when a
//! test binary is run directly). The artifact manager remembers every file it
//! writes, so the summary lists exactly what a run left behind.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use system_tests::config::SuiteConfig;

const SUMMARY_JSON: &str = "summary.json";
const SUMMARY_MD: &str = "summary.md";

/// Final state recorded for a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    /// Scenario succeeded.
    Pass,
    /// Scenario returned an error.
    Fail,
    /// No backend was configured.
    Skip,
    /// Test panicked before finishing.
    Panic,
    /// Reporter dropped without a result.
    Unknown,
}

impl SummaryStatus {
    const fn label(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Panic => "panic",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    test_name: &'a str,
    status: SummaryStatus,
    started_at_ms: u128,
    ended_at_ms: u128,
    duration_ms: u128,
    notes: &'a [String],
    artifacts: Vec<String>,
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Maps a qualified test name (`users::test_user_get`) to a directory name.
fn artifact_dir_name(test_name: &str) -> String {
    test_name.replace("::", "__")
}

/// Files written for one test.
#[derive(Debug)]
pub struct TestArtifacts {
    root: PathBuf,
    written: Mutex<BTreeSet<String>>,
}

impl TestArtifacts {
    /// Creates the artifact directory for `test_name` under the session root.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = SuiteConfig::load().map_err(io::Error::other)?;
        Self::at(config.session_run_root(now_millis()).join(artifact_dir_name(test_name)))
    }

    /// Creates an artifact directory at an explicit path.
    pub fn at(root: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            written: Mutex::new(BTreeSet::new()),
        })
    }

    /// Returns the artifact directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the names written so far, sorted.
    pub fn written(&self) -> Vec<String> {
        self.written.lock().map_or_else(|_| Vec::new(), |names| names.iter().cloned().collect())
    }

    /// Writes `value` as canonical (JCS) JSON.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        self.write_bytes(name, &bytes)
    }

    /// Writes a UTF-8 text artifact.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        self.write_bytes(name, value.as_bytes())
    }

    fn write_bytes(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, bytes)?;
        if let Ok(mut names) = self.written.lock() {
            names.insert(name.to_string());
        }
        Ok(path)
    }
}

/// Writes a summary for one test, including when the test panics.
pub struct TestReporter {
    artifacts: TestArtifacts,
    test_name: String,
    started_at_ms: u128,
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter for the named test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        Ok(Self::with_artifacts(test_name, TestArtifacts::new(test_name)?))
    }

    /// Creates a reporter writing into existing artifacts.
    pub fn with_artifacts(test_name: &str, artifacts: TestArtifacts) -> Self {
        Self {
            artifacts,
            test_name: test_name.to_string(),
            started_at_ms: now_millis(),
            finalized: false,
        }
    }

    /// Returns the artifact manager.
    pub fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Writes `summary.json` and `summary.md`.
    ///
    /// The artifact list is every file written before this call plus the two
    /// summaries themselves.
    pub fn finish(&mut self, status: SummaryStatus, notes: &[String]) -> io::Result<()> {
        let mut artifacts: BTreeSet<String> = self.artifacts.written().into_iter().collect();
        artifacts.insert(SUMMARY_JSON.to_string());
        artifacts.insert(SUMMARY_MD.to_string());

        let ended_at_ms = now_millis();
        let summary = RunSummary {
            test_name: &self.test_name,
            status,
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            notes,
            artifacts: artifacts.into_iter().collect(),
        };
        self.artifacts.write_json(SUMMARY_JSON, &summary)?;
        self.artifacts.write_text(SUMMARY_MD, &render_markdown(&summary))?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status =
            if std::thread::panicking() { SummaryStatus::Panic } else { SummaryStatus::Unknown };
        let _ = self.finish(status, &["test ended before writing a summary".to_string()]);
    }
}

fn render_markdown(summary: &RunSummary<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# `{}`: {}\n", summary.test_name, summary.status.label());
    let _ = writeln!(out, "Finished in {} ms.\n", summary.duration_ms);
    if !summary.notes.is_empty() {
        out.push_str("## Notes\n\n");
        for note in summary.notes {
            let _ = writeln!(out, "> {note}");
        }
        out.push('\n');
    }
    out.push_str("## Files\n\n");
    for name in &summary.artifacts {
        let _ = writeln!(out, "- [{name}]({name})");
    }
    out
}

// system-tests/src/runner.rs
// ============================================================================
// Module: Ordered Test Runner
// Description: Discovers suite tests and runs them one process at a time.
// Purpose: Apply the execution order plan to a libtest binary.
// Dependencies: billing-e2e-store, serde, thiserror
// ============================================================================

//! ## Overview
//! Discovery uses the libtest `--list --format terse` output. Each test then
//! runs as its own process (`--exact <name> --test-threads=1`) so the shared
//! store is the only state that crosses test boundaries. Tests run strictly
//! one after another; the store is not safe for concurrent writers in
//! separate processes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use billing_e2e_store::OrderingConfigError;
use billing_e2e_store::StoreError;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Runner failures that prevent tests from being scheduled.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Test binary could not be started.
    #[error("failed to launch {binary}: {message}")]
    Launch {
        /// Test binary path.
        binary: String,
        /// Underlying error message.
        message: String,
    },
    /// Test binary refused to list its tests.
    #[error("listing tests in {binary} failed: {stderr}")]
    Listing {
        /// Test binary path.
        binary: String,
        /// Captured stderr.
        stderr: String,
    },
    /// Order plan is invalid.
    #[error(transparent)]
    Ordering(#[from] OrderingConfigError),
    /// Ordered list breaks a scenario dependency.
    #[error("ordered tests violate scenario dependencies:\n{0}")]
    Dependencies(String),
    /// Shared store could not be prepared.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Suite configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
    /// Run report could not be written.
    #[error("failed to write run report: {0}")]
    Report(String),
}

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Extracts test names from libtest `--list --format terse` output.
#[must_use]
pub fn parse_test_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.trim_end().strip_suffix(": test"))
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Lists the tests compiled into `binary`, in discovery order.
///
/// # Errors
///
/// Returns [`RunnerError::Launch`] when the binary cannot be started and
/// [`RunnerError::Listing`] when it exits unsuccessfully.
pub fn discover_tests(binary: &Path) -> Result<Vec<String>, RunnerError> {
    let output = Command::new(binary)
        .args(["--list", "--format", "terse"])
        .output()
        .map_err(|err| RunnerError::Launch {
            binary: binary.display().to_string(),
            message: err.to_string(),
        })?;
    if !output.status.success() {
        return Err(RunnerError::Listing {
            binary: binary.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }
    Ok(parse_test_list(&String::from_utf8_lossy(&output.stdout)))
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Final state of one scheduled test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Test process exited successfully.
    Passed,
    /// Test process failed or could not be started.
    Failed,
    /// Test was skipped after an earlier failure with fail-fast enabled.
    NotRun,
}

/// Outcome of one scheduled test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestOutcome {
    /// Fully qualified test name.
    pub name: String,
    /// Final status.
    pub status: TestStatus,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u128,
    /// Tail of the captured output for failed tests.
    pub output_tail: Option<String>,
}

/// Outcomes for an ordered run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Outcomes in execution order.
    pub outcomes: Vec<TestOutcome>,
}

impl RunReport {
    /// Counts outcomes with the given status.
    #[must_use]
    pub fn count(&self, status: TestStatus) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.status == status).count()
    }

    /// Returns `true` when every scheduled test passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.status == TestStatus::Passed)
    }
}

/// Options for [`run_ordered`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop scheduling after the first failure.
    pub fail_fast: bool,
    /// Extra environment passed to every test process.
    pub env: Vec<(String, String)>,
}

/// Maximum characters of output kept for a failed test.
const OUTPUT_TAIL_CHARS: usize = 4_000;

/// Runs `ordered` tests from `binary` sequentially, one process per test.
///
/// `on_outcome` is called after each test finishes, before the next starts.
pub fn run_ordered<F>(
    binary: &Path,
    ordered: &[String],
    options: &RunOptions,
    mut on_outcome: F,
) -> RunReport
where
    F: FnMut(&TestOutcome),
{
    let mut report = RunReport::default();
    let mut halted = false;
    for name in ordered {
        let outcome = if halted {
            TestOutcome {
                name: name.clone(),
                status: TestStatus::NotRun,
                duration_ms: 0,
                output_tail: None,
            }
        } else {
            run_single(binary, name, options)
        };
        if options.fail_fast && outcome.status == TestStatus::Failed {
            halted = true;
        }
        on_outcome(&outcome);
        report.outcomes.push(outcome);
    }
    report
}

fn run_single(binary: &Path, name: &str, options: &RunOptions) -> TestOutcome {
    let started = Instant::now();
    let result = Command::new(binary)
        .args(["--exact", name, "--test-threads=1"])
        .envs(options.env.iter().map(|(key, value)| (key.as_str(), value.as_str())))
        .output();
    let duration_ms = started.elapsed().as_millis();
    match result {
        Ok(output) if output.status.success() => TestOutcome {
            name: name.to_string(),
            status: TestStatus::Passed,
            duration_ms,
            output_tail: None,
        },
        Ok(output) => {
            let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            TestOutcome {
                name: name.to_string(),
                status: TestStatus::Failed,
                duration_ms,
                output_tail: Some(tail(&combined, OUTPUT_TAIL_CHARS)),
            }
        }
        Err(err) => TestOutcome {
            name: name.to_string(),
            status: TestStatus::Failed,
            duration_ms,
            output_tail: Some(format!("failed to launch test process: {err}")),
        },
    }
}

/// Returns the last `max_chars` characters of `text`.
#[must_use]
pub fn tail(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    text.chars().skip(total.saturating_sub(max_chars)).collect()
}

// system-tests/src/bin/billing_e2e_runner.rs
// ============================================================================
// Module: Billing E2E Ordered Runner
// Description: Runs a suite binary's tests in dependency order.
// Purpose: Apply the execution order plan across independent test processes.
// Dependencies: billing-e2e-store, clap, serde_jcs, system-tests
// ============================================================================

//! ## Overview
//! Discovers the tests compiled into a libtest binary, reorders them with the
//! execution order plan, verifies the result against the scenario catalog,
//! and runs each test in its own process. Every test process receives the
//! absolute shared store path and one absolute artifact run root, so the
//! session shares a single store file and a single artifact directory.

use std::fs;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::Parser;
use system_tests::catalog::check_order;
use system_tests::config::SuiteConfig;
use system_tests::keys::BillingKey;
use system_tests::plan::resolve_plan;
use system_tests::runner::RunOptions;
use system_tests::runner::RunnerError;
use system_tests::runner::TestStatus;
use system_tests::runner::discover_tests;
use system_tests::runner::run_ordered;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "billing-e2e-runner",
    about = "Run billing API system tests in dependency order"
)]
struct Cli {
    /// Suite test binary (built with `--features system-tests`).
    #[arg(long, value_name = "PATH")]
    test_binary: PathBuf,
    /// TOML order plan overriding `BILLING_E2E_ORDER_PLAN` and the built-in plan.
    #[arg(long, value_name = "PATH")]
    plan: Option<PathBuf>,
    /// Print the resolved order and exit without running anything.
    #[arg(long)]
    dry_run: bool,
    /// Stop after the first failing test.
    #[arg(long)]
    fail_fast: bool,
    /// Unset every produced identifier in the shared store before running.
    #[arg(long)]
    reset: bool,
    /// Write a JSON run report to this path.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run(&Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            let _ = writeln!(io::stderr(), "billing-e2e-runner: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, RunnerError> {
    let config = SuiteConfig::load().map_err(RunnerError::Config)?;
    let plan = resolve_plan(cli.plan.as_deref().or(config.order_plan.as_deref()))?;

    let discovered = discover_tests(&cli.test_binary)?;
    let arrangement = plan.arrange(&discovered);
    let mut stderr = io::stderr();
    for pattern in &arrangement.unused_patterns {
        let _ = writeln!(stderr, "warning: order pattern {pattern:?} matched no test");
    }
    for index in arrangement.unmatched() {
        let _ = writeln!(
            stderr,
            "note: {} matched no order pattern; running after planned tests",
            discovered[*index]
        );
    }
    let ordered = arrangement.apply(&discovered);

    let violations = check_order(&ordered);
    if !violations.is_empty() {
        let lines: Vec<String> = violations.iter().map(|violation| format!("  - {violation}")).collect();
        return Err(RunnerError::Dependencies(lines.join("\n")));
    }

    if cli.dry_run {
        let mut stdout = io::stdout();
        for name in &ordered {
            let _ = writeln!(stdout, "{name}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let store = config.open_store().map_err(RunnerError::Config)?;
    if cli.reset {
        let removed = store.unset_all(BillingKey::PRODUCED.iter().map(|key| key.as_str()))?;
        let _ = writeln!(stderr, "reset: removed {removed} produced keys");
    }
    let options = RunOptions {
        fail_fast: cli.fail_fast,
        env: config.child_env(store.path(), session_stamp()).map_err(RunnerError::Config)?,
    };

    let total = ordered.len();
    let mut position = 0usize;
    let report = run_ordered(&cli.test_binary, &ordered, &options, |outcome| {
        position += 1;
        let label = match outcome.status {
            TestStatus::Passed => "ok",
            TestStatus::Failed => "FAILED",
            TestStatus::NotRun => "not run",
        };
        let _ = writeln!(
            io::stderr(),
            "[{position}/{total}] {} ... {label} ({} ms)",
            outcome.name, outcome.duration_ms
        );
        if let Some(tail) = &outcome.output_tail {
            let _ = writeln!(io::stderr(), "{tail}");
        }
    });

    let _ = writeln!(
        stderr,
        "summary: {} passed, {} failed, {} not run",
        report.count(TestStatus::Passed),
        report.count(TestStatus::Failed),
        report.count(TestStatus::NotRun)
    );
    if let Some(path) = &cli.report {
        let bytes = serde_jcs::to_vec(&report).map_err(|err| RunnerError::Report(err.to_string()))?;
        fs::write(path, bytes).map_err(|err| RunnerError::Report(err.to_string()))?;
    }
    Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn session_stamp() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

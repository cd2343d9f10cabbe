// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for the billing suite.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: billing-e2e-store
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 and empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use billing_e2e_store::FileAuditSink;
use billing_e2e_store::SharedStore;
use billing_e2e_store::StderrAuditSink;
use billing_e2e_store::StoreAuditSink;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Default shared store path, relative to the working directory.
const DEFAULT_ENV_FILE: &str = ".env";
/// Parent of the per-session artifact directories.
const DEFAULT_RUN_ROOT_PARENT: &str = "target/system-tests";

/// Environment keys for suite configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteEnv {
    /// Shared store path (defaults to `.env`).
    EnvFile,
    /// Require the shared store to exist (`true`/`false` or `1`/`0`).
    RequireEnvFile,
    /// Optional TOML order plan overriding the built-in plan.
    OrderPlan,
    /// Optional artifact root override.
    RunRoot,
    /// Optional HTTP timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Optional JSON-lines log file for store events.
    AuditLog,
}

impl SuiteEnv {
    /// Every configuration key, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::EnvFile,
        Self::RequireEnvFile,
        Self::OrderPlan,
        Self::RunRoot,
        Self::TimeoutSeconds,
        Self::AuditLog,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnvFile => "BILLING_E2E_ENV_FILE",
            Self::RequireEnvFile => "BILLING_E2E_REQUIRE_ENV_FILE",
            Self::OrderPlan => "BILLING_E2E_ORDER_PLAN",
            Self::RunRoot => "BILLING_E2E_RUN_ROOT",
            Self::TimeoutSeconds => "BILLING_E2E_TIMEOUT_SEC",
            Self::AuditLog => "BILLING_E2E_AUDIT_LOG",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed suite configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Shared store path.
    pub env_file: PathBuf,
    /// Fail when the shared store does not exist.
    pub require_env_file: bool,
    /// Optional order plan override.
    pub order_plan: Option<PathBuf>,
    /// Optional artifact root override.
    pub run_root: Option<PathBuf>,
    /// Optional HTTP timeout override.
    pub timeout: Option<Duration>,
    /// Optional store event log path.
    pub audit_log: Option<PathBuf>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
            require_env_file: false,
            order_plan: None,
            run_root: None,
            timeout: None,
            audit_log: None,
        }
    }
}

impl SuiteConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or boolean value).
    pub fn load() -> Result<Self, String> {
        let env_file = read_env_nonempty(SuiteEnv::EnvFile.as_str())?
            .map_or_else(|| PathBuf::from(DEFAULT_ENV_FILE), PathBuf::from);
        let require_env_file = parse_bool_env(
            SuiteEnv::RequireEnvFile.as_str(),
            read_env_nonempty(SuiteEnv::RequireEnvFile.as_str())?,
        )?;
        let order_plan = read_env_nonempty(SuiteEnv::OrderPlan.as_str())?.map(PathBuf::from);
        let run_root = read_env_nonempty(SuiteEnv::RunRoot.as_str())?.map(PathBuf::from);
        let timeout = read_env_nonempty(SuiteEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SuiteEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let audit_log = read_env_nonempty(SuiteEnv::AuditLog.as_str())?.map(PathBuf::from);
        Ok(Self {
            env_file,
            require_env_file,
            order_plan,
            run_root,
            timeout,
            audit_log,
        })
    }

    /// Returns the artifact directory for one test session: the configured
    /// override, or `target/system-tests/run_<stamp_ms>`.
    #[must_use]
    pub fn session_run_root(&self, stamp_ms: u128) -> PathBuf {
        self.run_root.clone().unwrap_or_else(|| {
            PathBuf::from(DEFAULT_RUN_ROOT_PARENT).join(format!("run_{stamp_ms}"))
        })
    }

    /// Builds the environment forwarded to every test process of a session.
    ///
    /// Both paths are made absolute so child processes share one store and
    /// one artifact directory regardless of their working directory.
    ///
    /// # Errors
    ///
    /// Returns an error when either path cannot be made absolute.
    pub fn child_env(
        &self,
        store_path: &Path,
        stamp_ms: u128,
    ) -> Result<Vec<(String, String)>, String> {
        let env_file = std::path::absolute(store_path)
            .map_err(|err| format!("cannot resolve store path {}: {err}", store_path.display()))?;
        let run_root = self.session_run_root(stamp_ms);
        let run_root = std::path::absolute(&run_root)
            .map_err(|err| format!("cannot resolve run root {}: {err}", run_root.display()))?;
        Ok(vec![
            (SuiteEnv::EnvFile.as_str().to_string(), env_file.display().to_string()),
            (SuiteEnv::RunRoot.as_str().to_string(), run_root.display().to_string()),
        ])
    }

    /// Opens the shared store with the configured event sink.
    ///
    /// # Errors
    ///
    /// Returns an error when the audit log cannot be opened, or when the store
    /// is required but missing.
    pub fn open_store(&self) -> Result<SharedStore, String> {
        let sink: Arc<dyn StoreAuditSink> = match &self.audit_log {
            Some(path) => Arc::new(FileAuditSink::new(path).map_err(|err| {
                format!("failed to open store audit log {}: {err}", path.display())
            })?),
            None => Arc::new(StderrAuditSink),
        };
        let store = SharedStore::open(&self.env_file).with_audit_sink(sink);
        if self.require_env_file && !store.exists() {
            return Err(format!(
                "{} requires shared store {} to exist",
                SuiteEnv::RequireEnvFile.as_str(),
                self.env_file.display()
            ));
        }
        Ok(store)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable; unset means `false`.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}

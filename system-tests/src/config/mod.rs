// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for billing API system tests.
// Purpose: Provide typed access to suite environment settings and defaults.
// Dependencies: billing-e2e-store
// ============================================================================

//! ## Overview
//! Suite configuration is read from environment variables and mapped into a
//! small typed structure for reuse by the runner and the test helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::SuiteConfig;
pub use env::SuiteEnv;
pub use env::read_env_strict;

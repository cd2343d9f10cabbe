// system-tests/src/lib.rs
// ============================================================================
// Module: Billing E2E System Tests Library
// Description: Shared configuration, scenario catalog, and ordered runner.
// Purpose: Provide common utilities for the billing API system-test binaries.
// Dependencies: billing-e2e-store, clap, serde, thiserror
// ============================================================================

//! ## Overview
//! This crate hosts the configuration, store keys, scenario catalog, default
//! execution order, and process runner used by the billing API system tests
//! in `system-tests/tests`.
//! The live suites talk to a remote backend whose base URL and credentials
//! come from the shared store; nothing here assumes a particular deployment.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod config;
pub mod keys;
pub mod plan;
pub mod runner;

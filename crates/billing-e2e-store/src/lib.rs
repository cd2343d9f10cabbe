// crates/billing-e2e-store/src/lib.rs
// ============================================================================
// Module: Billing E2E Shared State
// Description: Shared test-state store and execution order plan.
// Purpose: Thread entity identifiers between independently executed tests.
// Dependencies: serde, serde_json, thiserror, toml, url
// ============================================================================

//! ## Overview
//! This crate provides the two pieces of cross-test machinery used by the
//! billing API end-to-end suite:
//!
//! - [`SharedStore`]: a durable `KEY=VALUE` file that tests read
//!   configuration from and write created-entity identifiers into.
//! - [`OrderPlan`]: an ordered list of substring patterns that reorders
//!   discovered tests so producers run before consumers.
//!
//! Store mutations and malformed lines are reported as JSON-lines events
//! through a [`StoreAuditSink`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod document;
pub mod order;
pub mod snapshot;
pub mod store;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditLevel;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::StoreAuditEvent;
pub use audit::StoreAuditSink;
pub use document::ConfigEntry;
pub use document::MalformedEntry;
pub use order::Arrangement;
pub use order::OrderPlan;
pub use order::OrderingConfigError;
pub use snapshot::KeySpec;
pub use snapshot::StoreSnapshot;
pub use store::SharedStore;
pub use store::StoreError;

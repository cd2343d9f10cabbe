// system-tests/src/plan.rs
// ============================================================================
// Module: Default Execution Order
// Description: Built-in domain sequence for the billing suites.
// Purpose: Run producers first and delete entities in reverse dependency order.
// Dependencies: billing-e2e-store
// ============================================================================

//! ## Overview
//! The built-in plan follows the domain sequence auth, users, organizations,
//! organization-user links, tariffs and billing, resource pools, services,
//! roles. Delete scenarios run last, children before parents, so no entity is
//! removed while another scenario still needs it.

use std::path::Path;

use billing_e2e_store::OrderPlan;
use billing_e2e_store::OrderingConfigError;

/// Built-in ordered patterns.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "auth::test_auth",
    "auth::",
    "users::test_user_create",
    "users::test_user_get",
    "users::test_user_list",
    "users::test_user_update",
    "organizations::test_organization_create",
    "organizations::test_organization_get",
    "organizations::test_organization_list",
    "organizations::test_organization_update",
    "org_links::test_org_link_add",
    "org_links::test_org_link_list",
    "tariffs::test_tariff_create",
    "tariffs::test_tariff_get",
    "tariffs::test_tariff_list",
    "tariffs::test_tariff_update",
    "tariffs::test_tariff_assign",
    "tariffs::test_tariff_balance",
    "resource_pools::test_resource_pool_create",
    "resource_pools::test_resource_pool_get",
    "resource_pools::test_resource_pool_update",
    "services::test_service_create",
    "services::test_service_get",
    "services::test_service_update",
    "roles::test_role_create",
    "roles::test_role_get",
    "roles::test_role_assign",
    "roles::test_role_list_for_user",
    "services::test_service_delete",
    "resource_pools::test_resource_pool_delete",
    "roles::test_role_delete",
    "org_links::test_org_link_remove",
    "organizations::test_organization_delete",
    "tariffs::test_tariff_delete",
    "users::test_user_delete",
];

/// Returns the built-in plan.
///
/// # Errors
///
/// Returns [`OrderingConfigError`] if the built-in patterns are invalid.
pub fn default_order_plan() -> Result<OrderPlan, OrderingConfigError> {
    OrderPlan::new(DEFAULT_PATTERNS.iter().copied())
}

/// Loads the plan at `override_path`, or the built-in plan when `None`.
///
/// # Errors
///
/// Returns [`OrderingConfigError`] when the override cannot be read or parsed.
pub fn resolve_plan(override_path: Option<&Path>) -> Result<OrderPlan, OrderingConfigError> {
    override_path.map_or_else(default_order_plan, OrderPlan::from_file)
}

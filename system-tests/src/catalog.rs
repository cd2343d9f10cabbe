// system-tests/src/catalog.rs
// ============================================================================
// Module: Scenario Catalog
// Description: Store-key dependencies declared per billing scenario.
// Purpose: Verify an execution order before any test touches the backend.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Every live scenario declares the store keys it requires, produces, and
//! retires (delete scenarios unset the identifier they removed). An ordered
//! test list is checked against the catalog:
//!
//! - a required key whose producer is scheduled *later* is a violation;
//! - a required key retired by an *earlier* scenario is a violation.
//!
//! A required key whose producer is not scheduled at all is accepted: the
//! value may come from a previous run, which is how a single consumer test is
//! re-run without its setup. Names not in the catalog are ignored.

use std::collections::BTreeMap;
use std::fmt;

use crate::keys::BillingKey;
use crate::keys::BillingKey::ApiLogin;
use crate::keys::BillingKey::ApiPassword;
use crate::keys::BillingKey::ApiUrl;
use crate::keys::BillingKey::CreatedUserId;
use crate::keys::BillingKey::OrganizationId;
use crate::keys::BillingKey::ResourcePoolId;
use crate::keys::BillingKey::RoleId;
use crate::keys::BillingKey::ServiceId;
use crate::keys::BillingKey::TariffId;
use crate::keys::BillingKey::TokenId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Store-key contract of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioSpec {
    /// Fully qualified test name inside the suite binary.
    pub name: &'static str,
    /// Keys read by the scenario.
    pub requires: &'static [BillingKey],
    /// Keys written by the scenario.
    pub produces: &'static [BillingKey],
    /// Keys unset by the scenario.
    pub retires: &'static [BillingKey],
}

/// Why a scheduled scenario cannot see a key it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationReason {
    /// The producer is scheduled after the consumer.
    ProducedLater {
        /// Producer scenario.
        producer: String,
    },
    /// An earlier scenario unset the key.
    RetiredEarlier {
        /// Retiring scenario.
        retired_by: String,
    },
}

/// A dependency violation in an ordered test list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderViolation {
    /// Consumer scenario.
    pub test: String,
    /// Key the consumer cannot see.
    pub key: BillingKey,
    /// Violation detail.
    pub reason: ViolationReason,
}

impl fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            ViolationReason::ProducedLater {
                producer,
            } => write!(
                f,
                "`{}` requires {} but its producer `{producer}` is scheduled later",
                self.test, self.key
            ),
            ViolationReason::RetiredEarlier {
                retired_by,
            } => write!(
                f,
                "`{}` requires {} but `{retired_by}` unsets it earlier",
                self.test, self.key
            ),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

const fn spec(
    name: &'static str,
    requires: &'static [BillingKey],
    produces: &'static [BillingKey],
    retires: &'static [BillingKey],
) -> ScenarioSpec {
    ScenarioSpec {
        name,
        requires,
        produces,
        retires,
    }
}

/// Every live scenario with its store-key contract.
pub const SCENARIOS: &[ScenarioSpec] = &[
    spec("auth::test_auth", &[ApiUrl, ApiLogin, ApiPassword], &[TokenId], &[]),
    spec("auth::test_auth_rejects_bad_credentials", &[ApiUrl, ApiLogin], &[], &[]),
    spec("auth::test_requests_without_token_are_rejected", &[ApiUrl], &[], &[]),
    spec("users::test_user_create", &[ApiUrl, TokenId], &[CreatedUserId], &[]),
    spec("users::test_user_get", &[ApiUrl, TokenId, CreatedUserId], &[], &[]),
    spec("users::test_user_list", &[ApiUrl, TokenId, CreatedUserId], &[], &[]),
    spec("users::test_user_update", &[ApiUrl, TokenId, CreatedUserId], &[], &[]),
    spec("users::test_user_delete", &[ApiUrl, TokenId, CreatedUserId], &[], &[CreatedUserId]),
    spec("organizations::test_organization_create", &[ApiUrl, TokenId], &[OrganizationId], &[]),
    spec("organizations::test_organization_get", &[ApiUrl, TokenId, OrganizationId], &[], &[]),
    spec("organizations::test_organization_list", &[ApiUrl, TokenId, OrganizationId], &[], &[]),
    spec("organizations::test_organization_update", &[ApiUrl, TokenId, OrganizationId], &[], &[]),
    spec(
        "organizations::test_organization_delete",
        &[ApiUrl, TokenId, OrganizationId],
        &[],
        &[OrganizationId],
    ),
    spec("org_links::test_org_link_add", &[ApiUrl, TokenId, OrganizationId, CreatedUserId], &[], &[]),
    spec("org_links::test_org_link_list", &[ApiUrl, TokenId, OrganizationId, CreatedUserId], &[], &[]),
    spec(
        "org_links::test_org_link_remove",
        &[ApiUrl, TokenId, OrganizationId, CreatedUserId],
        &[],
        &[],
    ),
    spec("tariffs::test_tariff_create", &[ApiUrl, TokenId], &[TariffId], &[]),
    spec("tariffs::test_tariff_get", &[ApiUrl, TokenId, TariffId], &[], &[]),
    spec("tariffs::test_tariff_list", &[ApiUrl, TokenId, TariffId], &[], &[]),
    spec("tariffs::test_tariff_update", &[ApiUrl, TokenId, TariffId], &[], &[]),
    spec("tariffs::test_tariff_assign", &[ApiUrl, TokenId, TariffId, OrganizationId], &[], &[]),
    spec("tariffs::test_tariff_balance", &[ApiUrl, TokenId, OrganizationId], &[], &[]),
    spec("tariffs::test_tariff_delete", &[ApiUrl, TokenId, TariffId], &[], &[TariffId]),
    spec(
        "resource_pools::test_resource_pool_create",
        &[ApiUrl, TokenId, OrganizationId],
        &[ResourcePoolId],
        &[],
    ),
    spec("resource_pools::test_resource_pool_get", &[ApiUrl, TokenId, ResourcePoolId], &[], &[]),
    spec("resource_pools::test_resource_pool_update", &[ApiUrl, TokenId, ResourcePoolId], &[], &[]),
    spec(
        "resource_pools::test_resource_pool_delete",
        &[ApiUrl, TokenId, ResourcePoolId],
        &[],
        &[ResourcePoolId],
    ),
    spec(
        "services::test_service_create",
        &[ApiUrl, TokenId, ResourcePoolId, TariffId],
        &[ServiceId],
        &[],
    ),
    spec("services::test_service_get", &[ApiUrl, TokenId, ServiceId], &[], &[]),
    spec("services::test_service_update", &[ApiUrl, TokenId, ServiceId], &[], &[]),
    spec("services::test_service_delete", &[ApiUrl, TokenId, ServiceId], &[], &[ServiceId]),
    spec("roles::test_role_create", &[ApiUrl, TokenId], &[RoleId], &[]),
    spec("roles::test_role_get", &[ApiUrl, TokenId, RoleId], &[], &[]),
    spec("roles::test_role_assign", &[ApiUrl, TokenId, RoleId, CreatedUserId], &[], &[]),
    spec("roles::test_role_list_for_user", &[ApiUrl, TokenId, RoleId, CreatedUserId], &[], &[]),
    spec("roles::test_role_delete", &[ApiUrl, TokenId, RoleId], &[], &[RoleId]),
];

/// Looks up a scenario by its fully qualified test name.
#[must_use]
pub fn find(name: &str) -> Option<&'static ScenarioSpec> {
    SCENARIOS.iter().find(|spec| spec.name == name)
}

// ============================================================================
// SECTION: Order Check
// ============================================================================

/// Key availability while walking an ordered list.
#[derive(Debug, Clone)]
enum KeyState {
    /// Written by a scenario earlier in the list.
    Produced,
    /// Unset by the named scenario earlier in the list.
    Retired(String),
}

/// Checks an ordered list of test names against [`SCENARIOS`].
#[must_use]
pub fn check_order<T: AsRef<str>>(ordered: &[T]) -> Vec<OrderViolation> {
    let positions: BTreeMap<&str, usize> =
        ordered.iter().enumerate().map(|(index, name)| (name.as_ref(), index)).collect();
    let mut states: BTreeMap<BillingKey, KeyState> = BTreeMap::new();
    let mut violations = Vec::new();
    for (index, name) in ordered.iter().enumerate() {
        let Some(spec) = find(name.as_ref()) else {
            continue;
        };
        for key in spec.requires {
            let reason = match states.get(key) {
                Some(KeyState::Produced) => None,
                Some(KeyState::Retired(by)) => Some(ViolationReason::RetiredEarlier {
                    retired_by: by.clone(),
                }),
                None => key
                    .producer_test()
                    .filter(|producer| positions.get(producer).is_some_and(|at| *at > index))
                    .map(|producer| ViolationReason::ProducedLater {
                        producer: producer.to_string(),
                    }),
            };
            if let Some(reason) = reason {
                violations.push(OrderViolation {
                    test: spec.name.to_string(),
                    key: *key,
                    reason,
                });
            }
        }
        for key in spec.produces {
            states.insert(*key, KeyState::Produced);
        }
        for key in spec.retires {
            states.insert(*key, KeyState::Retired(spec.name.to_string()));
        }
    }
    violations
}

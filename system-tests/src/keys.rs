// system-tests/src/keys.rs
// ============================================================================
// Module: Shared Store Keys
// Description: Keys the billing suites read from and write to the store.
// Purpose: Name each key once, together with the test that produces it.
// Dependencies: billing-e2e-store
// ============================================================================

//! ## Overview
//! Configuration keys (`API_URL`, `API_LOGIN`, `API_PASSWORD`) are seeded by
//! the operator. Every other key is written by exactly one producer scenario
//! and read by later ones; a missing produced key is reported together with
//! the name of its producer.

use billing_e2e_store::KeySpec;

/// Shared store keys used by the billing suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BillingKey {
    /// Base URL of the billing API.
    ApiUrl,
    /// Login used to obtain a token.
    ApiLogin,
    /// Password used to obtain a token.
    ApiPassword,
    /// Bearer token issued by the auth endpoint.
    TokenId,
    /// User created by the user CRUD suite.
    CreatedUserId,
    /// Organization created by the organization CRUD suite.
    OrganizationId,
    /// Tariff created by the tariff suite.
    TariffId,
    /// Resource pool created by the resource pool suite.
    ResourcePoolId,
    /// Service created by the service suite.
    ServiceId,
    /// Role created by the role suite.
    RoleId,
}

impl BillingKey {
    /// Keys written by scenarios (cleared by the runner's reset).
    pub const PRODUCED: [Self; 7] = [
        Self::TokenId,
        Self::CreatedUserId,
        Self::OrganizationId,
        Self::TariffId,
        Self::ResourcePoolId,
        Self::ServiceId,
        Self::RoleId,
    ];

    /// Returns the key as written in the store file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiUrl => "API_URL",
            Self::ApiLogin => "API_LOGIN",
            Self::ApiPassword => "API_PASSWORD",
            Self::TokenId => "TOKEN_ID",
            Self::CreatedUserId => "CREATED_USER_ID",
            Self::OrganizationId => "ORGANIZATION_ID",
            Self::TariffId => "TARIFF_ID",
            Self::ResourcePoolId => "RESOURCE_POOL_ID",
            Self::ServiceId => "SERVICE_ID",
            Self::RoleId => "ROLE_ID",
        }
    }

    /// Returns the scenario that writes this key; `None` for operator-seeded keys.
    #[must_use]
    pub const fn producer_test(self) -> Option<&'static str> {
        match self {
            Self::ApiUrl | Self::ApiLogin | Self::ApiPassword => None,
            Self::TokenId => Some("auth::test_auth"),
            Self::CreatedUserId => Some("users::test_user_create"),
            Self::OrganizationId => Some("organizations::test_organization_create"),
            Self::TariffId => Some("tariffs::test_tariff_create"),
            Self::ResourcePoolId => Some("resource_pools::test_resource_pool_create"),
            Self::ServiceId => Some("services::test_service_create"),
            Self::RoleId => Some("roles::test_role_create"),
        }
    }
}

impl KeySpec for BillingKey {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn producer(&self) -> Option<&str> {
        self.producer_test()
    }
}

impl std::fmt::Display for BillingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

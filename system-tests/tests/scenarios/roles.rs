// system-tests/tests/scenarios/roles.rs
// ============================================================================
// Module: Role Scenarios
// Description: Role CRUD and role grants on the recorded user.
// Purpose: Produce ROLE_ID and exercise user role assignment.
// Dependencies: system-tests helpers
// ============================================================================

use serde_json::json;
use system_tests::keys::BillingKey;

use super::crud;
use super::crud::ROLES;
use crate::helpers::assertions::contains_id;
use crate::helpers::assertions::expect_id_field;
use crate::helpers::assertions::expect_items;
use crate::helpers::assertions::expect_status;
use crate::helpers::assertions::expect_str;
use crate::helpers::assertions::id_value;
use crate::helpers::context::ApiContext;

pub async fn create(ctx: &ApiContext) -> Result<(), String> {
    let body = json!({
        "name": crud::unique_name("role"),
        "permissions": ["billing:read"],
    });
    crud::create(ctx, ROLES, body).await.map(|_| ())
}

pub async fn get(ctx: &ApiContext) -> Result<(), String> {
    let role = crud::fetch(ctx, ROLES).await?;
    expect_str(&role, "name", "get role").map(|_| ())
}

/// Grants the recorded role to the recorded user.
pub async fn assign(ctx: &ApiContext) -> Result<(), String> {
    let user_id = ctx.require(BillingKey::CreatedUserId)?;
    let role_id = ctx.require(BillingKey::RoleId)?;
    let response = ctx
        .authed_client()?
        .post_json(&format!("/users/{user_id}/roles"), &json!({ "role_id": id_value(&role_id) }))
        .await?;
    expect_status(&response, 201, "assign role")?;
    expect_id_field(&response.body, "role_id", &role_id, "assign role")
}

pub async fn list_for_user(ctx: &ApiContext) -> Result<(), String> {
    let user_id = ctx.require(BillingKey::CreatedUserId)?;
    let role_id = ctx.require(BillingKey::RoleId)?;
    let response = ctx.authed_client()?.get(&format!("/users/{user_id}/roles")).await?;
    expect_status(&response, 200, "list user roles")?;
    let items = expect_items(&response.body, "list user roles")?;
    if !contains_id(items, &role_id) {
        return Err(format!("list user roles: role {role_id} is not granted to {user_id}"));
    }
    Ok(())
}

pub async fn delete(ctx: &ApiContext) -> Result<(), String> {
    crud::delete(ctx, ROLES).await
}

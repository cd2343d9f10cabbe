// system-tests/tests/suites/users.rs
// ============================================================================
// Module: User Suite
// Description: User CRUD against the live billing API.
// Purpose: Produce and retire CREATED_USER_ID.
// Dependencies: system-tests helpers, scenarios
// ============================================================================

//! User system-tests. Names match the scenario catalog.

use crate::helpers::live::LiveTest;
use crate::scenarios::users;

#[tokio::test(flavor = "multi_thread")]
async fn test_user_create() -> Result<(), Box<dyn std::error::Error>> {
    let Some(live) = LiveTest::start("users::test_user_create")? else {
        return Ok(());
    };
    let outcome = users::create(live.context()).await;
    live.finish(outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_user_get() -> Result<(), Box<dyn std::error::Error>> {
    let Some(live) = LiveTest::start("users::test_user_get")? else {
        return Ok(());
    };
    let outcome = users::get(live.context()).await;
    live.finish(outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_user_list() -> Result<(), Box<dyn std::error::Error>> {
    let Some(live) = LiveTest::start("users::test_user_list")? else {
        return Ok(());
    };
    let outcome = users::list(live.context()).await;
    live.finish(outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_user_update() -> Result<(), Box<dyn std::error::Error>> {
    let Some(live) = LiveTest::start("users::test_user_update")? else {
        return Ok(());
    };
    let outcome = users::update(live.context()).await;
    live.finish(outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_user_delete() -> Result<(), Box<dyn std::error::Error>> {
    let Some(live) = LiveTest::start("users::test_user_delete")? else {
        return Ok(());
    };
    let outcome = users::delete(live.context()).await;
    live.finish(outcome)
}

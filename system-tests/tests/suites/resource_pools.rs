// system-tests/tests/suites/resource_pools.rs
// ============================================================================
// Module: Resource Pool Suite
// Description: Resource pool CRUD against the live billing API.
// Purpose: Produce and retire RESOURCE_POOL_ID.
// Dependencies: system-tests helpers, scenarios
// ============================================================================

//! Resource Pool system-tests. Names match the scenario catalog.

use crate::helpers::live::LiveTest;
use crate::scenarios::resource_pools;

#[tokio::test(flavor = "multi_thread")]
async fn test_resource_pool_create() -> Result<(), Box<dyn std::error::Error>> {
    let Some(live) = LiveTest::start("resource_pools::test_resource_pool_create")? else {
        return Ok(());
    };
    let outcome = resource_pools::create(live.context()).await;
    live.finish(outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resource_pool_get() -> Result<(), Box<dyn std::error::Error>> {
    let Some(live) = LiveTest::start("resource_pools::test_resource_pool_get")? else {
        return Ok(());
    };
    let outcome = resource_pools::get(live.context()).await;
    live.finish(outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resource_pool_update() -> Result<(), Box<dyn std::error::Error>> {
    let Some(live) = LiveTest::start("resource_pools::test_resource_pool_update")? else {
        return Ok(());
    };
    let outcome = resource_pools::update(live.context()).await;
    live.finish(outcome)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resource_pool_delete() -> Result<(), Box<dyn std::error::Error>> {
    let Some(live) = LiveTest::start("resource_pools::test_resource_pool_delete")? else {
        return Ok(());
    };
    let outcome = resource_pools::delete(live.context()).await;
    live.finish(outcome)
}

//! Ready and deleted waiters for Service Catalog products and provisioning
//! artifacts.
//!
//! The timeouts below are the defaults callers pass through [`PollSettings`];
//! the waiters themselves take whatever settings they are given.

use crate::aws::catalog_client::CatalogApi;
use crate::error::{ResourceKind, ServiceCatalogError, ServiceCatalogResult, WaitGoal};
use crate::status::{product_status, provisioning_artifact_status};
use aws_sdk_servicecatalog::operation::describe_product_as_admin::DescribeProductAsAdminOutput;
use aws_sdk_servicecatalog::operation::describe_provisioning_artifact::DescribeProvisioningArtifactOutput;
use aws_sdk_servicecatalog::types::Status;
use resource_waiter_core::{wait_until_absent, wait_until_ready, PollSettings, State};
use std::time::Duration;

pub const PRODUCT_READY_TIMEOUT: Duration = Duration::from_secs(3 * 60);
pub const PRODUCT_DELETE_TIMEOUT: Duration = Duration::from_secs(3 * 60);
pub const PROVISIONING_ARTIFACT_READY_TIMEOUT: Duration = Duration::from_secs(3 * 60);
pub const PROVISIONING_ARTIFACT_DELETED_TIMEOUT: Duration = Duration::from_secs(3 * 60);

/// AWS documentation says a finished resource reports `AVAILABLE`, but the API
/// actually reports `CREATED`. Both are accepted as ready.
pub const STATUS_CREATED: &str = "CREATED";

fn ready_pending() -> [State; 3] {
    [
        State::from(Status::Creating.as_str()),
        State::NOT_FOUND,
        State::UNAVAILABLE,
    ]
}

fn ready_target() -> [State; 2] {
    [
        State::from(Status::Available.as_str()),
        State::from_static(STATUS_CREATED),
    ]
}

fn deleted_pending() -> [State; 4] {
    [
        State::from(Status::Creating.as_str()),
        State::from(Status::Available.as_str()),
        State::from_static(STATUS_CREATED),
        State::UNAVAILABLE,
    ]
}

/// Wait for a product to become `AVAILABLE` (or `CREATED`).
pub async fn product_ready<A>(
    api: &A,
    accept_language: Option<&str>,
    product_id: &str,
    settings: PollSettings,
) -> ServiceCatalogResult<Option<DescribeProductAsAdminOutput>>
where
    A: CatalogApi + ?Sized,
{
    log::info!("Waiting for product {product_id} to become ready");
    wait_until_ready(
        product_status(api, accept_language, product_id),
        ready_pending(),
        ready_target(),
        settings,
    )
    .await
    .map_err(|e| ServiceCatalogError::new(ResourceKind::Product, product_id, WaitGoal::Ready, e))
}

/// Wait for a product to disappear.
pub async fn product_deleted<A>(
    api: &A,
    accept_language: Option<&str>,
    product_id: &str,
    settings: PollSettings,
) -> ServiceCatalogResult<()>
where
    A: CatalogApi + ?Sized,
{
    log::info!("Waiting for product {product_id} to be deleted");
    wait_until_absent(
        product_status(api, accept_language, product_id),
        deleted_pending(),
        settings,
    )
    .await
    .map_err(|e| {
        ServiceCatalogError::new(ResourceKind::Product, product_id, WaitGoal::Deleted, e)
    })
}

/// Wait for a provisioning artifact to become `AVAILABLE` (or `CREATED`).
pub async fn provisioning_artifact_ready<A>(
    api: &A,
    artifact_id: &str,
    product_id: &str,
    settings: PollSettings,
) -> ServiceCatalogResult<Option<DescribeProvisioningArtifactOutput>>
where
    A: CatalogApi + ?Sized,
{
    log::info!("Waiting for provisioning artifact {artifact_id} of product {product_id} to become ready");
    wait_until_ready(
        provisioning_artifact_status(api, artifact_id, product_id),
        ready_pending(),
        ready_target(),
        settings,
    )
    .await
    .map_err(|e| {
        ServiceCatalogError::new(
            ResourceKind::ProvisioningArtifact,
            artifact_id,
            WaitGoal::Ready,
            e,
        )
    })
}

/// Wait for a provisioning artifact to disappear.
pub async fn provisioning_artifact_deleted<A>(
    api: &A,
    artifact_id: &str,
    product_id: &str,
    settings: PollSettings,
) -> ServiceCatalogResult<()>
where
    A: CatalogApi + ?Sized,
{
    log::info!("Waiting for provisioning artifact {artifact_id} of product {product_id} to be deleted");
    wait_until_absent(
        provisioning_artifact_status(api, artifact_id, product_id),
        deleted_pending(),
        settings,
    )
    .await
    .map_err(|e| {
        ServiceCatalogError::new(
            ResourceKind::ProvisioningArtifact,
            artifact_id,
            WaitGoal::Deleted,
            e,
        )
    })
}

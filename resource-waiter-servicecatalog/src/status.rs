//! Status fetchers: turn describe-call results into waiter snapshots.
//!
//! Service Catalog reports absence as a `ResourceNotFoundException` rather than
//! a status value, and occasionally answers without a detail block. Both are
//! normalized here so the waiter only ever classifies states.

use crate::aws::catalog_client::CatalogApi;
use crate::aws::CatalogError;
use aws_sdk_servicecatalog::operation::describe_product_as_admin::DescribeProductAsAdminOutput;
use aws_sdk_servicecatalog::operation::describe_provisioning_artifact::DescribeProvisioningArtifactOutput;
use aws_sdk_servicecatalog::types::{ProductViewDetail, Status};
use futures::future::{BoxFuture, FutureExt};
use resource_waiter_core::{FetchError, FetchResult, State, StatusSnapshot};

/// Map a reported status onto a waiter state; a missing status cannot be
/// trusted yet and reads as [`State::UNAVAILABLE`].
fn state_of(status: Option<&Status>) -> State {
    status.map_or(State::UNAVAILABLE, |s| State::from(s.as_str()))
}

fn to_fetch_error(err: CatalogError) -> FetchError<CatalogError> {
    if err.is_not_found() {
        log::debug!("{err}");
        FetchError::NotFound
    } else {
        FetchError::Failed(err)
    }
}

/// Status of a product as seen by `DescribeProductAsAdmin`.
pub fn product_status<'a, A>(
    api: &'a A,
    accept_language: Option<&'a str>,
    product_id: &'a str,
) -> impl FnMut() -> BoxFuture<'a, FetchResult<DescribeProductAsAdminOutput, CatalogError>> + 'a
where
    A: CatalogApi + ?Sized,
{
    move || {
        async move {
            let output = api
                .describe_product_as_admin(product_id, accept_language)
                .await
                .map_err(to_fetch_error)?;

            let state = match output.product_view_detail() {
                Some(detail) => state_of(detail.status()),
                None => State::UNAVAILABLE,
            };
            Ok(StatusSnapshot::new(state, output))
        }
        .boxed()
    }
}

/// Status of one provisioning artifact of a product.
pub fn provisioning_artifact_status<'a, A>(
    api: &'a A,
    artifact_id: &'a str,
    product_id: &'a str,
) -> impl FnMut() -> BoxFuture<'a, FetchResult<DescribeProvisioningArtifactOutput, CatalogError>> + 'a
where
    A: CatalogApi + ?Sized,
{
    move || {
        async move {
            let output = api
                .describe_provisioning_artifact(product_id, artifact_id)
                .await
                .map_err(to_fetch_error)?;

            let state = if output.provisioning_artifact_detail().is_some() {
                state_of(output.status())
            } else {
                State::UNAVAILABLE
            };
            Ok(StatusSnapshot::new(state, output))
        }
        .boxed()
    }
}

/// Status label of a product, if the output carries one.
pub fn product_status_label(output: &DescribeProductAsAdminOutput) -> Option<&str> {
    output
        .product_view_detail()
        .and_then(ProductViewDetail::status)
        .map(Status::as_str)
}

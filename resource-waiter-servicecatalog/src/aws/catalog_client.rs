//! AWS Service Catalog client wrapper for status queries

use crate::aws::{CatalogError, CatalogResult};
use async_trait::async_trait;
use aws_sdk_servicecatalog::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_servicecatalog::operation::describe_product_as_admin::DescribeProductAsAdminOutput;
use aws_sdk_servicecatalog::operation::describe_provisioning_artifact::DescribeProvisioningArtifactOutput;
use aws_sdk_servicecatalog::Client as ServiceCatalogSdkClient;
use std::fmt::Debug;

const RESOURCE_NOT_FOUND_CODE: &str = "ResourceNotFoundException";

/// The describe calls the waiters need. Implemented by [`ServiceCatalogClient`];
/// tests supply their own scripted implementation.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn describe_product_as_admin(
        &self,
        product_id: &str,
        accept_language: Option<&str>,
    ) -> CatalogResult<DescribeProductAsAdminOutput>;

    async fn describe_provisioning_artifact(
        &self,
        product_id: &str,
        artifact_id: &str,
    ) -> CatalogResult<DescribeProvisioningArtifactOutput>;
}

pub struct ServiceCatalogClient {
    client: ServiceCatalogSdkClient,
}

impl ServiceCatalogClient {
    pub fn new(client: ServiceCatalogSdkClient) -> Self {
        Self { client }
    }

    /// Create a client from the standard AWS credential provider chain.
    ///
    /// Region, profile and credentials are resolved the same way the AWS CLI
    /// resolves them (environment, shared config files, instance metadata).
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::new(ServiceCatalogSdkClient::new(&config))
    }
}

#[async_trait]
impl CatalogApi for ServiceCatalogClient {
    async fn describe_product_as_admin(
        &self,
        product_id: &str,
        accept_language: Option<&str>,
    ) -> CatalogResult<DescribeProductAsAdminOutput> {
        log::trace!("DescribeProductAsAdmin id={product_id}");
        self.client
            .describe_product_as_admin()
            .id(product_id)
            .set_accept_language(accept_language.map(str::to_string))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&format!("product '{product_id}'"), &e))
    }

    async fn describe_provisioning_artifact(
        &self,
        product_id: &str,
        artifact_id: &str,
    ) -> CatalogResult<DescribeProvisioningArtifactOutput> {
        log::trace!("DescribeProvisioningArtifact id={artifact_id} product={product_id}");
        self.client
            .describe_provisioning_artifact()
            .product_id(product_id)
            .provisioning_artifact_id(artifact_id)
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(
                    &format!("provisioning artifact '{artifact_id}' of product '{product_id}'"),
                    &e,
                )
            })
    }
}

/// Map an SDK failure onto [`CatalogError`] by its AWS error code.
pub(crate) fn classify_sdk_error<E, R>(what: &str, err: &SdkError<E, R>) -> CatalogError
where
    E: ProvideErrorMetadata + Debug,
    R: Debug,
{
    match err.code() {
        Some(RESOURCE_NOT_FOUND_CODE) => {
            CatalogError::ResourceNotFound(format!("{what}: {}", err.message().unwrap_or("")))
        }
        _ => CatalogError::SdkError(format!("Failed to describe {what}: {err:?}")),
    }
}

//! The AWS provider: credentials adapter plus service-config factory.

use std::sync::Arc;

use cloudledger_core::{
    AccountConfig, AccountIdentity, AccountRegistry, CredentialDiff, Provider, ResourceType,
    Result, ServiceConfig, SharedCredentials,
};

use crate::compute::{ComputeBackend, Ec2ServiceConfig};
use crate::config::AwsAccountConfig;
use crate::credentials::AwsCredentials;

/// AWS implementation of the core [`Provider`] contract.
///
/// One compute service config per account; the backend is shared and
/// receives per-account credentials on every call.
pub struct AwsCloudProvider {
    backend: Arc<dyn ComputeBackend>,
}

impl AwsCloudProvider {
    /// Create a provider over the given compute backend.
    #[must_use]
    pub fn new(backend: Arc<dyn ComputeBackend>) -> Self {
        Self { backend }
    }
}

impl Provider for AwsCloudProvider {
    type RawConfig = AwsAccountConfig;
    type Credentials = AwsCredentials;

    fn validate(&self, _identity: &AccountIdentity, raw: &AwsAccountConfig) -> Result<AwsCredentials> {
        AwsCredentials::from_config(raw)
    }

    fn compare(&self, old: &AwsCredentials, new: &AwsCredentials) -> CredentialDiff {
        old.diff(new)
    }

    fn service_configs(
        &self,
        identity: &AccountIdentity,
        credentials: &SharedCredentials<AwsCredentials>,
    ) -> Result<Vec<Arc<dyn ServiceConfig>>> {
        Ok(vec![Arc::new(Ec2ServiceConfig::new(
            identity.clone(),
            Arc::clone(credentials),
            Arc::clone(&self.backend),
        ))])
    }
}

/// First registered account whose cached compute inventory contains
/// `vpc_id` (case-insensitive).
#[must_use]
pub fn vpc_account(
    registry: &AccountRegistry<AwsCloudProvider>,
    vpc_id: &str,
) -> Option<Arc<AccountConfig<AwsCloudProvider>>> {
    registry.list_accounts().into_iter().find(|config| {
        config
            .service_configs()
            .iter()
            .filter(|service| service.resource_type() == ResourceType::Compute)
            .any(|service| {
                service.snapshot().iter().any(|record| {
                    record
                        .vpc_id
                        .as_deref()
                        .is_some_and(|vpc| vpc.eq_ignore_ascii_case(vpc_id))
                })
            })
    })
}

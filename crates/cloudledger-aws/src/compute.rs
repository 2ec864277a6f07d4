//! EC2 compute inventory service: cache, filter, and the backend seam.

use std::sync::Arc;

use async_trait::async_trait;
use cloudledger_core::{
    AccountIdentity, FilterSpec, ResourceRecord, ResourceType, Result, ServiceConfig,
    SharedCredentials,
};
use parking_lot::RwLock;
use tracing::debug;

use crate::credentials::AwsCredentials;

/// The wire seam: lists instances for one account on every poll tick.
///
/// Implementations receive the current credentials and filter on each
/// call, so a credential update is picked up on the next tick with no
/// restart. Production implementations talk to EC2; tests substitute a
/// stub.
#[async_trait]
pub trait ComputeBackend: Send + Sync {
    /// List instances visible to `credentials` that pass `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sync`](cloudledger_core::Error::Sync) when the
    /// backend call fails; the caller keeps its previous cache.
    async fn list_instances(
        &self,
        credentials: &AwsCredentials,
        filter: &FilterSpec,
    ) -> Result<Vec<ResourceRecord>>;
}

/// Per-account compute service config: owns the cached record set for
/// [`ResourceType::Compute`] and the filter gating what is tracked.
pub struct Ec2ServiceConfig {
    identity: AccountIdentity,
    credentials: SharedCredentials<AwsCredentials>,
    backend: Arc<dyn ComputeBackend>,
    cache: RwLock<Vec<ResourceRecord>>,
    filter: RwLock<FilterSpec>,
}

impl Ec2ServiceConfig {
    /// Create an empty-cache service config for one account.
    #[must_use]
    pub fn new(
        identity: AccountIdentity,
        credentials: SharedCredentials<AwsCredentials>,
        backend: Arc<dyn ComputeBackend>,
    ) -> Self {
        Self {
            identity,
            credentials,
            backend,
            cache: RwLock::new(Vec::new()),
            filter: RwLock::new(FilterSpec::default()),
        }
    }
}

#[async_trait]
impl ServiceConfig for Ec2ServiceConfig {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Compute
    }

    fn set_filter(&self, filter: FilterSpec) {
        *self.filter.write() = filter;
    }

    fn snapshot(&self) -> Vec<ResourceRecord> {
        self.cache.read().clone()
    }

    async fn refresh(&self) -> Result<()> {
        let credentials = self.credentials.read().clone();
        let filter = self.filter.read().clone();
        let mut records = self.backend.list_instances(&credentials, &filter).await?;
        for record in &mut records {
            record.account = self.identity.clone();
        }
        debug!(
            account = %self.identity,
            region = credentials.region(),
            records = records.len(),
            "compute inventory refreshed"
        );
        *self.cache.write() = records;
        Ok(())
    }
}

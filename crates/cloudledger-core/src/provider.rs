//! Provider contract: the seam between the registry core and each
//! backend cloud.
//!
//! A provider is resolved once at registry construction and never
//! inspected by downcast at call sites. It owns credential validation
//! and comparison, and acts as the factory for an account's fixed set
//! of service configs.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::account::AccountIdentity;
use crate::error::Result;
use crate::resource::{FilterSpec, ResourceRecord, ResourceType};

/// Shared handle to an account's current credentials.
///
/// Replaced wholesale on detected change; service configs read through
/// this handle on every refresh, so a credential update is picked up on
/// the next scheduled tick without a restart.
pub type SharedCredentials<C> = Arc<RwLock<C>>;

/// Which semantic credential fields differ between two values.
///
/// Field names are diagnostic labels only; secret values never appear
/// here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialDiff {
    fields: Vec<&'static str>,
}

impl CredentialDiff {
    /// A diff with no changed fields.
    #[must_use]
    pub const fn unchanged() -> Self {
        Self { fields: Vec::new() }
    }

    /// Record a changed field by its diagnostic label.
    pub fn record(&mut self, field: &'static str) {
        self.fields.push(field);
    }

    /// Whether any field changed.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Labels of the changed fields.
    #[must_use]
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }
}

impl std::fmt::Display for CredentialDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fields.join(", "))
    }
}

/// Per-account, per-resource-category cache and refresh unit.
///
/// Implementations own a live cache of translated records. A successful
/// [`refresh`](Self::refresh) replaces the cache with the freshly
/// retrieved set; stale records from a prior tick never survive a tick
/// that completes.
#[async_trait]
pub trait ServiceConfig: Send + Sync {
    /// Resource category this config serves.
    fn resource_type(&self) -> ResourceType;

    /// Replace the filter gating which remote resources are tracked.
    fn set_filter(&self, filter: FilterSpec);

    /// Point-in-time copy of the cached records.
    fn snapshot(&self) -> Vec<ResourceRecord>;

    /// Pull fresh records from the backend, replacing the cache on
    /// success. Errors leave the previous cache intact.
    async fn refresh(&self) -> Result<()>;
}

/// Credentials adapter and service-config factory for one backend
/// provider.
pub trait Provider: Send + Sync + 'static {
    /// Provider-specific configuration blob supplied at registration.
    type RawConfig;

    /// Opaque, comparable credentials value produced by validation.
    type Credentials: Clone + Send + Sync + 'static;

    /// Validate and normalize a raw configuration.
    ///
    /// Fails closed on out-of-range configuration; the error message
    /// for an unsupported region enumerates the supported set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) when the
    /// configuration is rejected.
    fn validate(&self, identity: &AccountIdentity, raw: &Self::RawConfig)
    -> Result<Self::Credentials>;

    /// Compare two credential values field by field.
    fn compare(&self, old: &Self::Credentials, new: &Self::Credentials) -> CredentialDiff;

    /// Construct the fixed set of service configs for a new account,
    /// one per resource category the provider supports.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Construction`](crate::Error::Construction) when
    /// any category fails to construct; the account is then not
    /// registered.
    fn service_configs(
        &self,
        identity: &AccountIdentity,
        credentials: &SharedCredentials<Self::Credentials>,
    ) -> Result<Vec<Arc<dyn ServiceConfig>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_records_fields_in_order() {
        let mut diff = CredentialDiff::unchanged();
        assert!(!diff.is_changed());
        diff.record("access key ID");
        diff.record("region");
        assert!(diff.is_changed());
        assert_eq!(diff.fields(), ["access key ID", "region"]);
        assert_eq!(format!("{diff}"), "access key ID, region");
    }
}

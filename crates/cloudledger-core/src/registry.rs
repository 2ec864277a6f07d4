//! Concurrency-safe keyed store of account configs and the
//! cross-account aggregation query.
//!
//! Registry membership is the single source of truth for "is this
//! account currently managed". The map lock is held only for map
//! operations and state-transition decisions, never across an `.await`
//! or a provider call; per-account sync tasks run independently of it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::account::{AccountConfig, AccountIdentity, AccountStatus, StartOutcome};
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::resource::{ResourceRecord, ResourceType, Selector};

/// One or more per-account failures seen by a multi-account query.
///
/// Returned alongside best-effort partial results; callers can use the
/// records even when this error is present.
#[derive(Debug)]
pub struct AggregateError {
    failures: Vec<(AccountIdentity, Error)>,
}

impl AggregateError {
    fn new(failures: Vec<(AccountIdentity, Error)>) -> Self {
        Self { failures }
    }

    /// The per-account failures, in iteration order.
    #[must_use]
    pub fn failures(&self) -> &[(AccountIdentity, Error)] {
        &self.failures
    }
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "inventory aggregation failed for {} account(s): ",
            self.failures.len()
        )?;
        for (i, (identity, err)) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{identity}: {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

/// Concurrency-safe registry of account configs for one provider.
///
/// The provider is injected once at construction and owns credential
/// validation/comparison and service-config creation.
pub struct AccountRegistry<P: Provider> {
    provider: P,
    accounts: Mutex<HashMap<AccountIdentity, Arc<AccountConfig<P>>>>,
}

impl<P: Provider> AccountRegistry<P> {
    /// Create an empty registry backed by `provider`.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Register an account, or update the credentials of an existing
    /// one.
    ///
    /// The raw configuration is validated either way. A new identity
    /// gets a freshly constructed account config (including its service
    /// configs); an existing identity goes through the credential
    /// update path and is never replaced wholesale.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] when the credentials are rejected,
    /// [`Error::Construction`] when a service config fails to build.
    pub fn add_account(
        &self,
        identity: AccountIdentity,
        raw: &P::RawConfig,
        poll_interval: Duration,
    ) -> Result<()> {
        let credentials = self.provider.validate(&identity, raw)?;

        if let Some(existing) = self.get_account(&identity) {
            existing.update_credentials(&self.provider, credentials);
            return Ok(());
        }

        let config = Arc::new(AccountConfig::new(
            &self.provider,
            identity.clone(),
            credentials.clone(),
            poll_interval,
        )?);

        let raced = {
            let mut accounts = self.accounts.lock();
            match accounts.entry(identity) {
                // Lost a registration race; treat as an update.
                Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
                Entry::Vacant(entry) => {
                    info!(account = %entry.key(), "cloud account registered");
                    entry.insert(config);
                    None
                }
            }
        };
        if let Some(existing) = raced {
            existing.update_credentials(&self.provider, credentials);
        }
        Ok(())
    }

    /// Remove an account, tearing down its periodic sync first.
    ///
    /// A no-op (logged) for unknown identities. Safe to call while a
    /// sync tick for the same account is in flight: the entry leaves
    /// the map before teardown, and teardown waits for the tick to
    /// complete or be cancelled, so no cache write lands afterward.
    /// The sync control is retired, not merely stopped, so a selector
    /// attach racing the removal cannot leave an orphaned task behind.
    pub async fn remove_account(&self, identity: &AccountIdentity) {
        let removed = self.accounts.lock().remove(identity);
        match removed {
            None => debug!(account = %identity, "remove ignored, account not registered"),
            Some(config) => {
                config.retire_periodic_sync().await;
                info!(account = %identity, "cloud account removed");
            }
        }
    }

    /// Look up an account by identity.
    #[must_use]
    pub fn get_account(&self, identity: &AccountIdentity) -> Option<Arc<AccountConfig<P>>> {
        self.accounts.lock().get(identity).cloned()
    }

    /// Point-in-time snapshot of all registered accounts.
    ///
    /// Callers iterate the snapshot without blocking, or being blocked
    /// by, concurrent registry mutation. No ordering is guaranteed.
    #[must_use]
    pub fn list_accounts(&self) -> Vec<Arc<AccountConfig<P>>> {
        self.accounts.lock().values().cloned().collect()
    }

    /// Attach a selector to an account: propagate its filter to every
    /// service config, then (re)start periodic sync.
    ///
    /// Starting sync on an already-running account is idempotent.
    ///
    /// # Errors
    ///
    /// [`Error::AccountNotFound`] when the identity is not registered.
    pub fn add_selector(&self, identity: &AccountIdentity, selector: &Selector) -> Result<()> {
        let config = self
            .get_account(identity)
            .ok_or_else(|| Error::AccountNotFound(identity.clone()))?;

        for service in config.service_configs() {
            service.set_filter(selector.filter.clone());
        }
        // A concurrent removal can land between the lookup above and
        // here; the retired sync control then refuses the start, and
        // the attach reports the account as gone.
        if config.start_periodic_sync() == StartOutcome::Retired {
            return Err(Error::AccountNotFound(identity.clone()));
        }
        info!(account = %identity, selector = %selector.name, "selector attached");
        Ok(())
    }

    /// Detach a selector, stopping the account's periodic sync.
    ///
    /// Fails silently (logged) for unknown identities. Sync stops on
    /// any selector removal regardless of `selector_name`.
    pub async fn remove_selector(&self, identity: &AccountIdentity, selector_name: &str) {
        let Some(config) = self.get_account(identity) else {
            debug!(
                account = %identity,
                selector = selector_name,
                "selector removal ignored, account not registered"
            );
            return;
        };
        config.stop_periodic_sync().await;
        info!(account = %identity, selector = selector_name, "selector detached");
    }

    /// Current sync status of an account.
    ///
    /// # Errors
    ///
    /// [`Error::AccountNotFound`] when the identity is not registered.
    pub fn status(&self, identity: &AccountIdentity) -> Result<AccountStatus> {
        self.get_account(identity)
            .map(|config| config.status())
            .ok_or_else(|| Error::AccountNotFound(identity.clone()))
    }

    /// Collect cached records of one resource category across every
    /// registered account.
    ///
    /// Per-account failures (account removed mid-iteration, or its last
    /// sync tick failed) are collected into a combined error and never
    /// blank out the records obtained from the other accounts.
    #[must_use]
    pub fn aggregate_resources(
        &self,
        resource_type: ResourceType,
    ) -> (Vec<ResourceRecord>, Option<AggregateError>) {
        let identities: Vec<AccountIdentity> = self.accounts.lock().keys().cloned().collect();

        let mut records = Vec::new();
        let mut failures: Vec<(AccountIdentity, Error)> = Vec::new();
        for identity in identities {
            let Some(config) = self.get_account(&identity) else {
                let err = Error::AccountNotFound(identity.clone());
                failures.push((identity, err));
                continue;
            };
            if let Some(message) = config.status().last_error {
                failures.push((identity.clone(), Error::Sync(message)));
            }
            for service in config.service_configs() {
                if service.resource_type() == resource_type {
                    records.extend(service.snapshot());
                }
            }
        }

        debug!(
            resource_type = %resource_type,
            records = records.len(),
            failures = failures.len(),
            "aggregated cached inventory"
        );
        let error = (!failures.is_empty()).then(|| AggregateError::new(failures));
        (records, error)
    }
}

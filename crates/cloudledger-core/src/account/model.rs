//! Account configuration: identity, credentials, service configs, and
//! periodic sync lifecycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::identity::AccountIdentity;
use super::sync::{StartOutcome, SyncControl};
use crate::provider::{Provider, ServiceConfig, SharedCredentials};

/// Periodic sync state of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    /// No sync task scheduled.
    #[default]
    Stopped,
    /// A sync task is scheduled at the account's poll interval.
    Running,
}

/// Point-in-time sync status of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatus {
    /// Whether periodic sync is currently scheduled.
    pub state: SyncState,
    /// Completion time of the last fully successful tick.
    pub last_sync: Option<DateTime<Utc>>,
    /// Error from the most recent tick, cleared on the next clean one.
    pub last_error: Option<String>,
}

#[derive(Clone, Default)]
struct TickStatus {
    last_sync: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// The unit of registration: one identity paired with its current
/// credentials, its fixed set of service configs, a poll interval, and
/// a running/stopped periodic-sync control.
///
/// Only the credentials (replaced wholesale) and the sync state vary
/// over the account's lifetime; the service-config set is fixed at
/// creation.
pub struct AccountConfig<P: Provider> {
    identity: AccountIdentity,
    credentials: SharedCredentials<P::Credentials>,
    services: Vec<Arc<dyn ServiceConfig>>,
    poll_interval: Duration,
    sync: SyncControl,
    status: Mutex<TickStatus>,
}

impl<P: Provider> AccountConfig<P> {
    /// Build an account config, constructing its service configs
    /// through the provider factory.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::Construction`](crate::Error::Construction)
    /// from the factory.
    pub(crate) fn new(
        provider: &P,
        identity: AccountIdentity,
        credentials: P::Credentials,
        poll_interval: Duration,
    ) -> crate::Result<Self> {
        let credentials = Arc::new(RwLock::new(credentials));
        let services = provider.service_configs(&identity, &credentials)?;
        Ok(Self {
            identity,
            credentials,
            services,
            poll_interval,
            sync: SyncControl::new(),
            status: Mutex::new(TickStatus::default()),
        })
    }

    /// Identity this account was registered under.
    #[must_use]
    pub fn identity(&self) -> &AccountIdentity {
        &self.identity
    }

    /// The account's service configs, one per resource category.
    #[must_use]
    pub fn service_configs(&self) -> &[Arc<dyn ServiceConfig>] {
        &self.services
    }

    /// Configured poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Snapshot of the current credentials.
    #[must_use]
    pub fn credentials(&self) -> P::Credentials {
        self.credentials.read().clone()
    }

    /// Current sync status.
    #[must_use]
    pub fn status(&self) -> AccountStatus {
        let tick = self.status.lock().clone();
        let state = if self.sync.is_running() {
            SyncState::Running
        } else {
            SyncState::Stopped
        };
        AccountStatus {
            state,
            last_sync: tick.last_sync,
            last_error: tick.last_error,
        }
    }

    /// Compare `new` against the stored credentials and replace them
    /// wholesale when any semantic field changed.
    ///
    /// Identical credentials are a silent no-op. On change, the names
    /// of the changed fields are logged (never their values); service
    /// configs and any running sync are left untouched, the next
    /// scheduled tick reads the new credentials.
    pub(crate) fn update_credentials(&self, provider: &P, new: P::Credentials) {
        let diff = provider.compare(&self.credentials.read(), &new);
        if !diff.is_changed() {
            return;
        }
        *self.credentials.write() = new;
        info!(account = %self.identity, changed = %diff, "account credentials updated");
    }

    /// Schedule the periodic sync task. No-op when already running, and
    /// refused once the account has been retired by removal.
    pub(crate) fn start_periodic_sync(self: &Arc<Self>) -> StartOutcome {
        let config = Arc::clone(self);
        let outcome = self.sync.start(move |cancel| async move {
            let mut ticker = tokio::time::interval(config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                // Racing the tick body against the token drops an
                // in-flight provider call before its cache write.
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = config.run_tick() => {}
                }
            }
        });
        match outcome {
            StartOutcome::Started => info!(
                account = %self.identity,
                interval_secs = self.poll_interval.as_secs(),
                "periodic inventory sync started"
            ),
            StartOutcome::AlreadyRunning => {
                debug!(account = %self.identity, "periodic sync already running");
            }
            StartOutcome::Retired => {
                debug!(account = %self.identity, "account removed, sync not started");
            }
        }
        outcome
    }

    /// Stop the periodic sync task, waiting for any in-flight tick to
    /// complete or be cancelled. No-op when already stopped.
    pub(crate) async fn stop_periodic_sync(&self) {
        if self.sync.stop().await {
            info!(account = %self.identity, "periodic inventory sync stopped");
        } else {
            debug!(account = %self.identity, "periodic sync already stopped");
        }
    }

    /// Stop the periodic sync task and bar it from ever restarting.
    /// Called on account removal so a racing selector attach cannot
    /// revive sync on an unregistered account.
    pub(crate) async fn retire_periodic_sync(&self) {
        if self.sync.retire().await {
            info!(account = %self.identity, "periodic inventory sync stopped");
        }
    }

    /// Refresh every service config once, recording tick status.
    ///
    /// A failed refresh is logged and recorded; it never tears down the
    /// schedule, the next tick proceeds normally.
    async fn run_tick(&self) {
        let mut failures: Vec<String> = Vec::new();
        for service in &self.services {
            if let Err(err) = service.refresh().await {
                warn!(
                    account = %self.identity,
                    resource_type = %service.resource_type(),
                    %err,
                    "inventory refresh failed"
                );
                failures.push(err.to_string());
            }
        }
        let mut status = self.status.lock();
        if failures.is_empty() {
            status.last_sync = Some(Utc::now());
            status.last_error = None;
        } else {
            status.last_error = Some(failures.join("; "));
        }
    }
}

//! # cloudledger-core
//!
//! Account registry and sync-orchestration layer for `CloudLedger`.
//!
//! This crate provides:
//! - A concurrency-safe registry of externally-configured cloud
//!   accounts, keyed by namespace/name identity
//! - Credential change detection on re-registration
//! - Selector (filter) attachment, which activates per-account
//!   periodic inventory polling
//! - Cross-account aggregation of cached inventory with
//!   partial-failure tolerance
//!
//! Wire calls to any specific backend live behind the [`Provider`] and
//! [`ServiceConfig`] traits; this core never performs network I/O
//! itself and holds no persistent state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
mod error;
pub mod provider;
mod registry;
pub mod resource;

pub use account::{AccountConfig, AccountIdentity, AccountStatus, SyncState};
pub use error::{Error, Result};
pub use provider::{CredentialDiff, Provider, ServiceConfig, SharedCredentials};
pub use registry::{AccountRegistry, AggregateError};
pub use resource::{FilterSpec, ResourceRecord, ResourceType, Selector};

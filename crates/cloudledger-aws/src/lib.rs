//! # cloudledger-aws
//!
//! AWS adapter for the `CloudLedger` account registry: credential
//! validation and comparison, plus an EC2-backed compute inventory
//! service config.
//!
//! The actual wire calls live behind the [`ComputeBackend`] trait;
//! this crate supplies the credential policy (region validation against
//! the standard partition, field-level change detection) and the
//! per-account cache/filter machinery around that seam.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod compute;
mod config;
mod credentials;
mod provider;

pub use compute::{ComputeBackend, Ec2ServiceConfig};
pub use config::AwsAccountConfig;
pub use credentials::{AwsCredentials, SUPPORTED_REGIONS};
pub use provider::{AwsCloudProvider, vpc_account};

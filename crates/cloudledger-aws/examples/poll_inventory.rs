#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Example: register an AWS account, attach a selector, and watch the
//! registry aggregate polled inventory.
//!
//! The backend here is an in-process stub; swap in a real EC2-backed
//! [`ComputeBackend`] implementation to poll live inventory.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=debug cargo run --package cloudledger-aws --example poll_inventory
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cloudledger_aws::{AwsAccountConfig, AwsCloudProvider, AwsCredentials, ComputeBackend};
use cloudledger_core::{
    AccountIdentity, AccountRegistry, FilterSpec, ResourceRecord, ResourceType, Selector,
};

/// Serves a fixed pair of instances, as a live backend would serve the
/// current EC2 listing.
struct DemoBackend;

#[async_trait]
impl ComputeBackend for DemoBackend {
    async fn list_instances(
        &self,
        credentials: &AwsCredentials,
        filter: &FilterSpec,
    ) -> cloudledger_core::Result<Vec<ResourceRecord>> {
        let instances = [("i-0aa1", "web-1", "vpc-fleet"), ("i-0aa2", "db-1", "vpc-data")];
        Ok(instances
            .into_iter()
            .map(|(id, name, vpc)| ResourceRecord {
                id: id.to_string(),
                name: name.to_string(),
                resource_type: ResourceType::Compute,
                region: credentials.region().to_string(),
                account: AccountIdentity::new("", ""),
                vpc_id: Some(vpc.to_string()),
            })
            .filter(|record| filter.matches(record))
            .collect())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let registry = AccountRegistry::new(AwsCloudProvider::new(Arc::new(DemoBackend)));
    let identity = AccountIdentity::new("demo", "aws-west");

    let raw = AwsAccountConfig {
        account_id: "123456789012".to_string(),
        access_key_id: "AKIAEXAMPLE".to_string(),
        access_key_secret: "demo-secret".to_string(),
        region: "us-west-2".to_string(),
        ..AwsAccountConfig::default()
    };
    registry.add_account(identity.clone(), &raw, Duration::from_secs(1))?;
    registry.add_selector(&identity, &Selector::new("all", FilterSpec::default()))?;

    // Let a few poll ticks land.
    tokio::time::sleep(Duration::from_secs(3)).await;

    let (records, error) = registry.aggregate_resources(ResourceType::Compute);
    println!("aggregated {} compute record(s):", records.len());
    for record in &records {
        println!(
            "  {} {} region={} vpc={}",
            record.id,
            record.name,
            record.region,
            record.vpc_id.as_deref().unwrap_or("-")
        );
    }
    if let Some(error) = error {
        eprintln!("partial failures: {error}");
    }

    let status = registry.status(&identity)?;
    println!("status: {:?}, last sync {:?}", status.state, status.last_sync);

    registry.remove_account(&identity).await;
    Ok(())
}

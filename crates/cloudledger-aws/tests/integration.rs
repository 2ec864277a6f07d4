//! End-to-end tests driving the registry through the AWS provider with
//! a stubbed compute backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cloudledger_aws::{
    AwsAccountConfig, AwsCloudProvider, AwsCredentials, ComputeBackend, vpc_account,
};
use cloudledger_core::{
    AccountIdentity, AccountRegistry, Error, FilterSpec, ResourceRecord, ResourceType, Selector,
    SyncState,
};
use parking_lot::Mutex;

const INTERVAL: Duration = Duration::from_secs(60);

/// Backend stub recording which access key served each call.
#[derive(Default)]
struct StubBackend {
    instances: Mutex<Vec<ResourceRecord>>,
    keys_seen: Mutex<Vec<String>>,
    failing: Mutex<bool>,
}

impl StubBackend {
    fn add_instance(&self, id: &str, name: &str, vpc: &str) {
        self.instances.lock().push(ResourceRecord {
            id: id.to_string(),
            name: name.to_string(),
            resource_type: ResourceType::Compute,
            region: "us-west-2".to_string(),
            account: AccountIdentity::new("", ""),
            vpc_id: Some(vpc.to_string()),
        });
    }
}

#[async_trait]
impl ComputeBackend for StubBackend {
    async fn list_instances(
        &self,
        credentials: &AwsCredentials,
        filter: &FilterSpec,
    ) -> cloudledger_core::Result<Vec<ResourceRecord>> {
        self.keys_seen
            .lock()
            .push(credentials.access_key_id().to_string());
        if *self.failing.lock() {
            return Err(Error::Sync("ec2 describe-instances throttled".to_string()));
        }
        Ok(self
            .instances
            .lock()
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }
}

fn setup() -> (AccountRegistry<AwsCloudProvider>, Arc<StubBackend>) {
    let backend = Arc::new(StubBackend::default());
    let provider = AwsCloudProvider::new(Arc::clone(&backend) as Arc<dyn ComputeBackend>);
    (AccountRegistry::new(provider), backend)
}

fn raw_config(access_key_id: &str) -> AwsAccountConfig {
    AwsAccountConfig {
        account_id: "123456789012".to_string(),
        access_key_id: access_key_id.to_string(),
        access_key_secret: "integration-secret".to_string(),
        region: "us-west-2".to_string(),
        ..AwsAccountConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn polled_inventory_flows_into_aggregate_query() {
    let (registry, backend) = setup();
    backend.add_instance("i-0aa1", "web-1", "vpc-fleet");
    backend.add_instance("i-0aa2", "db-1", "vpc-data");

    let identity = AccountIdentity::new("prod", "aws-west");
    registry
        .add_account(identity.clone(), &raw_config("AKIA1"), INTERVAL)
        .unwrap();

    // Nothing cached until a selector activates polling.
    let (records, error) = registry.aggregate_resources(ResourceType::Compute);
    assert!(records.is_empty());
    assert!(error.is_none());

    registry
        .add_selector(&identity, &Selector::new("all", FilterSpec::default()))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let (records, error) = registry.aggregate_resources(ResourceType::Compute);
    assert!(error.is_none());
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.account == identity));

    let owner = vpc_account(&registry, "VPC-FLEET").unwrap();
    assert_eq!(owner.identity(), &identity);
    assert!(vpc_account(&registry, "vpc-ghost").is_none());

    registry.remove_account(&identity).await;
    assert!(registry.get_account(&identity).is_none());
}

#[tokio::test(start_paused = true)]
async fn selector_filter_limits_tracked_instances() {
    let (registry, backend) = setup();
    backend.add_instance("i-0aa1", "web-1", "vpc-fleet");
    backend.add_instance("i-0aa2", "db-1", "vpc-data");

    let identity = AccountIdentity::new("prod", "aws-west");
    registry
        .add_account(identity.clone(), &raw_config("AKIA1"), INTERVAL)
        .unwrap();
    let filter = FilterSpec {
        vpc_ids: vec!["vpc-fleet".to_string()],
        vm_names: Vec::new(),
    };
    registry
        .add_selector(&identity, &Selector::new("fleet-only", filter))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let (records, _) = registry.aggregate_resources(ResourceType::Compute);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "web-1");

    registry.remove_account(&identity).await;
}

#[tokio::test(start_paused = true)]
async fn rotated_credentials_are_used_on_the_next_tick() {
    let (registry, backend) = setup();
    backend.add_instance("i-0aa1", "web-1", "vpc-fleet");

    let identity = AccountIdentity::new("prod", "aws-west");
    registry
        .add_account(identity.clone(), &raw_config("AKIA1"), INTERVAL)
        .unwrap();
    registry
        .add_selector(&identity, &Selector::new("all", FilterSpec::default()))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(backend.keys_seen.lock().last().unwrap(), "AKIA1");

    // Rotation is an in-place update, no restart required.
    registry
        .add_account(identity.clone(), &raw_config("AKIA2"), INTERVAL)
        .unwrap();
    assert_eq!(registry.list_accounts().len(), 1);
    assert_eq!(registry.status(&identity).unwrap().state, SyncState::Running);

    tokio::time::sleep(INTERVAL).await;
    assert_eq!(backend.keys_seen.lock().last().unwrap(), "AKIA2");

    registry.remove_account(&identity).await;
}

#[tokio::test(start_paused = true)]
async fn removal_stops_polling() {
    let (registry, backend) = setup();
    let identity = AccountIdentity::new("prod", "aws-west");
    registry
        .add_account(identity.clone(), &raw_config("AKIA1"), INTERVAL)
        .unwrap();
    registry
        .add_selector(&identity, &Selector::new("all", FilterSpec::default()))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    registry.remove_account(&identity).await;
    let calls = backend.keys_seen.lock().len();

    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(backend.keys_seen.lock().len(), calls);
}

#[tokio::test(start_paused = true)]
async fn failing_account_degrades_to_partial_results() {
    // Two accounts on independent backends under one registry requires
    // per-account routing; the stub routes on access key.
    #[derive(Default)]
    struct RoutingBackend {
        good: StubBackend,
        bad: StubBackend,
    }

    #[async_trait]
    impl ComputeBackend for RoutingBackend {
        async fn list_instances(
            &self,
            credentials: &AwsCredentials,
            filter: &FilterSpec,
        ) -> cloudledger_core::Result<Vec<ResourceRecord>> {
            if credentials.access_key_id() == "AKIA-BAD" {
                self.bad.list_instances(credentials, filter).await
            } else {
                self.good.list_instances(credentials, filter).await
            }
        }
    }

    let backend = Arc::new(RoutingBackend::default());
    backend.good.add_instance("i-0aa1", "web-1", "vpc-fleet");
    *backend.bad.failing.lock() = true;

    let registry = AccountRegistry::new(AwsCloudProvider::new(
        Arc::clone(&backend) as Arc<dyn ComputeBackend>,
    ));
    let good = AccountIdentity::new("prod", "good");
    let bad = AccountIdentity::new("prod", "bad");
    registry
        .add_account(good.clone(), &raw_config("AKIA-GOOD"), INTERVAL)
        .unwrap();
    registry
        .add_account(bad.clone(), &raw_config("AKIA-BAD"), INTERVAL)
        .unwrap();
    registry
        .add_selector(&good, &Selector::new("all", FilterSpec::default()))
        .unwrap();
    registry
        .add_selector(&bad, &Selector::new("all", FilterSpec::default()))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let (records, error) = registry.aggregate_resources(ResourceType::Compute);
    assert_eq!(records.len(), 1);
    let error = error.unwrap();
    assert_eq!(error.failures().len(), 1);
    assert_eq!(error.failures()[0].0, bad);

    registry.remove_account(&good).await;
    registry.remove_account(&bad).await;
}

#[tokio::test]
async fn unsupported_region_is_rejected_with_supported_set() {
    let (registry, _backend) = setup();
    let mut raw = raw_config("AKIA1");
    raw.region = "us-gov-west-1".to_string();

    let err = registry
        .add_account(AccountIdentity::new("prod", "gov"), &raw, INTERVAL)
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let message = err.to_string();
    assert!(message.contains("us-gov-west-1"));
    assert!(message.contains("us-west-2"));
    assert!(registry.list_accounts().is_empty());
}

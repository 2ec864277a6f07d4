//! Validated AWS credentials and field-level comparison.

use cloudledger_core::{CredentialDiff, Error, Result};

use crate::config::AwsAccountConfig;

/// AWS standard-partition regions accepted at validation.
///
/// Other partitions (aws-cn, aws-us-gov) are not supported; validation
/// fails closed for anything outside this set.
pub const SUPPORTED_REGIONS: &[&str] = &[
    "af-south-1",
    "ap-east-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ca-central-1",
    "eu-central-1",
    "eu-north-1",
    "eu-south-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "me-south-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
];

/// Normalized, comparable credentials for one AWS account.
///
/// Constructible only through [`AwsCredentials::from_config`], which
/// fails closed on out-of-range configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    account_id: String,
    access_key_id: String,
    access_key_secret: String,
    region: String,
    role_arn: String,
    external_id: String,
}

impl AwsCredentials {
    /// Validate and normalize a raw configuration.
    ///
    /// All fields are whitespace-trimmed. The region must be in
    /// [`SUPPORTED_REGIONS`], and either an access key pair or a role
    /// ARN must be present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the rejected field; for
    /// an unsupported region the message enumerates the supported set.
    pub fn from_config(config: &AwsAccountConfig) -> Result<Self> {
        let credentials = Self {
            account_id: config.account_id.trim().to_string(),
            access_key_id: config.access_key_id.trim().to_string(),
            access_key_secret: config.access_key_secret.trim().to_string(),
            region: config.region.trim().to_string(),
            role_arn: config.role_arn.trim().to_string(),
            external_id: config.external_id.trim().to_string(),
        };

        if !SUPPORTED_REGIONS.contains(&credentials.region.as_str()) {
            return Err(Error::Validation(format!(
                "{} not in supported regions [{}]",
                credentials.region,
                SUPPORTED_REGIONS.join(", ")
            )));
        }

        let has_key_pair =
            !credentials.access_key_id.is_empty() && !credentials.access_key_secret.is_empty();
        if !has_key_pair && credentials.role_arn.is_empty() {
            return Err(Error::Validation(
                "either an access key ID/secret pair or a role ARN is required".to_string(),
            ));
        }

        Ok(credentials)
    }

    /// Which semantic fields differ between `self` and `other`.
    ///
    /// Labels only; secret values never leave this type through the
    /// diff.
    #[must_use]
    pub fn diff(&self, other: &Self) -> CredentialDiff {
        let mut diff = CredentialDiff::unchanged();
        if self.account_id != other.account_id {
            diff.record("account ID");
        }
        if self.access_key_id != other.access_key_id {
            diff.record("access key ID");
        }
        if self.access_key_secret != other.access_key_secret {
            diff.record("access key secret");
        }
        if self.region != other.region {
            diff.record("region");
        }
        diff
    }

    /// AWS account number.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Static access key ID.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Static access key secret.
    #[must_use]
    pub fn access_key_secret(&self) -> &str {
        &self.access_key_secret
    }

    /// Region the account is polled from.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// IAM role to assume, when configured.
    #[must_use]
    pub fn role_arn(&self) -> &str {
        &self.role_arn
    }

    /// External ID for the assumed role.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }
}

// Manual impl so the secret never lands in logs or panic messages.
impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("account_id", &self.account_id)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("region", &self.region)
            .field("role_arn", &self.role_arn)
            .field("external_id", &self.external_id)
            .finish()
    }
}

//! Raw AWS account configuration, as supplied at registration.

use serde::{Deserialize, Serialize};

/// Provider-specific configuration blob for one AWS account.
///
/// Validated and normalized into
/// [`AwsCredentials`](crate::AwsCredentials) before use; never stored
/// as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AwsAccountConfig {
    /// AWS account number.
    pub account_id: String,
    /// Static access key ID.
    pub access_key_id: String,
    /// Static access key secret.
    pub access_key_secret: String,
    /// Region the account's inventory is polled from.
    pub region: String,
    /// IAM role to assume instead of static keys.
    pub role_arn: String,
    /// External ID for the assumed role.
    pub external_id: String,
}

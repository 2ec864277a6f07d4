//! Account identity.

use serde::{Deserialize, Serialize};

/// Immutable (namespace, name) pair identifying a registered account.
///
/// Used as the registry key; no two accounts share an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountIdentity {
    /// Namespace the account was registered under.
    pub namespace: String,
    /// Account name, unique within its namespace.
    pub name: String,
}

impl AccountIdentity {
    /// Create a new identity.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for AccountIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

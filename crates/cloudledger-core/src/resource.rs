//! Canonical inventory types shared by all providers.

use serde::{Deserialize, Serialize};

use crate::account::AccountIdentity;

/// Resource category served by a service config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    /// Virtual machine instances.
    Compute,
    /// Network interfaces.
    Network,
}

impl ResourceType {
    /// Stable tag used in logs.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Compute => "compute",
            Self::Network => "network",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A provider-translated inventory record, as cached by a service config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Provider-native identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category this record belongs to.
    pub resource_type: ResourceType,
    /// Region or locality the resource lives in.
    pub region: String,
    /// Account the record was retrieved through.
    pub account: AccountIdentity,
    /// Owning virtual network, when the provider reports one.
    pub vpc_id: Option<String>,
}

/// Filter specification gating which remote resources are tracked.
///
/// Empty match lists track everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Track only resources in these virtual networks.
    pub vpc_ids: Vec<String>,
    /// Track only resources with these names.
    pub vm_names: Vec<String>,
}

impl FilterSpec {
    /// Whether a record passes this filter.
    #[must_use]
    pub fn matches(&self, record: &ResourceRecord) -> bool {
        if !self.vpc_ids.is_empty() {
            let Some(vpc) = record.vpc_id.as_deref() else {
                return false;
            };
            if !self.vpc_ids.iter().any(|id| id.eq_ignore_ascii_case(vpc)) {
                return false;
            }
        }
        if !self.vm_names.is_empty() && !self.vm_names.iter().any(|n| n == &record.name) {
            return false;
        }
        true
    }
}

/// A named filter attachment. Attaching one activates periodic polling
/// for the account it targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    /// Selector name, used for removal and diagnostics.
    pub name: String,
    /// Filter propagated to every service config of the account.
    pub filter: FilterSpec,
}

impl Selector {
    /// Create a named selector.
    pub fn new(name: impl Into<String>, filter: FilterSpec) -> Self {
        Self {
            name: name.into(),
            filter,
        }
    }
}

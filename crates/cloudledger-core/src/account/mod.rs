//! Account registration unit and its periodic-sync lifecycle.

mod identity;
mod model;
mod sync;

pub use identity::AccountIdentity;
pub use model::{AccountConfig, AccountStatus, SyncState};
pub(crate) use sync::StartOutcome;

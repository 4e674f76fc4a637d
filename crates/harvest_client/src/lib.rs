//! Harvest client: talks to the remote harvest service and runs those calls
//! off the caller's thread.
mod engine;
mod service;
mod types;

pub use engine::ServiceHandle;
pub use service::{ClientSettings, HarvestService, ReqwestHarvestService};
pub use types::{FailureKind, ServiceError, ServiceEvent};

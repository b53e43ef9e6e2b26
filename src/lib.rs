//! Cluster node identity and discovery primitives.
//!
//! - [`types`]: node identity, transport addresses, liveness status, protocol versions
//! - [`config`]: settings loading and role resolution
//! - [`wire`]: the discovery wire format
//! - [`membership`]: the id-keyed membership table holding liveness status
//! - [`startup`]: local node bootstrap

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod membership;
pub mod startup;
pub mod types;
pub mod utils;
pub mod wire;

// Re-export common types
pub use config::{RoleConfig, Settings};
pub use error::{DecodeError, DiscoveryError};
pub use membership::MembershipTable;
pub use startup::NodeStartup;
pub use types::{NodeIdentity, NodeStatus, TransportAddress, Version, VersionGate};

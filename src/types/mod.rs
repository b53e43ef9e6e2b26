pub mod address;
pub mod node;
pub mod status;
pub mod version;

pub use address::TransportAddress;
pub use node::{NodeIdentity, NodeReport, NodeReportEntry, CLIENT_ATTR, DATA_ATTR, INGEST_ATTR, MASTER_ATTR};
pub use status::NodeStatus;
pub use version::{Version, VersionGate};

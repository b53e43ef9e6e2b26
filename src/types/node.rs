//! Node Identity
//!
//! The descriptor of one cluster member:
//! - Identity (id, correlation uuid, name)
//! - Network identity (host name, host address, transport endpoint)
//! - Role attributes and protocol version

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DiscoveryError, Result};
use crate::types::{NodeStatus, TransportAddress, Version};
use crate::utils::parse_bool_exact;

pub const DATA_ATTR: &str = "data";
pub const MASTER_ATTR: &str = "master";
pub const CLIENT_ATTR: &str = "client";
pub const INGEST_ATTR: &str = "ingest";

/// Immutable attribute snapshot shared between clones of a node.
pub type Attributes = Arc<BTreeMap<String, String>>;

/// A member of the cluster.
///
/// Equality and hashing only consider [`NodeIdentity::id`]. Liveness is not
/// part of the value; it is tracked per id by the membership table.
#[derive(Debug, Clone)]
pub struct NodeIdentity {
    /// Display name, not unique
    name: String,
    /// Cluster-wide unique id
    id: String,
    /// Parsed from `id`, or random when `id` is not a UUID
    uuid: Uuid,
    host_name: String,
    host_address: String,
    address: TransportAddress,
    attributes: Attributes,
    version: Version,
}

impl NodeIdentity {
    /// A node with an empty name and no attributes.
    ///
    /// Pass [`VersionGate::minimum_accepted`](crate::types::VersionGate::minimum_accepted)
    /// as `version` while the peer's real version is unknown.
    pub fn new(id: impl Into<String>, address: TransportAddress, version: Version) -> Result<Self> {
        Self::with_attributes("", id, address, BTreeMap::<String, String>::new(), version)
    }

    /// A node whose host info is taken from its transport address.
    pub fn with_attributes<K, V>(
        name: impl Into<String>,
        id: impl Into<String>,
        address: TransportAddress,
        attributes: impl IntoIterator<Item = (K, V)>,
        version: Version,
    ) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let host_name = address.host();
        let host_address = address.address();
        Self::with_host(name, id, host_name, host_address, address, attributes, version)
    }

    /// A node whose advertised host differs from the address it is reached on.
    pub fn with_host<K, V>(
        name: impl Into<String>,
        id: impl Into<String>,
        host_name: impl Into<String>,
        host_address: impl Into<String>,
        address: TransportAddress,
        attributes: impl IntoIterator<Item = (K, V)>,
        version: Version,
    ) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let id = id.into();
        if id.is_empty() {
            return Err(DiscoveryError::config("node id must not be empty"));
        }
        let attributes = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<BTreeMap<_, _>>();

        Ok(Self {
            name: name.into(),
            uuid: correlation_uuid(&id),
            id,
            host_name: host_name.into(),
            host_address: host_address.into(),
            address,
            attributes: Arc::new(attributes),
            version,
        })
    }

    /// Copy of this node at the version revealed by a handshake.
    pub fn with_version(&self, version: Version) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Correlation token. Only stable across decodes when the id is a UUID.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn host_address(&self) -> &str {
        &self.host_address
    }

    /// The address that the node can be communicated with.
    pub fn address(&self) -> &TransportAddress {
        &self.address
    }

    /// The inet listen address of the node, if it has one.
    pub fn inet_address(&self) -> Option<IpAddr> {
        self.address.ip()
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Is the node a client node or not.
    pub fn is_client_node(&self) -> Result<bool> {
        match self.attribute(CLIENT_ATTR) {
            Some(value) => parse_bool_exact(CLIENT_ATTR, value),
            None => Ok(false),
        }
    }

    /// Can this node become master or not.
    pub fn is_master_node(&self) -> Result<bool> {
        self.role_or_not_client(MASTER_ATTR)
    }

    /// Should this node hold data (shards) or not.
    pub fn is_data_node(&self) -> Result<bool> {
        self.role_or_not_client(DATA_ATTR)
    }

    pub fn is_ingest_node(&self) -> Result<bool> {
        match self.attribute(INGEST_ATTR) {
            Some(value) => parse_bool_exact(INGEST_ATTR, value),
            None => Ok(true),
        }
    }

    /// Should this node form a connection to the provided node.
    ///
    /// Client nodes never connect to each other.
    pub fn should_connect_to(&self, other: &NodeIdentity) -> Result<bool> {
        let both_clients = self.is_client_node()? && other.is_client_node()?;
        Ok(!both_clients)
    }

    /// Serializable view used by status reporting.
    pub fn report(&self, status: NodeStatus) -> NodeReport<'_> {
        let mut entry = BTreeMap::new();
        entry.insert(
            self.id.as_str(),
            NodeReportEntry {
                name: &self.name,
                status,
                transport_address: self.address.to_string(),
                attributes: &self.attributes,
            },
        );
        NodeReport(entry)
    }

    fn role_or_not_client(&self, key: &str) -> Result<bool> {
        match self.attribute(key) {
            Some(value) => parse_bool_exact(key, value),
            None => Ok(!self.is_client_node()?),
        }
    }
}

fn correlation_uuid(id: &str) -> Uuid {
    Uuid::parse_str(id).unwrap_or_else(|_| {
        debug!(node_id = %id, "node id is not a UUID, using a random correlation token");
        Uuid::new_v4()
    })
}

impl PartialEq for NodeIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NodeIdentity {}

impl Hash for NodeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            write!(f, "{{{}}}", self.name)?;
        }
        write!(f, "{{{}}}", self.id)?;
        if !self.host_name.is_empty() {
            write!(f, "{{{}}}", self.host_name)?;
        }
        write!(f, "{{{}}}", self.address)?;
        if !self.attributes.is_empty() {
            write!(f, "{:?}", self.attributes)?;
        }
        Ok(())
    }
}

/// `{ "<id>": { name, status, transport_address, attributes } }`
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct NodeReport<'a>(BTreeMap<&'a str, NodeReportEntry<'a>>);

#[derive(Debug, Serialize)]
pub struct NodeReportEntry<'a> {
    pub name: &'a str,
    pub status: NodeStatus,
    pub transport_address: String,
    pub attributes: &'a BTreeMap<String, String>,
}

//! Node Role Resolution
//!
//! Static role flags derived from raw settings at bootstrap. Settings are
//! read strictly: any value other than `true` / `false` is rejected.
//!
//! Precedence for the transport mode:
//!
//! | `node.mode`  | `node.local` | result                |
//! |--------------|--------------|-----------------------|
//! | `local`      | any          | local                 |
//! | `network`    | any          | network               |
//! | other value  | any          | configuration error   |
//! | absent       | `true`       | local                 |
//! | absent       | `false`      | network               |
//! | absent       | absent       | network               |

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::Settings;
use crate::error::{DiscoveryError, Result};
use crate::types::{CLIENT_ATTR, DATA_ATTR, INGEST_ATTR, MASTER_ATTR};

pub const NODE_LOCAL: &str = "node.local";
pub const NODE_MODE: &str = "node.mode";
pub const NODE_CLIENT: &str = "node.client";
pub const NODE_MASTER: &str = "node.master";
pub const NODE_DATA: &str = "node.data";
pub const NODE_INGEST: &str = "node.ingest";

/// `node.*` keys that configure the process rather than describe the node.
const RESERVED_NODE_KEYS: [&str; 5] = ["name", "id", "mode", "local", "version"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeMode {
    Local,
    Network,
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeMode::Local => f.write_str("local"),
            NodeMode::Network => f.write_str("network"),
        }
    }
}

/// Role configuration, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleConfig {
    pub mode: NodeMode,
    pub client: bool,
    pub master: bool,
    pub data: bool,
    pub ingest: bool,
}

impl RoleConfig {
    pub fn resolve(settings: &Settings) -> Result<Self> {
        let client = settings.get_as_bool(NODE_CLIENT, false)?;
        Ok(Self {
            mode: resolve_mode(settings)?,
            client,
            master: settings.get_as_bool(NODE_MASTER, !client)?,
            data: settings.get_as_bool(NODE_DATA, !client)?,
            ingest: settings.get_as_bool(NODE_INGEST, true)?,
        })
    }

    pub fn is_local(&self) -> bool {
        self.mode == NodeMode::Local
    }

    /// Whether the node must provision on-disk state.
    pub fn requires_local_storage(&self) -> bool {
        !(self.client || (!self.data && !self.master))
    }

    /// Role attributes that make a node's predicates report these roles.
    ///
    /// Flags equal to the attribute default are left out, so a default node
    /// advertises no role attributes at all.
    pub fn attributes(&self) -> BTreeMap<String, String> {
        let mut attributes = BTreeMap::new();
        if self.client {
            attributes.insert(CLIENT_ATTR.to_string(), "true".to_string());
        }
        if self.master == self.client {
            attributes.insert(MASTER_ATTR.to_string(), self.master.to_string());
        }
        if self.data == self.client {
            attributes.insert(DATA_ATTR.to_string(), self.data.to_string());
        }
        if !self.ingest {
            attributes.insert(INGEST_ATTR.to_string(), "false".to_string());
        }
        attributes
    }
}

fn resolve_mode(settings: &Settings) -> Result<NodeMode> {
    match settings.get(NODE_MODE) {
        Some("local") => Ok(NodeMode::Local),
        Some("network") => Ok(NodeMode::Network),
        Some(other) => Err(DiscoveryError::config(format!(
            "unsupported {} [{}]. Should be one of [local, network].",
            NODE_MODE, other
        ))),
        None => {
            if settings.get_as_bool(NODE_LOCAL, false)? {
                Ok(NodeMode::Local)
            } else {
                Ok(NodeMode::Network)
            }
        }
    }
}

/// Whether the node runs with the in-process transport.
pub fn is_local_node(settings: &Settings) -> Result<bool> {
    Ok(resolve_mode(settings)? == NodeMode::Local)
}

/// Reads only the client, master and data flags.
pub fn requires_local_storage(settings: &Settings) -> Result<bool> {
    if is_client_node(settings)? {
        return Ok(false);
    }
    Ok(is_data_node(settings)? || is_master_node(settings)?)
}

pub fn is_client_node(settings: &Settings) -> Result<bool> {
    settings.get_as_bool(NODE_CLIENT, false)
}

pub fn is_master_node(settings: &Settings) -> Result<bool> {
    let client = is_client_node(settings)?;
    settings.get_as_bool(NODE_MASTER, !client)
}

pub fn is_data_node(settings: &Settings) -> Result<bool> {
    let client = is_client_node(settings)?;
    settings.get_as_bool(NODE_DATA, !client)
}

pub fn is_ingest_node(settings: &Settings) -> Result<bool> {
    settings.get_as_bool(NODE_INGEST, true)
}

/// Attributes advertised by the local node: custom `node.*` entries plus the
/// role flags from `roles`.
pub fn node_attributes(settings: &Settings, roles: &RoleConfig) -> BTreeMap<String, String> {
    let role_keys = [CLIENT_ATTR, MASTER_ATTR, DATA_ATTR, INGEST_ATTR];
    let mut attributes: BTreeMap<String, String> = settings
        .by_prefix("node.")
        .filter(|(key, _)| !RESERVED_NODE_KEYS.contains(key) && !role_keys.contains(key))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    attributes.extend(roles.attributes());
    attributes
}

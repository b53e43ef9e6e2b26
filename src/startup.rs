//! Local Node Bootstrap
//!
//! Resolves everything the local node needs from settings in one pass:
//! - Role configuration and storage requirement
//! - Transport endpoint
//! - The local [`NodeIdentity`]

use std::net::{IpAddr, SocketAddr};

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::roles::{node_attributes, RoleConfig};
use crate::config::{NodeMode, Settings};
use crate::error::{DiscoveryError, Result};
use crate::types::{NodeIdentity, TransportAddress, Version, VersionGate};

pub const DEFAULT_TRANSPORT_HOST: &str = "127.0.0.1";
pub const DEFAULT_TRANSPORT_PORT: u16 = 9300;

/// Outcome of resolving the local node at startup.
#[derive(Debug, Clone)]
pub struct NodeStartup {
    roles: RoleConfig,
    local_node: NodeIdentity,
}

/// Serializable summary of the resolved roles.
#[derive(Debug, Serialize)]
pub struct RoleSummary {
    pub mode: NodeMode,
    pub client: bool,
    pub master: bool,
    pub data: bool,
    pub ingest: bool,
    pub requires_local_storage: bool,
}

impl NodeStartup {
    /// Fails on any invalid role, mode or transport setting; bootstrap must stop.
    pub fn resolve(settings: &Settings) -> Result<Self> {
        let roles = RoleConfig::resolve(settings)?;
        let id = settings
            .get("node.id")
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let name = settings.get_or("node.name", "");
        let version = settings
            .get_parsed::<Version>("node.version")?
            .unwrap_or_else(|| VersionGate::local().current());
        let address = transport_address(settings, roles.mode, &id)?;
        let host_name = settings
            .get("transport.publish_host")
            .map(str::to_string)
            .unwrap_or_else(|| address.host());

        let local_node = NodeIdentity::with_host(
            name,
            id,
            host_name,
            address.address(),
            address,
            node_attributes(settings, &roles),
            version,
        )?;

        info!(
            node = %local_node,
            mode = %roles.mode,
            storage = roles.requires_local_storage(),
            "resolved local node"
        );
        Ok(Self { roles, local_node })
    }

    pub fn roles(&self) -> &RoleConfig {
        &self.roles
    }

    pub fn local_node(&self) -> &NodeIdentity {
        &self.local_node
    }

    pub fn requires_local_storage(&self) -> bool {
        self.roles.requires_local_storage()
    }

    pub fn role_summary(&self) -> RoleSummary {
        RoleSummary {
            mode: self.roles.mode,
            client: self.roles.client,
            master: self.roles.master,
            data: self.roles.data,
            ingest: self.roles.ingest,
            requires_local_storage: self.roles.requires_local_storage(),
        }
    }
}

fn transport_address(settings: &Settings, mode: NodeMode, id: &str) -> Result<TransportAddress> {
    if mode == NodeMode::Local {
        return Ok(TransportAddress::local(id));
    }
    let raw_host = settings.get_or("transport.host", DEFAULT_TRANSPORT_HOST);
    let host: IpAddr = raw_host
        .parse()
        .map_err(|_| DiscoveryError::config(format!("Invalid transport.host [{}], expected an ip address", raw_host)))?;
    let port = settings
        .get_parsed::<u16>("transport.port")?
        .unwrap_or(DEFAULT_TRANSPORT_PORT);
    Ok(TransportAddress::inet(SocketAddr::new(host, port)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let startup = NodeStartup::resolve(&Settings::new()).unwrap();
        let node = startup.local_node();
        assert!(Uuid::parse_str(node.id()).is_ok());
        assert_eq!(node.uuid().to_string(), node.id());
        assert_eq!(node.address(), &TransportAddress::inet("127.0.0.1:9300".parse().unwrap()));
        assert_eq!(node.version(), Version::CURRENT);
        assert!(node.attributes().is_empty());
        assert!(startup.requires_local_storage());
    }

    #[test_log::test]
    fn test_configured_node() {
        let settings = Settings::from_yaml_str(
            r#"
node:
  id: data-7
  name: data seven
  master: false
  zone: eu-1
transport:
  host: 10.2.0.7
  port: 9310
  publish_host: data7.example.org
"#,
        )
        .unwrap();
        let startup = NodeStartup::resolve(&settings).unwrap();
        let node = startup.local_node();
        assert_eq!(node.id(), "data-7");
        assert_eq!(node.name(), "data seven");
        assert_eq!(node.host_name(), "data7.example.org");
        assert_eq!(node.host_address(), "10.2.0.7");
        assert_eq!(node.address().port(), Some(9310));
        assert_eq!(node.attribute("zone"), Some("eu-1"));
        assert!(!node.is_master_node().unwrap());
        assert!(node.is_data_node().unwrap());
    }

    #[test]
    fn test_local_mode_uses_local_transport() {
        let settings = Settings::new().put("node.mode", "local").put("node.id", "n1");
        let startup = NodeStartup::resolve(&settings).unwrap();
        assert_eq!(startup.local_node().address(), &TransportAddress::local("n1"));
        assert!(startup.roles().is_local());
    }

    #[test]
    fn test_invalid_settings_abort() {
        for (key, value) in [
            ("node.mode", "bogus"),
            ("node.client", "maybe"),
            ("transport.port", "70000"),
            ("transport.host", "not an ip"),
            ("node.version", "x.y"),
        ] {
            let err = NodeStartup::resolve(&Settings::new().put(key, value)).unwrap_err();
            assert!(err.is_config(), "{} = {}", key, value);
        }
    }

    #[test]
    fn test_client_summary() {
        let startup = NodeStartup::resolve(&Settings::new().put("node.client", "true")).unwrap();
        let summary = startup.role_summary();
        assert!(summary.client && !summary.master && !summary.data && summary.ingest);
        assert!(!summary.requires_local_storage);
        assert!(startup.local_node().is_client_node().unwrap());
    }
}

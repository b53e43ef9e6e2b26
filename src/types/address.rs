use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Transport-level endpoint of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum TransportAddress {
    /// Placeholder for nodes that are not reachable over a transport.
    Dummy,
    /// An IPv4 or IPv6 socket address.
    Inet { addr: SocketAddr },
    /// In-process transport, addressed by id.
    Local { id: String },
}

impl TransportAddress {
    pub fn inet(addr: SocketAddr) -> Self {
        TransportAddress::Inet { addr }
    }

    pub fn local(id: impl Into<String>) -> Self {
        TransportAddress::Local { id: id.into() }
    }

    /// Host name advertised for this endpoint.
    pub fn host(&self) -> String {
        match self {
            TransportAddress::Dummy => "dummy".to_string(),
            TransportAddress::Inet { addr } => addr.ip().to_string(),
            TransportAddress::Local { .. } => "local".to_string(),
        }
    }

    /// Textual host address of this endpoint.
    pub fn address(&self) -> String {
        match self {
            TransportAddress::Dummy | TransportAddress::Local { .. } => "0.0.0.0".to_string(),
            TransportAddress::Inet { addr } => addr.ip().to_string(),
        }
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            TransportAddress::Inet { addr } => Some(addr.ip()),
            _ => None,
        }
    }

    pub fn port(&self) -> Option<u16> {
        match self {
            TransportAddress::Inet { addr } => Some(addr.port()),
            _ => None,
        }
    }
}

impl From<SocketAddr> for TransportAddress {
    fn from(addr: SocketAddr) -> Self {
        TransportAddress::inet(addr)
    }
}

impl fmt::Display for TransportAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportAddress::Dummy => f.write_str("_dummy_addr_"),
            TransportAddress::Inet { addr } => write!(f, "inet[{}]", addr),
            TransportAddress::Local { id } => write!(f, "local[{}]", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_info() {
        let v4 = TransportAddress::inet("10.0.0.7:9300".parse().unwrap());
        assert_eq!(v4.host(), "10.0.0.7");
        assert_eq!(v4.address(), "10.0.0.7");
        assert_eq!(v4.port(), Some(9300));
        assert_eq!(v4.to_string(), "inet[10.0.0.7:9300]");

        let v6 = TransportAddress::inet("[::1]:9301".parse().unwrap());
        assert_eq!(v6.host(), "::1");
        assert_eq!(v6.to_string(), "inet[[::1]:9301]");

        let local = TransportAddress::local("1");
        assert_eq!(local.host(), "local");
        assert_eq!(local.ip(), None);
        assert_eq!(local.to_string(), "local[1]");
    }
}

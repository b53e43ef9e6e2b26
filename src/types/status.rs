use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;

/// Observed liveness of a cluster member.
///
/// There is no transition graph: any state may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    #[default]
    Unknown,
    Alive,
    Dead,
    #[serde(rename = "OFFSEARCH")]
    OffSearch,
}

impl NodeStatus {
    pub const ALL: [NodeStatus; 4] = [
        NodeStatus::Unknown,
        NodeStatus::Alive,
        NodeStatus::Dead,
        NodeStatus::OffSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Unknown => "UNKNOWN",
            NodeStatus::Alive => "ALIVE",
            NodeStatus::Dead => "DEAD",
            NodeStatus::OffSearch => "OFFSEARCH",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeStatus {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DiscoveryError::config(format!("Unknown node status [{}]", s)))
    }
}

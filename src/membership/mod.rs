//! Cluster Membership
//!
//! Known nodes keyed by id, each with its observed liveness status. Node
//! identities are immutable and shared; status is the only per-node value
//! that changes in place.
//!
//! Status writes are expected to come from one serialized cluster-state apply
//! path. The table guarantees that a single status update is atomic, nothing
//! more.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{NodeIdentity, NodeStatus};

#[derive(Debug, Clone)]
pub struct Member {
    pub node: Arc<NodeIdentity>,
    pub status: NodeStatus,
}

#[derive(Debug, Clone, Default)]
pub struct MembershipTable {
    members: Arc<DashMap<String, Member>>,
}

impl MembershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, or replaces the identity of a known one while keeping its
    /// status. Returns the previous identity.
    pub fn upsert(&self, node: NodeIdentity) -> Option<Arc<NodeIdentity>> {
        let node = Arc::new(node);
        match self.members.entry(node.id().to_string()) {
            Entry::Occupied(mut entry) => {
                debug!(node = %node, "replacing node identity");
                Some(std::mem::replace(&mut entry.get_mut().node, node))
            }
            Entry::Vacant(entry) => {
                debug!(node = %node, "adding node");
                entry.insert(Member {
                    node,
                    status: NodeStatus::Unknown,
                });
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<NodeIdentity>> {
        self.members.get(id).map(|member| member.node.clone())
    }

    pub fn member(&self, id: &str) -> Option<Member> {
        self.members.get(id).map(|member| member.clone())
    }

    pub fn status(&self, id: &str) -> Option<NodeStatus> {
        self.members.get(id).map(|member| member.status)
    }

    /// Records an observed status. Unknown ids are ignored.
    pub fn set_status(&self, id: &str, status: NodeStatus) {
        match self.members.get_mut(id) {
            Some(mut member) => member.status = status,
            None => warn!(node_id = %id, %status, "status update for unknown node"),
        }
    }

    pub fn remove(&self, id: &str) -> Option<Arc<NodeIdentity>> {
        self.members.remove(id).map(|(_, member)| {
            debug!(node = %member.node, "removed node");
            member.node
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn nodes(&self) -> Vec<Arc<NodeIdentity>> {
        self.members.iter().map(|entry| entry.node.clone()).collect()
    }

    pub fn with_status(&self, status: NodeStatus) -> Vec<Arc<NodeIdentity>> {
        self.members
            .iter()
            .filter(|entry| entry.status == status)
            .map(|entry| entry.node.clone())
            .collect()
    }

    /// Members `local` should hold a transport connection to, excluding itself.
    pub fn connection_candidates(&self, local: &NodeIdentity) -> Result<Vec<Arc<NodeIdentity>>> {
        let mut candidates = Vec::new();
        for entry in self.members.iter() {
            if entry.node.as_ref() != local && local.should_connect_to(&entry.node)? {
                candidates.push(entry.node.clone());
            }
        }
        Ok(candidates)
    }

    /// Report of every member, keyed by node id.
    pub fn report(&self) -> Result<Value> {
        let mut nodes = BTreeMap::new();
        for entry in self.members.iter() {
            let report = serde_json::to_value(entry.node.report(entry.status))?;
            if let Value::Object(map) = report {
                nodes.extend(map);
            }
        }
        Ok(serde_json::json!({ "nodes": nodes }))
    }
}

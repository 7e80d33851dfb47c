//! Core data types shared across the harness.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a cluster member.
///
/// Must match the identifiers the control plane accepts (e.g. `node1`..`node5`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Requested behavioral mode of a node.
///
/// The mode is mutable state owned by the cluster, not by the harness: the
/// harness only requests transitions and must allow a settle delay before a
/// change is guaranteed observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMode {
    /// Behaving correctly.
    Honest,
    /// Simulated Byzantine behavior (silent/adversarial).
    Malicious,
}

impl NodeMode {
    /// Wire value for the control-plane config action.
    pub fn action(&self) -> &'static str {
        match self {
            NodeMode::Honest => "honest",
            NodeMode::Malicious => "malicious",
        }
    }
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

/// On-demand snapshot of cluster-observable state.
///
/// Produced fresh on every poll, never cached across ticks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterStatus {
    /// Current view/term: the epoch of the current primary's tenure.
    #[serde(default)]
    pub view: u64,
    /// Identity of the reported primary/leader, when the cluster exposes one.
    #[serde(default)]
    pub leader: Option<String>,
    /// Free-form state label (e.g. `"Normal"`, `"ViewChange"`).
    #[serde(default)]
    pub state: Option<String>,
}

//! Leader-election (crash-fault) variant support.
//!
//! Raft-style clusters are not reached through a central dashboard: each node
//! answers its own status RPC, and the harness polls every known endpoint
//! until one reports itself as leader. Node processes are spawned and
//! terminated by an external process manager, keyed by integer node index;
//! [`ProcessControl`] is that collaborator's interface.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use tokio::time::{sleep, Instant};

use crate::error::{ClientError, ClientResult};

/// One known node address for leader probing.
#[derive(Debug, Clone)]
pub struct NodeEndpoint {
    /// Integer node index as used by the process manager.
    pub id: u32,
    /// host:port of the node's status endpoint.
    pub addr: String,
}

/// Status reply from a single node.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeStatus {
    /// Node's own id.
    pub id: u32,
    /// Role label; `"Leader"` is the distinguished value.
    pub state: String,
    /// Current term.
    #[serde(default)]
    pub term: u64,
}

impl NodeStatus {
    /// Whether this node reports itself as the leader.
    pub fn is_leader(&self) -> bool {
        self.state == "Leader"
    }
}

/// External process-lifecycle collaborator.
///
/// Implementations spawn and terminate node processes outside this crate;
/// the harness only requests transitions.
#[async_trait(?Send)]
pub trait ProcessControl {
    /// Start the node with the given index.
    async fn start_node(&self, index: u32) -> ClientResult<()>;

    /// Terminate the node with the given index.
    async fn stop_node(&self, index: u32) -> ClientResult<()>;
}

/// Polls known node endpoints for a self-reported leader.
pub struct LeaderLocator {
    http: Client<HttpConnector, Full<Bytes>>,
    endpoints: Vec<NodeEndpoint>,
    probe_timeout: Duration,
}

impl LeaderLocator {
    /// Create a locator over the known endpoints with a short per-node
    /// timeout (nodes under test may be down, the probe must stay fast).
    pub fn new(endpoints: Vec<NodeEndpoint>, probe_timeout: Duration) -> Self {
        Self {
            http: Client::builder(TokioExecutor::new()).build_http(),
            endpoints,
            probe_timeout,
        }
    }

    /// The known endpoints, in probe order.
    pub fn endpoints(&self) -> &[NodeEndpoint] {
        &self.endpoints
    }

    async fn probe(&self, endpoint: &NodeEndpoint) -> ClientResult<NodeStatus> {
        let uri = format!("http://{}/status", endpoint.addr);
        let request = Request::builder()
            .method(Method::GET)
            .uri(&uri)
            .body(Full::new(Bytes::new()))
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        let response = tokio::time::timeout(self.probe_timeout, self.http.request(request))
            .await
            .map_err(|_| ClientError::Timeout)?
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Http(response.status().as_u16()));
        }

        let body = tokio::time::timeout(self.probe_timeout, response.into_body().collect())
            .await
            .map_err(|_| ClientError::Timeout)?
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .to_bytes();

        Ok(serde_json::from_slice(&body)?)
    }

    /// Ask every known node in order; return the id of the first one that
    /// reports itself as leader, or `None` after exhausting all endpoints.
    pub async fn find_leader(&self) -> Option<u32> {
        for endpoint in &self.endpoints {
            match self.probe(endpoint).await {
                Ok(status) if status.is_leader() => return Some(status.id),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("leader probe of node {} failed: {e}", endpoint.id);
                }
            }
        }
        None
    }

    /// Poll [`find_leader`](Self::find_leader) until a leader appears or
    /// `timeout` elapses.
    pub async fn wait_for_leader(&self, timeout: Duration, poll_interval: Duration) -> Option<u32> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(id) = self.find_leader().await {
                return Some(id);
            }
            if Instant::now() >= deadline {
                return None;
            }
            sleep(poll_interval).await;
        }
    }

    /// Terminate the current leader through the process manager.
    ///
    /// Returns the deposed leader's id, or `None` when no node currently
    /// reports leadership. A failed termination is reported by the process
    /// manager's own error, absorbed here as a warning: the follow-up
    /// election assertion is the source of truth.
    pub async fn depose_leader<P: ProcessControl>(&self, control: &P) -> Option<u32> {
        let leader = self.find_leader().await?;
        if let Err(e) = control.stop_node(leader).await {
            tracing::warn!("could not stop leader node {leader}: {e}");
        }
        Some(leader)
    }
}

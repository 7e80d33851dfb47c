//! Typed client for the cluster control plane.
//!
//! [`ControlPlane`] is the seam between the orchestration core and the
//! external cluster: scenarios run against the trait, production code uses
//! [`HttpControlPlane`], tests use in-memory fakes.
//!
//! Every call carries its own short timeout. Transport, timeout, and decode
//! failures all surface as [`ClientError`] values; the cluster under test is
//! inherently unreliable during fault scenarios, so a single flaky call must
//! never abort a scenario.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;

use crate::config::HarnessConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::{ClusterStatus, NodeId, NodeMode};

/// Control-plane operations the harness needs from the cluster under test.
#[async_trait(?Send)]
pub trait ControlPlane {
    /// Clear ledger/state and restore all nodes to honest.
    async fn reset(&self) -> ClientResult<()>;

    /// Request a behavioral mode for one node.
    async fn set_node_mode(&self, node: &NodeId, mode: NodeMode) -> ClientResult<()>;

    /// Submit one client write request.
    ///
    /// Success means the control plane accepted the request for processing,
    /// not that it was committed. Commitment is verified separately by
    /// polling the ledger.
    async fn submit_request(&self) -> ClientResult<()>;

    /// Number of committed entries currently observable.
    async fn ledger_length(&self) -> ClientResult<u64>;

    /// Current view/term and leader identity.
    async fn status(&self) -> ClientResult<ClusterStatus>;

    /// Startup reachability probe.
    ///
    /// Default implementation reads the status endpoint and discards the
    /// snapshot.
    async fn probe(&self) -> ClientResult<()> {
        self.status().await.map(|_| ())
    }
}

#[derive(Serialize)]
struct ConfigRequest<'a> {
    node_id: &'a str,
    action: &'static str,
}

/// HTTP implementation of [`ControlPlane`] over the dashboard routes.
pub struct HttpControlPlane {
    http: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
    call_timeout: Duration,
    reset_timeout: Duration,
}

impl HttpControlPlane {
    /// Build a client targeting the configured base URL.
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            http: Client::builder(TokioExecutor::new()).build_http(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            call_timeout: config.call_timeout,
            reset_timeout: config.reset_timeout,
        }
    }

    /// Target base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call(&self, method: Method, path: &str, body: Bytes, timeout: Duration) -> ClientResult<Bytes> {
        let uri = format!("{}{}", self.base_url, path);
        let mut builder = Request::builder().method(method).uri(&uri);
        if !body.is_empty() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(Full::new(body))
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        let response = tokio::time::timeout(timeout, self.http.request(request))
            .await
            .map_err(|_| ClientError::Timeout)?
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http(status.as_u16()));
        }

        let bytes = tokio::time::timeout(timeout, response.into_body().collect())
            .await
            .map_err(|_| ClientError::Timeout)?
            .map_err(|e| ClientError::Transport(e.to_string()))?
            .to_bytes();

        Ok(bytes)
    }

    async fn get(&self, path: &str, timeout: Duration) -> ClientResult<Bytes> {
        self.call(Method::GET, path, Bytes::new(), timeout).await
    }

    async fn post(&self, path: &str, body: Bytes, timeout: Duration) -> ClientResult<Bytes> {
        self.call(Method::POST, path, body, timeout).await
    }
}

#[async_trait(?Send)]
impl ControlPlane for HttpControlPlane {
    async fn reset(&self) -> ClientResult<()> {
        self.get("/api/control/reset", self.reset_timeout).await?;
        Ok(())
    }

    async fn set_node_mode(&self, node: &NodeId, mode: NodeMode) -> ClientResult<()> {
        let body = serde_json::to_vec(&ConfigRequest {
            node_id: node.as_str(),
            action: mode.action(),
        })?;
        self.post("/api/control/config", Bytes::from(body), self.call_timeout)
            .await?;
        Ok(())
    }

    async fn submit_request(&self) -> ClientResult<()> {
        self.post("/api/control/start", Bytes::new(), self.call_timeout)
            .await?;
        Ok(())
    }

    async fn ledger_length(&self) -> ClientResult<u64> {
        let body = self.get("/api/ledger", self.call_timeout).await?;
        // Entries are opaque to the harness; only the count matters.
        let entries: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
        Ok(entries.len() as u64)
    }

    async fn status(&self) -> ClientResult<ClusterStatus> {
        let body = self.get("/api/status", self.call_timeout).await?;
        let status: ClusterStatus = serde_json::from_slice(&body)?;
        Ok(status)
    }
}

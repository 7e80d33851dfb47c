//! End-to-end tests against an in-process control-plane stub.
//!
//! A small hyper server models an N=5 pBFT cluster behind the dashboard
//! routes: submits commit while the primary is honest and a quorum of nodes
//! remains, a faulted primary drops requests until a status poll observes the
//! view change. The HTTP client, the leader locator, and the full built-in
//! suite run against it over real sockets.

use std::collections::HashSet;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use faultline::{
    default_suite, ClientError, ControlPlane, HarnessConfig, HttpControlPlane, LeaderLocator,
    NodeEndpoint, NodeMode, Reporter, ScenarioRunner, Verdict,
};

// ============================================================================
// Cluster model
// ============================================================================

const NODES: usize = 5;
const QUORUM: usize = 3;

/// Scripted cluster state behind the stub routes.
#[derive(Default)]
struct ClusterModel {
    height: u64,
    view: u64,
    primary: usize,
    malicious: HashSet<String>,
    /// When set, `/api/ledger` answers with a non-JSON body.
    garbage_ledger: bool,
    /// When set, status polls never complete a view change (stuck cluster).
    frozen_view: bool,
}

impl ClusterModel {
    fn node_name(index: usize) -> String {
        format!("node{}", index + 1)
    }

    fn reset(&mut self) {
        self.height = 0;
        self.view = 0;
        self.primary = 0;
        self.malicious.clear();
    }

    fn configure(&mut self, node: &str, action: &str) {
        if action == "malicious" {
            self.malicious.insert(node.to_string());
        } else {
            self.malicious.remove(node);
        }
    }

    fn primary_faulted(&self) -> bool {
        self.malicious.contains(&Self::node_name(self.primary))
    }

    fn submit(&mut self) {
        // A faulted primary silently drops the request; otherwise a commit
        // needs a quorum of honest nodes.
        if !self.primary_faulted() && NODES - self.malicious.len() >= QUORUM {
            self.height += 1;
        }
    }

    /// A status poll is where the modeled view change completes: the cluster
    /// deposes a faulted primary and hands the view to the next honest node.
    fn poll_status(&mut self) -> (u64, String) {
        if self.primary_faulted() && !self.frozen_view {
            for candidate in 0..NODES {
                let next = (self.primary + 1 + candidate) % NODES;
                if !self.malicious.contains(&Self::node_name(next)) {
                    self.primary = next;
                    break;
                }
            }
            self.view += 1;
        }
        (self.view, Self::node_name(self.primary))
    }
}

// ============================================================================
// Stub server
// ============================================================================

async fn handle(
    req: Request<Incoming>,
    model: Arc<Mutex<ClusterModel>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body_bytes = body
        .collect()
        .await
        .map(|b| b.to_bytes())
        .unwrap_or_default();

    let response = match (parts.method.as_str(), parts.uri.path()) {
        ("GET", "/api/control/reset") => {
            model.lock().unwrap().reset();
            Response::new(Full::new(Bytes::from("OK")))
        }
        ("POST", "/api/control/config") => {
            let req: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap_or_default();
            let node = req["node_id"].as_str().unwrap_or_default().to_string();
            let action = req["action"].as_str().unwrap_or_default().to_string();
            model.lock().unwrap().configure(&node, &action);
            Response::new(Full::new(Bytes::from("OK")))
        }
        ("POST", "/api/control/start") => {
            model.lock().unwrap().submit();
            Response::new(Full::new(Bytes::from("OK")))
        }
        ("GET", "/api/ledger") => {
            let m = model.lock().unwrap();
            if m.garbage_ledger {
                Response::new(Full::new(Bytes::from("not json")))
            } else {
                let blocks: Vec<serde_json::Value> = (1..=m.height)
                    .map(|seq| serde_json::json!({ "sequence": seq }))
                    .collect();
                Response::new(Full::new(Bytes::from(
                    serde_json::to_vec(&blocks).unwrap(),
                )))
            }
        }
        ("GET", "/api/status") => {
            let (view, leader) = model.lock().unwrap().poll_status();
            let status = serde_json::json!({ "view": view, "leader": leader, "state": "Normal" });
            Response::new(Full::new(Bytes::from(
                serde_json::to_vec(&status).unwrap(),
            )))
        }
        _ => {
            let mut resp = Response::new(Full::new(Bytes::from("Not Found")));
            *resp.status_mut() = StatusCode::NOT_FOUND;
            resp
        }
    };

    Ok(response)
}

async fn spawn_control_plane(model: Arc<Mutex<ClusterModel>>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");

    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let model = model.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| handle(req, model.clone()));
                let _ = hyper::server::conn::http1::Builder::new()
                    .serve_connection(io, service)
                    .await;
            });
        }
    });

    addr
}

fn fast_config(addr: SocketAddr) -> HarnessConfig {
    HarnessConfig::new(format!("http://{addr}"))
        .settle_delay(Duration::from_millis(5))
        .reset_sync_delay(Duration::from_millis(5))
        .commit_wait(Duration::from_millis(5))
        .inter_submit_delay(Duration::from_millis(5))
        .poll_interval(Duration::from_millis(10))
        .view_change_timeout(Duration::from_secs(2))
        .post_failover_commit_timeout(Duration::from_secs(2))
}

// ============================================================================
// HTTP client
// ============================================================================

#[tokio::test]
async fn control_plane_round_trip() {
    let model = Arc::new(Mutex::new(ClusterModel::default()));
    let addr = spawn_control_plane(model.clone()).await;
    let client = HttpControlPlane::new(&fast_config(addr));

    client.reset().await.expect("reset");
    assert_eq!(client.ledger_length().await.expect("ledger"), 0);

    client.submit_request().await.expect("submit");
    assert_eq!(client.ledger_length().await.expect("ledger"), 1);

    client
        .set_node_mode(&"node5".into(), NodeMode::Malicious)
        .await
        .expect("config");
    assert!(model.lock().unwrap().malicious.contains("node5"));

    let status = client.status().await.expect("status");
    assert_eq!(status.view, 0);
    assert_eq!(status.leader.as_deref(), Some("node1"));

    // Reset is idempotent: height back to 0, view at its initial value,
    // every node honest again.
    client.reset().await.expect("reset");
    assert_eq!(client.ledger_length().await.expect("ledger"), 0);
    assert_eq!(client.status().await.expect("status").view, 0);
    assert!(model.lock().unwrap().malicious.is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let model = Arc::new(Mutex::new(ClusterModel::default()));
    model.lock().unwrap().garbage_ledger = true;
    let addr = spawn_control_plane(model).await;
    let client = HttpControlPlane::new(&fast_config(addr));

    match client.ledger_length().await {
        Err(ClientError::Decode(_)) => {}
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_target_fails_the_probe() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpControlPlane::new(&fast_config(addr));
    match client.probe().await {
        Err(ClientError::Transport(_)) | Err(ClientError::Timeout) => {}
        other => panic!("expected transport failure, got {other:?}"),
    }
}

// ============================================================================
// Full suite
// ============================================================================

#[tokio::test]
async fn default_suite_passes_against_conforming_cluster() {
    let model = Arc::new(Mutex::new(ClusterModel::default()));
    let addr = spawn_control_plane(model.clone()).await;

    let config = fast_config(addr);
    let client = Rc::new(HttpControlPlane::new(&config));
    let runner = ScenarioRunner::new(client, &config, Reporter::new(false));

    let report = runner.run_suite(&default_suite(&config)).await;

    assert_eq!(report.verdicts().len(), 5);
    for (name, verdict) in report.verdicts() {
        assert_eq!(*verdict, Verdict::Pass, "{name} did not pass");
    }
    // Cleanup left no node faulted.
    assert!(model.lock().unwrap().malicious.is_empty());
}

#[tokio::test]
async fn stuck_cluster_fails_failover_and_still_gets_cleaned_up() {
    let model = Arc::new(Mutex::new(ClusterModel::default()));
    let addr = spawn_control_plane(model.clone()).await;

    let config = fast_config(addr)
        .view_change_timeout(Duration::from_millis(100))
        .poll_interval(Duration::from_millis(20));
    let client = Rc::new(HttpControlPlane::new(&config));
    let runner = ScenarioRunner::new(client, &config, Reporter::new(false));

    // frozen_view survives the scenario's reset.
    let scenario = faultline::suite::primary_failover(&config);
    model.lock().unwrap().frozen_view = true;
    let verdict = runner.run_scenario(&scenario).await;

    assert_eq!(verdict, Verdict::Fail("no view change detected".into()));
    // Cleanup restored the faulted primary despite the failure.
    assert!(!model.lock().unwrap().malicious.contains("node1"));
}

// ============================================================================
// Leader locator (crash-fault variant)
// ============================================================================

async fn spawn_status_node(id: u32, state: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind node");
    let addr = listener.local_addr().expect("node addr");

    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |_req: Request<Incoming>| async move {
                    let body =
                        serde_json::json!({ "id": id, "state": state, "term": 3 });
                    Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(
                        serde_json::to_vec(&body).unwrap(),
                    ))))
                });
                let _ = hyper::server::conn::http1::Builder::new()
                    .serve_connection(io, service)
                    .await;
            });
        }
    });

    addr
}

#[tokio::test]
async fn locator_returns_the_self_reported_leader() {
    let follower_a = spawn_status_node(0, "Follower").await;
    let leader = spawn_status_node(1, "Leader").await;
    let follower_b = spawn_status_node(2, "Follower").await;

    let locator = LeaderLocator::new(
        vec![
            NodeEndpoint { id: 0, addr: follower_a.to_string() },
            NodeEndpoint { id: 1, addr: leader.to_string() },
            NodeEndpoint { id: 2, addr: follower_b.to_string() },
        ],
        Duration::from_millis(200),
    );

    assert_eq!(locator.find_leader().await, Some(1));
}

#[tokio::test]
async fn deposing_stops_exactly_the_current_leader() {
    use std::cell::RefCell;

    use async_trait::async_trait;
    use faultline::{ClientResult, ProcessControl};

    /// Records stop requests instead of touching real processes.
    struct RecordingProcessControl {
        stopped: RefCell<Vec<u32>>,
    }

    #[async_trait(?Send)]
    impl ProcessControl for RecordingProcessControl {
        async fn start_node(&self, _index: u32) -> ClientResult<()> {
            Ok(())
        }

        async fn stop_node(&self, index: u32) -> ClientResult<()> {
            self.stopped.borrow_mut().push(index);
            Ok(())
        }
    }

    let follower = spawn_status_node(0, "Follower").await;
    let leader = spawn_status_node(1, "Leader").await;

    let locator = LeaderLocator::new(
        vec![
            NodeEndpoint { id: 0, addr: follower.to_string() },
            NodeEndpoint { id: 1, addr: leader.to_string() },
        ],
        Duration::from_millis(200),
    );
    let control = RecordingProcessControl {
        stopped: RefCell::new(Vec::new()),
    };

    assert_eq!(locator.depose_leader(&control).await, Some(1));
    assert_eq!(*control.stopped.borrow(), vec![1]);
}

#[tokio::test]
async fn locator_reports_none_when_all_endpoints_are_down() {
    // Ports with nothing listening behind them.
    let a = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let b = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let (addr_a, addr_b) = (a.local_addr().unwrap(), b.local_addr().unwrap());
    drop((a, b));

    let locator = LeaderLocator::new(
        vec![
            NodeEndpoint { id: 0, addr: addr_a.to_string() },
            NodeEndpoint { id: 1, addr: addr_b.to_string() },
        ],
        Duration::from_millis(100),
    );

    assert_eq!(locator.find_leader().await, None);
    assert_eq!(
        locator
            .wait_for_leader(Duration::from_millis(50), Duration::from_millis(20))
            .await,
        None
    );
}

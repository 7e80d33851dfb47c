//! Best-effort fault injection.
//!
//! Injection is deliberately non-fatal: a scenario asserting resilience to a
//! faulty node must not itself fail because the injection call hit a
//! transient network hiccup. A persistently failing injection surfaces
//! through the scenario's own outcome assertions instead.

use std::rc::Rc;
use std::time::Duration;

use tokio::time::sleep;

use crate::client::ControlPlane;
use crate::types::{NodeId, NodeMode};

/// Requests behavioral mode changes on cluster nodes.
pub struct FaultInjector<C> {
    client: Rc<C>,
    settle_delay: Duration,
}

impl<C: ControlPlane> FaultInjector<C> {
    /// Create an injector that waits `settle_delay` after each successful
    /// mode change, giving the cluster time to converge on the new mode.
    pub fn new(client: Rc<C>, settle_delay: Duration) -> Self {
        Self {
            client,
            settle_delay,
        }
    }

    /// Request `mode` for `node`.
    ///
    /// Failure is logged and absorbed; success is followed by the settle
    /// delay before returning.
    pub async fn apply(&self, node: &NodeId, mode: NodeMode) {
        match self.client.set_node_mode(node, mode).await {
            Ok(()) => {
                tracing::info!("configured {node} as {mode}");
                sleep(self.settle_delay).await;
            }
            Err(e) => {
                tracing::warn!("could not configure {node} as {mode}: {e}");
            }
        }
    }
}

//! Polling-based observation of cluster state.
//!
//! [`StateObserver`] reads ledger length and current view through the control
//! plane, fail-soft: an unreadable poll reports 0, which callers must treat
//! as "not yet progressed", never as a hard failure by itself.
//!
//! [`StateObserver::wait_until`] is the bounded polling primitive the whole
//! harness is built on: it detects both "a view change occurred" and "a block
//! committed" without coupling to the cluster's internal timing.

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::client::ControlPlane;
use crate::types::ClusterStatus;

/// Observer over cluster-visible state.
pub struct StateObserver<C> {
    client: Rc<C>,
    poll_interval: Duration,
}

impl<C: ControlPlane> StateObserver<C> {
    /// Create an observer polling at `poll_interval`.
    pub fn new(client: Rc<C>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    /// Observed chain height, 0 when unreadable.
    pub async fn ledger_length(&self) -> u64 {
        match self.client.ledger_length().await {
            Ok(len) => len,
            Err(e) => {
                tracing::debug!("ledger read failed, treating as 0: {e}");
                0
            }
        }
    }

    /// Current view/term, 0 when unreadable.
    pub async fn view(&self) -> u64 {
        match self.client.status().await {
            Ok(status) => status.view,
            Err(e) => {
                tracing::debug!("status read failed, treating view as 0: {e}");
                0
            }
        }
    }

    /// Fresh status snapshot, when readable.
    pub async fn status(&self) -> Option<ClusterStatus> {
        self.client.status().await.ok()
    }

    /// True once the observed view exceeds `baseline`.
    pub async fn view_advanced(&self, baseline: u64) -> bool {
        self.view().await > baseline
    }

    /// True once the observed chain height exceeds `baseline`.
    pub async fn height_advanced(&self, baseline: u64) -> bool {
        self.ledger_length().await > baseline
    }

    /// Poll `predicate` against freshly read state until it holds or
    /// `timeout` elapses.
    ///
    /// Returns true on the first tick the predicate holds, false once the
    /// deadline passes without it ever holding. Total blocking time is
    /// bounded by `timeout` plus one poll interval. This is a cooperative
    /// retry loop, not a background task: the caller blocks for its duration
    /// and there is no cancellation beyond the timeout itself.
    pub async fn wait_until<F, Fut>(&self, mut predicate: F, timeout: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if predicate().await {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(self.poll_interval).await;
        }
    }
}

//! Harness configuration.
//!
//! Every timing constant in the harness lives here as a named, tunable field.
//! Fixed sleeps are a deliberate trade of test speed for determinism; keeping
//! them in one place lets a suite tighten or replace them without touching
//! scenario logic.

use std::time::Duration;

/// Default target when no base URL override is given.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Configuration for a harness run.
///
/// Built with chainable setters:
///
/// ```
/// use std::time::Duration;
/// use faultline::HarnessConfig;
///
/// let config = HarnessConfig::new("http://localhost:8080")
///     .view_change_timeout(Duration::from_secs(30))
///     .poll_interval(Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base URL of the cluster control plane.
    pub base_url: String,
    /// Timeout applied to each individual control-plane call.
    pub call_timeout: Duration,
    /// Timeout for the reset call, which fans out to every node.
    pub reset_timeout: Duration,
    /// Pause after a successful mode change, letting the cluster converge
    /// before the next step is evaluated.
    pub settle_delay: Duration,
    /// Pause after a reset for state synchronization across nodes.
    pub reset_sync_delay: Duration,
    /// Flat wait for a commit that is expected to succeed promptly
    /// (quorum-tolerance scenarios).
    pub commit_wait: Duration,
    /// Pause between consecutive submits in the chain-integrity scenario.
    pub inter_submit_delay: Duration,
    /// Bound on detecting a view change after the primary is faulted.
    pub view_change_timeout: Duration,
    /// Bound on the first commit after a detected view change.
    pub post_failover_commit_timeout: Duration,
    /// Cadence of the bounded polling loop.
    pub poll_interval: Duration,
    /// Per-node timeout when probing for a self-reported leader.
    pub leader_probe_timeout: Duration,
}

impl HarnessConfig {
    /// Create a configuration targeting `base_url` with default timings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            call_timeout: Duration::from_secs(2),
            reset_timeout: Duration::from_secs(5),
            settle_delay: Duration::from_millis(500),
            reset_sync_delay: Duration::from_secs(2),
            commit_wait: Duration::from_secs(2),
            inter_submit_delay: Duration::from_secs(1),
            view_change_timeout: Duration::from_secs(20),
            post_failover_commit_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(1),
            leader_probe_timeout: Duration::from_millis(200),
        }
    }

    /// Set the per-call timeout.
    pub fn call_timeout(mut self, d: Duration) -> Self {
        self.call_timeout = d;
        self
    }

    /// Set the settle delay applied after a successful fault injection.
    pub fn settle_delay(mut self, d: Duration) -> Self {
        self.settle_delay = d;
        self
    }

    /// Set the post-reset synchronization delay.
    pub fn reset_sync_delay(mut self, d: Duration) -> Self {
        self.reset_sync_delay = d;
        self
    }

    /// Set the flat wait used where a prompt commit is the expectation.
    pub fn commit_wait(mut self, d: Duration) -> Self {
        self.commit_wait = d;
        self
    }

    /// Set the pause between consecutive submits.
    pub fn inter_submit_delay(mut self, d: Duration) -> Self {
        self.inter_submit_delay = d;
        self
    }

    /// Set the bound on view-change detection.
    pub fn view_change_timeout(mut self, d: Duration) -> Self {
        self.view_change_timeout = d;
        self
    }

    /// Set the bound on the first post-failover commit.
    pub fn post_failover_commit_timeout(mut self, d: Duration) -> Self {
        self.post_failover_commit_timeout = d;
        self
    }

    /// Set the polling cadence.
    pub fn poll_interval(mut self, d: Duration) -> Self {
        self.poll_interval = d;
        self
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

//! Error types for the faultline harness.
//!
//! All recoverable failures are absorbed at the [`ControlPlane`] boundary and
//! surface as typed values the caller must handle. Only startup
//! unreachability is allowed to terminate the process.
//!
//! [`ControlPlane`]: crate::client::ControlPlane

use thiserror::Error;

/// Errors produced by a single control-plane call.
///
/// Transport and decode failures are deliberately equivalent: during a fault
/// scenario the cluster under test is expected to be flaky, and a single bad
/// call must never abort a scenario.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The per-call timeout elapsed before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure (refused, reset, DNS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The control plane answered with a non-success status.
    #[error("unexpected HTTP status: {0}")]
    Http(u16),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request could not be constructed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Harness-level errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The target control plane could not be reached before any scenario ran.
    ///
    /// This is the one fatal condition: the process exits nonzero without
    /// running scenarios.
    #[error("control plane unreachable at {url}: {source}")]
    Unreachable {
        /// Target base URL that failed the startup probe.
        url: String,
        /// Underlying call failure.
        source: ClientError,
    },
}

/// Result alias for control-plane calls.
pub type ClientResult<T> = Result<T, ClientError>;

//! Client request submission.

use std::rc::Rc;

use crate::client::ControlPlane;

/// Submits client write requests into the cluster.
///
/// No retry lives here: retry-after-failover is a scenario-level concern,
/// because only the scenario knows whether a resubmission is meaningful.
pub struct RequestDriver<C> {
    client: Rc<C>,
}

impl<C: ControlPlane> RequestDriver<C> {
    /// Create a driver over the shared control-plane client.
    pub fn new(client: Rc<C>) -> Self {
        Self { client }
    }

    /// Submit one write request.
    ///
    /// True iff the control plane accepted the request for processing.
    /// Commitment is verified separately through the observer.
    pub async fn submit(&self) -> bool {
        match self.client.submit_request().await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("request submission rejected: {e}");
                false
            }
        }
    }
}

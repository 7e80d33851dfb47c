//! Scenario definition and the orchestration core.
//!
//! A [`Scenario`] is a named, ordered list of [`ScenarioStep`]s plus an
//! expected-outcome description, constructed once at suite-definition time
//! and executed top-to-bottom with no backtracking. [`ScenarioRunner`]
//! sequences fault injection, request submission, and bounded-time polling
//! assertions, producing one [`Verdict`] per scenario.
//!
//! Scenarios are independent but run sequentially: they share the single
//! external cluster as mutable state, and each starts from a reset. A failed
//! scenario never aborts the suite.

use std::rc::Rc;
use std::time::Duration;

use tokio::time::sleep;

use crate::client::ControlPlane;
use crate::config::HarnessConfig;
use crate::driver::RequestDriver;
use crate::fault::FaultInjector;
use crate::observer::StateObserver;
use crate::report::{Level, Reporter, SuiteReport};
use crate::types::{NodeId, NodeMode};

/// Predicate evaluated against freshly read state on each polling tick,
/// relative to the baseline captured by [`ScenarioStep::RecordBaseline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The current view strictly exceeds the baseline view.
    ViewAdvanced,
    /// The observed chain height strictly exceeds the baseline height.
    HeightAdvanced,
}

/// One step of a scenario.
#[derive(Debug, Clone)]
pub enum ScenarioStep {
    /// Reset the cluster and wait for state synchronization. Failure skips
    /// the scenario: nothing meaningful can be asserted against an unknown
    /// starting state.
    Reset,
    /// Capture the current view and chain height as the scenario baseline.
    RecordBaseline,
    /// Request a behavioral mode for one node (best-effort, settle delay on
    /// success).
    SetMode {
        /// Target node.
        node: NodeId,
        /// Requested mode.
        mode: NodeMode,
    },
    /// Submit one client write request.
    Submit {
        /// When set, a rejected submission is terminal with this reason.
        /// When `None` the submission is fire-and-forget (e.g. a request
        /// expected to be dropped by a faulty primary).
        reject_reason: Option<String>,
    },
    /// Flat sleep. Used where the expected outcome is a prompt single
    /// commit; bounded polling is reserved for steps whose timing is the
    /// thing under test.
    Settle(Duration),
    /// Bounded polling wait. Timeout is terminal with the given reason.
    WaitFor {
        /// Predicate to poll.
        probe: Probe,
        /// Wait bound.
        timeout: Duration,
        /// Verdict reason when the bound elapses first.
        timeout_reason: String,
    },
    /// Assert the observed chain height equals `expected`.
    ExpectHeight {
        /// Expected number of committed entries.
        expected: u64,
        /// Human-readable assertion label for pass/fail lines.
        label: String,
    },
}

/// A named, ordered sequence of steps with unconditional cleanup.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario name, used in banners and the suite summary.
    pub name: String,
    /// Expected-outcome description.
    pub expectation: String,
    /// Theory lines printed before acting (quorum math, mechanism).
    pub theory: Vec<String>,
    /// Steps executed strictly in order.
    pub steps: Vec<ScenarioStep>,
    /// Mode restorations applied exactly once after the steps, regardless of
    /// verdict. Failures here are reported, not fatal.
    pub cleanup: Vec<(NodeId, NodeMode)>,
}

/// Outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every step completed and every assertion held.
    Pass,
    /// An assertion was unmet or a terminal step failed.
    Fail(String),
    /// The scenario could not run (reset failed before any assertion).
    Skipped(String),
}

#[derive(Debug, Clone, Copy, Default)]
struct Baseline {
    view: u64,
    height: u64,
}

/// Executes scenarios against the external cluster.
pub struct ScenarioRunner<C> {
    injector: FaultInjector<C>,
    driver: RequestDriver<C>,
    observer: StateObserver<C>,
    client: Rc<C>,
    reporter: Reporter,
    reset_sync_delay: Duration,
}

impl<C: ControlPlane> ScenarioRunner<C> {
    /// Build a runner over a shared control-plane client.
    pub fn new(client: Rc<C>, config: &HarnessConfig, reporter: Reporter) -> Self {
        Self {
            injector: FaultInjector::new(client.clone(), config.settle_delay),
            driver: RequestDriver::new(client.clone()),
            observer: StateObserver::new(client.clone(), config.poll_interval),
            client,
            reporter,
            reset_sync_delay: config.reset_sync_delay,
        }
    }

    /// Run every scenario in order, recording one verdict each.
    ///
    /// The runner always proceeds to the next scenario after recording a
    /// verdict; scenarios reset cluster state independently.
    pub async fn run_suite(&self, scenarios: &[Scenario]) -> SuiteReport {
        let mut report = SuiteReport::default();
        for scenario in scenarios {
            let verdict = self.run_scenario(scenario).await;
            report.record(scenario.name.clone(), verdict);
        }
        self.reporter.summary(&report);
        report
    }

    /// Execute one scenario: steps in declared order, each completing before
    /// the next begins, then unconditional cleanup.
    pub async fn run_scenario(&self, scenario: &Scenario) -> Verdict {
        self.reporter.banner(&scenario.name);
        for line in &scenario.theory {
            self.reporter.log(Level::Theory, line);
        }
        self.reporter
            .log(Level::Info, &format!("Expected: {}", scenario.expectation));

        let mut baseline = Baseline::default();
        let mut verdict = Verdict::Pass;

        for step in &scenario.steps {
            match self.run_step(step, &mut baseline).await {
                Ok(()) => {}
                Err(v) => {
                    verdict = v;
                    break;
                }
            }
        }

        // Cleanup runs exactly once whatever the verdict; a failed restore is
        // the injector's warning, not a verdict change.
        for (node, mode) in &scenario.cleanup {
            self.injector.apply(node, *mode).await;
        }

        match &verdict {
            Verdict::Pass => self.reporter.log(Level::Pass, "scenario passed"),
            Verdict::Fail(reason) => self.reporter.log(Level::Fail, reason),
            Verdict::Skipped(reason) => self.reporter.log(Level::Warn, reason),
        }
        verdict
    }

    async fn run_step(&self, step: &ScenarioStep, baseline: &mut Baseline) -> Result<(), Verdict> {
        match step {
            ScenarioStep::Reset => match self.client.reset().await {
                Ok(()) => {
                    self.reporter.log(
                        Level::Info,
                        "system reset, waiting for state synchronization",
                    );
                    sleep(self.reset_sync_delay).await;
                    Ok(())
                }
                Err(e) => Err(Verdict::Skipped(format!("cluster reset failed: {e}"))),
            },
            ScenarioStep::RecordBaseline => {
                baseline.view = self.observer.view().await;
                baseline.height = self.observer.ledger_length().await;
                self.reporter.log(
                    Level::Info,
                    &format!(
                        "baseline: view {}, height {}",
                        baseline.view, baseline.height
                    ),
                );
                Ok(())
            }
            ScenarioStep::SetMode { node, mode } => {
                self.injector.apply(node, *mode).await;
                Ok(())
            }
            ScenarioStep::Submit { reject_reason } => {
                if self.driver.submit().await {
                    self.reporter.log(Level::Info, "client request accepted");
                    Ok(())
                } else if let Some(reason) = reject_reason {
                    Err(Verdict::Fail(reason.clone()))
                } else {
                    self.reporter
                        .log(Level::Warn, "client request rejected (best-effort submit)");
                    Ok(())
                }
            }
            ScenarioStep::Settle(duration) => {
                sleep(*duration).await;
                Ok(())
            }
            ScenarioStep::WaitFor {
                probe,
                timeout,
                timeout_reason,
            } => {
                let obs = &self.observer;
                let held = match probe {
                    Probe::ViewAdvanced => {
                        let view0 = baseline.view;
                        obs.wait_until(|| obs.view_advanced(view0), *timeout).await
                    }
                    Probe::HeightAdvanced => {
                        let height0 = baseline.height;
                        obs.wait_until(|| obs.height_advanced(height0), *timeout)
                            .await
                    }
                };
                if held {
                    let view = obs.view().await;
                    let height = obs.ledger_length().await;
                    self.reporter.log(
                        Level::Pass,
                        &format!(
                            "{} within bound: view {view}, height {height}",
                            match probe {
                                Probe::ViewAdvanced => "view change detected",
                                Probe::HeightAdvanced => "commit observed",
                            }
                        ),
                    );
                    Ok(())
                } else {
                    Err(Verdict::Fail(timeout_reason.clone()))
                }
            }
            ScenarioStep::ExpectHeight { expected, label } => {
                let found = self.observer.ledger_length().await;
                if found == *expected {
                    self.reporter.log(Level::Pass, label);
                    Ok(())
                } else {
                    Err(Verdict::Fail(format!(
                        "{label}: expected height {expected}, found {found}"
                    )))
                }
            }
        }
    }
}

//! # Faultline
//!
//! Fault-injection and verification harness for BFT and leader-election
//! consensus clusters.
//!
//! The cluster under test is a black box reached through a small control-plane
//! interface. Faultline runs scripted scenarios that configure per-node
//! behavior (honest vs. malicious), drive client write requests, and poll
//! cluster-observable state (chain height, current view, reported leader) to
//! assert safety and liveness — including forward progress after a primary
//! failover.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                   ScenarioRunner                      │
//! │   steps in order · bounded waits · verdict per run    │
//! ├──────────────┬───────────────┬────────────────────────┤
//! │ FaultInjector│ RequestDriver │     StateObserver      │
//! │  mode change │    submit     │  poll height/view,     │
//! │  best-effort │               │  wait_until(pred, T)   │
//! ├──────────────┴───────────────┴────────────────────────┤
//! │            ControlPlane (HttpControlPlane)            │
//! │    per-call timeouts, typed soft-failure results      │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! Scenarios run strictly sequentially: they share the single external
//! cluster as mutable state and each starts from a reset. The consensus
//! implementation itself — replication, quorum certificates, election — is an
//! external collaborator, never part of this crate.
//!
//! ## Quick start
//!
//! ```ignore
//! use std::rc::Rc;
//! use faultline::{default_suite, HarnessConfig, HttpControlPlane, Reporter, ScenarioRunner};
//!
//! let config = HarnessConfig::new("http://localhost:8080");
//! let client = Rc::new(HttpControlPlane::new(&config));
//! let runner = ScenarioRunner::new(client, &config, Reporter::auto());
//! let report = runner.run_suite(&default_suite(&config)).await;
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod driver;
pub mod election;
pub mod error;
pub mod fault;
pub mod observer;
pub mod report;
pub mod scenario;
pub mod suite;
pub mod types;

pub use client::{ControlPlane, HttpControlPlane};
pub use config::{HarnessConfig, DEFAULT_BASE_URL};
pub use driver::RequestDriver;
pub use election::{LeaderLocator, NodeEndpoint, NodeStatus, ProcessControl};
pub use error::{ClientError, ClientResult, HarnessError};
pub use fault::FaultInjector;
pub use observer::StateObserver;
pub use report::{Level, Reporter, SuiteReport};
pub use scenario::{Probe, Scenario, ScenarioRunner, ScenarioStep, Verdict};
pub use suite::default_suite;
pub use types::{ClusterStatus, NodeId, NodeMode};

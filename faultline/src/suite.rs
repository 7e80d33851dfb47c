//! The built-in pBFT scenario suite.
//!
//! Five scenarios against an N=5 cluster, from the all-honest happy path
//! through quorum tolerance up to a primary failover with client retry. Each
//! scenario states its theory before acting and restores every node it
//! faulted.

use crate::config::HarnessConfig;
use crate::scenario::{Probe, Scenario, ScenarioStep};
use crate::types::NodeMode;

/// Build the default suite using the configured timings.
pub fn default_suite(config: &HarnessConfig) -> Vec<Scenario> {
    vec![
        happy_path(config),
        tolerance_one_fault(config),
        tolerance_two_faults(config),
        chain_integrity(config),
        primary_failover(config),
    ]
}

/// All nodes honest: one request, one committed block.
pub fn happy_path(config: &HarnessConfig) -> Scenario {
    Scenario {
        name: "TC-01 happy path (all nodes honest)".into(),
        expectation: "one client request commits exactly one block".into(),
        theory: vec![],
        steps: vec![
            ScenarioStep::Reset,
            ScenarioStep::Submit {
                reject_reason: Some("client request rejected".into()),
            },
            ScenarioStep::Settle(config.commit_wait),
            ScenarioStep::ExpectHeight {
                expected: 1,
                label: "consensus reached, block #1 committed".into(),
            },
        ],
        cleanup: vec![],
    }
}

/// One malicious node out of five: the strong quorum still holds.
pub fn tolerance_one_fault(config: &HarnessConfig) -> Scenario {
    Scenario {
        name: "TC-02 resilience level 1 (1 malicious)".into(),
        expectation: "the cluster commits despite one malicious node".into(),
        theory: vec![
            "Config: N=5, f=1. Quorum = 3f+1 = 4.".into(),
            "Scenario: 4 honest nodes >= 4 required. System should work.".into(),
        ],
        steps: vec![
            ScenarioStep::Reset,
            ScenarioStep::SetMode {
                node: "node5".into(),
                mode: NodeMode::Malicious,
            },
            ScenarioStep::Submit {
                reject_reason: None,
            },
            ScenarioStep::Settle(config.commit_wait),
            ScenarioStep::ExpectHeight {
                expected: 1,
                label: "survived 1 malicious node (strong quorum met)".into(),
            },
        ],
        cleanup: vec![("node5".into(), NodeMode::Honest)],
    }
}

/// Two malicious nodes out of five, the benign boundary case.
///
/// The theory text is the claim under test, not a proven guarantee: the
/// harness asserts the observed outcome for benign faults only and says
/// nothing about adversarial behavior at f=2.
pub fn tolerance_two_faults(config: &HarnessConfig) -> Scenario {
    Scenario {
        name: "TC-03 resilience level 2 (2 malicious)".into(),
        expectation: "the cluster still commits with two benign-faulty nodes".into(),
        theory: vec![
            "Config: N=5. Standard quorum = 3.".into(),
            "Scenario: 2 malicious -> 3 honest left.".into(),
            "Analysis: 3 honest >= quorum 3. System should survive (benign case).".into(),
        ],
        steps: vec![
            ScenarioStep::Reset,
            ScenarioStep::SetMode {
                node: "node4".into(),
                mode: NodeMode::Malicious,
            },
            ScenarioStep::SetMode {
                node: "node5".into(),
                mode: NodeMode::Malicious,
            },
            ScenarioStep::Submit {
                reject_reason: None,
            },
            ScenarioStep::Settle(config.commit_wait),
            ScenarioStep::ExpectHeight {
                expected: 1,
                label: "survived 2 faults (redundancy advantage of N=5)".into(),
            },
        ],
        cleanup: vec![
            ("node4".into(), NodeMode::Honest),
            ("node5".into(), NodeMode::Honest),
        ],
    }
}

/// Three consecutive requests grow the chain to exactly three blocks.
pub fn chain_integrity(config: &HarnessConfig) -> Scenario {
    let mut steps = vec![ScenarioStep::Reset];
    for _ in 0..3 {
        steps.push(ScenarioStep::Submit {
            reject_reason: None,
        });
        steps.push(ScenarioStep::Settle(config.inter_submit_delay));
    }
    steps.push(ScenarioStep::Settle(config.inter_submit_delay));
    steps.push(ScenarioStep::ExpectHeight {
        expected: 3,
        label: "chain grew to 3 blocks in order".into(),
    });

    Scenario {
        name: "TC-04 chain integrity and continuity".into(),
        expectation: "three submits yield exactly three blocks".into(),
        theory: vec![],
        steps,
        cleanup: vec![],
    }
}

/// Fault the primary, require a view change, retry the request against the
/// new primary, and require a commit to follow.
///
/// Failover is a hard liveness requirement: no detected view change within
/// the bound is terminal. The retry models a client that cannot know whether
/// its original request reached the now-deposed primary.
pub fn primary_failover(config: &HarnessConfig) -> Scenario {
    Scenario {
        name: "TC-05 primary malicious (view change)".into(),
        expectation: "view change within bound, then a commit from the new primary".into(),
        theory: vec![
            "Scenario: primary (node1) is malicious/silent.".into(),
            "Mechanism: replicas time out, elect a new primary, client retries.".into(),
        ],
        steps: vec![
            ScenarioStep::Reset,
            ScenarioStep::RecordBaseline,
            ScenarioStep::SetMode {
                node: "node1".into(),
                mode: NodeMode::Malicious,
            },
            // Expected to be silently dropped by the faulty primary.
            ScenarioStep::Submit {
                reject_reason: None,
            },
            ScenarioStep::WaitFor {
                probe: Probe::ViewAdvanced,
                timeout: config.view_change_timeout,
                timeout_reason: "no view change detected".into(),
            },
            ScenarioStep::Submit {
                reject_reason: Some("new leader rejected retried request".into()),
            },
            ScenarioStep::WaitFor {
                probe: Probe::HeightAdvanced,
                timeout: config.post_failover_commit_timeout,
                timeout_reason: "view changed but no commit followed".into(),
            },
        ],
        cleanup: vec![("node1".into(), NodeMode::Honest)],
    }
}

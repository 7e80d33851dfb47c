//! Binary entry point: run the built-in suite against a target cluster.
//!
//! The single optional argument overrides the target base URL. Exit code is 0
//! once the suite completes, whatever the per-scenario verdicts; only an
//! unreachable target at startup exits nonzero.

use std::process;
use std::rc::Rc;

use faultline::{
    default_suite, HarnessConfig, HarnessError, HttpControlPlane, Level, Reporter, ScenarioRunner,
    ControlPlane, DEFAULT_BASE_URL,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let config = HarnessConfig::new(&base_url);
    let reporter = Reporter::auto();

    reporter.log(Level::Info, &format!("target: {base_url}"));
    println!("{}", "-".repeat(60));

    let client = Rc::new(HttpControlPlane::new(&config));
    if let Err(source) = client.probe().await {
        let err = HarnessError::Unreachable {
            url: base_url,
            source,
        };
        reporter.log(Level::Fail, &format!("{err} — start the cluster first"));
        process::exit(1);
    }

    let runner = ScenarioRunner::new(client, &config, reporter);
    runner.run_suite(&default_suite(&config)).await;
}

//! Leveled terminal reporting and the final suite summary.
//!
//! Purely presentational: the reporter renders what the runner already
//! decided. Color is explicit state chosen at construction (TTY + `NO_COLOR`
//! by default), never a process-wide global.

use std::fmt;
use std::io::IsTerminal;

use crate::scenario::Verdict;

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const BLUE: &str = "\x1b[34m";
    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Severity/kind of a reported line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Progress narration.
    Info,
    /// A satisfied assertion.
    Pass,
    /// An unmet assertion or terminal step failure.
    Fail,
    /// Non-fatal anomaly (injection/cleanup hiccup).
    Warn,
    /// Expected quorum math / mechanism, printed before acting.
    Theory,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Pass => "PASS",
            Level::Fail => "FAIL",
            Level::Warn => "WARN",
            Level::Theory => "THEORY",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Level::Info => ansi::BLUE,
            Level::Pass => ansi::GREEN,
            Level::Fail => ansi::RED,
            Level::Warn => ansi::YELLOW,
            Level::Theory => ansi::CYAN,
        }
    }
}

/// Renders leveled log lines and scenario banners to stdout.
pub struct Reporter {
    color: bool,
}

impl Reporter {
    /// Create a reporter with color explicitly on or off.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Create a reporter that colors output only on a TTY without `NO_COLOR`.
    pub fn auto() -> Self {
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self::new(color)
    }

    /// Print one leveled line.
    pub fn log(&self, level: Level, msg: &str) {
        if self.color {
            println!("[{}{}{}] {msg}", level.color(), level.label(), ansi::RESET);
        } else {
            println!("[{}] {msg}", level.label());
        }
    }

    /// Print a scenario banner.
    pub fn banner(&self, text: &str) {
        if self.color {
            println!("\n{}=== {text} ==={}", ansi::MAGENTA, ansi::RESET);
        } else {
            println!("\n=== {text} ===");
        }
    }

    /// Print the suite-completion rule and summary.
    pub fn summary(&self, report: &SuiteReport) {
        println!("{}", "-".repeat(60));
        if self.color {
            print!("{}{report}{}", ansi::BOLD, ansi::RESET);
        } else {
            print!("{report}");
        }
    }
}

/// Ordered per-scenario verdicts for one suite run.
#[derive(Debug, Default)]
pub struct SuiteReport {
    verdicts: Vec<(String, Verdict)>,
}

impl SuiteReport {
    /// Record the verdict of one scenario, in execution order.
    pub fn record(&mut self, scenario: impl Into<String>, verdict: Verdict) {
        self.verdicts.push((scenario.into(), verdict));
    }

    /// All recorded verdicts in execution order.
    pub fn verdicts(&self) -> &[(String, Verdict)] {
        &self.verdicts
    }

    /// Number of passed scenarios.
    pub fn passed(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Pass))
    }

    /// Number of failed scenarios.
    pub fn failed(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Fail(_)))
    }

    /// Number of skipped scenarios.
    pub fn skipped(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Skipped(_)))
    }

    fn count(&self, pred: impl Fn(&Verdict) -> bool) -> usize {
        self.verdicts.iter().filter(|(_, v)| pred(v)).count()
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SUITE COMPLETED.")?;
        writeln!(
            f,
            "Scenarios: {} ({} passed, {} failed, {} skipped)",
            self.verdicts.len(),
            self.passed(),
            self.failed(),
            self.skipped()
        )?;
        for (name, verdict) in &self.verdicts {
            match verdict {
                Verdict::Pass => writeln!(f, "  PASS {name}")?,
                Verdict::Fail(reason) => writeln!(f, "  FAIL {name}: {reason}")?,
                Verdict::Skipped(reason) => writeln!(f, "  SKIP {name}: {reason}")?,
            }
        }
        Ok(())
    }
}

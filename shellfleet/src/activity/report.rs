//! Per-target outcomes and the run report.

use std::fmt;
use std::path::PathBuf;

/// How far one target got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    ConnectFailed,
    LoginFailed,
    EscalationFailed,
    CommandError,
    LogoutError,
    Success,
}

impl Outcome {
    /// Whether every step succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Outcome::ConnectFailed => "connect-failed",
            Outcome::LoginFailed => "login-failed",
            Outcome::EscalationFailed => "escalation-failed",
            Outcome::CommandError => "command-error",
            Outcome::LogoutError => "logout-error",
            Outcome::Success => "success",
        };
        f.write_str(name)
    }
}

/// Outcome of one visited target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub target: String,
    pub outcome: Outcome,
}

/// Everything a run did, in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per visited target.
    pub targets: Vec<TargetReport>,

    /// Set when the run stopped early on an interrupt.
    pub cancelled: bool,

    /// Output files created by the run, in creation order.
    pub output_files: Vec<PathBuf>,
}

impl RunReport {
    pub(crate) fn record(&mut self, target: &str, outcome: Outcome) {
        self.targets.push(TargetReport {
            target: target.to_string(),
            outcome,
        });
    }

    /// Outcome for `target`, if it was visited.
    pub fn outcome(&self, target: &str) -> Option<Outcome> {
        self.targets
            .iter()
            .find(|r| r.target == target)
            .map(|r| r.outcome)
    }

    /// Number of targets that fully succeeded.
    pub fn succeeded(&self) -> usize {
        self.targets.iter().filter(|r| r.outcome.is_success()).count()
    }

    /// Number of targets with any non-success outcome.
    pub fn failed(&self) -> usize {
        self.targets.len() - self.succeeded()
    }
}

//! The activity engine: visits every target in order.

use std::io::Write;

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::{Activity, Outcome, RunReport};
use crate::channel::{ShellChannel, ShellFactory};
use crate::driver::{DeviceSession, SessionTiming};
use crate::error::{Error, Result, SinkError};
use crate::platform::PromptSet;
use crate::sink::{LogSink, OutputRouter};

const CLOSING_DELIMITER: &str = "\n--------------------------------------------------\n";

/// Runs activities, one target at a time.
///
/// A failure at one target only degrades that target's [`Outcome`]. The
/// run itself fails only when a log or output destination cannot be
/// created or written.
pub struct Orchestrator<F: ShellFactory> {
    factory: F,
    timing: SessionTiming,
    prompts: PromptSet,
    cancel: CancellationToken,
}

impl<F: ShellFactory> Orchestrator<F> {
    /// Create an orchestrator building each target's channel with `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            timing: SessionTiming::default(),
            prompts: PromptSet::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the settle intervals used by every session.
    pub fn with_timing(mut self, timing: SessionTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set the prompt markers used by every session.
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Stop starting new targets once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that interrupts the run when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run `activity` against each of its targets.
    ///
    /// Both sinks are opened before any target is attempted. An interrupt
    /// is honored between targets; the sinks are still closed in order.
    /// When a sink fails mid-run the open session and both sinks are
    /// closed before the error is returned.
    pub async fn run(&self, activity: &Activity) -> Result<RunReport> {
        let mut log = LogSink::open(activity.log_dir.as_deref(), &activity.name)?;
        let mut output = OutputRouter::open(activity.sink_policy(), &activity.name)?;

        info!(
            "Starting activity {} on {} target(s)",
            activity.name,
            activity.targets.len()
        );

        let mut report = RunReport::default();
        if let Err(e) = self
            .visit_all(activity, &mut log, &mut output, &mut report)
            .await
        {
            abandon(log, output, &e);
            return Err(e);
        }

        log.line("Finished activity")?;
        report.output_files = output.files().to_vec();
        output.close()?;
        log.line("END")?;
        log.close()?;

        info!(
            "Activity {} finished: {} succeeded, {} failed",
            activity.name,
            report.succeeded(),
            report.failed()
        );
        Ok(report)
    }

    async fn visit_all(
        &self,
        activity: &Activity,
        log: &mut LogSink,
        output: &mut OutputRouter,
        report: &mut RunReport,
    ) -> Result<()> {
        log.line(&format!("Starting activity {}", activity.name))?;

        for target in &activity.targets {
            if self.cancel.is_cancelled() {
                log.line("Activity interrupted")?;
                report.cancelled = true;
                break;
            }

            let outcome = self.visit(activity, target, log, output).await?;
            log.line(&format!("Finished target {} ({})", target, outcome))?;
            report.record(target, outcome);
        }
        Ok(())
    }

    async fn visit(
        &self,
        activity: &Activity,
        target: &str,
        log: &mut LogSink,
        output: &mut OutputRouter,
    ) -> Result<Outcome> {
        let mut session = DeviceSession::new(
            target,
            self.factory.create(),
            activity.kind,
            activity.credential.clone(),
        )
        .with_timing(self.timing)
        .with_prompts(self.prompts.clone());

        if let Err(e) = session.connect().await {
            log.failure(&format!(
                "Unable to connect to {}: {}. Test with a local SSH session.",
                target, e
            ))?;
            return Ok(Outcome::ConnectFailed);
        }

        let result = drive(&mut session, activity, target, log, output).await;
        if result.is_err() {
            session.close().await;
        }
        result
    }
}

/// Everything after a successful connect: login, escalation, the output
/// block and logout.
async fn drive<C: ShellChannel>(
    session: &mut DeviceSession<C>,
    activity: &Activity,
    target: &str,
    log: &mut LogSink,
    output: &mut OutputRouter,
) -> Result<Outcome> {
    log.line(&format!("Connected to {}", target))?;

    if let Err(e) = session.login().await {
        session.close().await;
        log.failure(&format!("Unable to login to {}: {}", target, e))?;
        return Ok(Outcome::LoginFailed);
    }

    if let Some(password) = &activity.escalation_password {
        if let Err(e) = session.escalate(password).await {
            log.failure(&format!("Unable to superuser at {}: {}", target, e))?;
            if let Err(e) = session.logout().await {
                warn!("{}: logout after failed escalation: {}", target, e);
            }
            return Ok(Outcome::EscalationFailed);
        }
        log.line(&format!("Superuser at {}", target))?;
    }

    let mut outcome = capture(session, activity, target, log, output).await?;

    if let Err(e) = session.logout().await {
        log.failure(&format!("ERROR while logging out of {}: {}", target, e))?;
        if outcome == Outcome::Success {
            outcome = Outcome::LogoutError;
        }
    }

    output.end_target()?;
    Ok(outcome)
}

/// Write one delimited output block for `target`.
///
/// Returns `CommandError` when the command phase stops early; only sink
/// failures are returned as errors.
async fn capture<C: ShellChannel>(
    session: &mut DeviceSession<C>,
    activity: &Activity,
    target: &str,
    log: &mut LogSink,
    output: &mut OutputRouter,
) -> Result<Outcome> {
    output.begin_target(target)?;
    write_block(output, &format!("\n----------------{}--------------\n", target))?;

    let outcome = match session.run_commands(&activity.commands, output).await {
        Ok(()) => Outcome::Success,
        Err(e @ Error::Sink(_)) => return Err(e),
        Err(e) => {
            log.failure(&format!("ERROR while running the commands at {}: {}", target, e))?;
            Outcome::CommandError
        }
    };

    write_block(output, CLOSING_DELIMITER)?;
    Ok(outcome)
}

/// Best-effort shutdown after a failed run: close the output, record why,
/// finish the log.
fn abandon(mut log: LogSink, output: OutputRouter, error: &Error) {
    if let Err(e) = output.close() {
        debug!("Closing output after abort: {}", e);
    }
    if let Err(e) = log.failure(&format!("Activity aborted: {}", error)) {
        debug!("Logging abort: {}", e);
    }
    if let Err(e) = log.line("END") {
        debug!("Logging abort: {}", e);
    }
    if let Err(e) = log.close() {
        debug!("Closing log after abort: {}", e);
    }
}

fn write_block(output: &mut OutputRouter, text: &str) -> Result<()> {
    output
        .write_all(text.as_bytes())
        .and_then(|()| output.flush())
        .map_err(|source| SinkError::Write {
            kind: "output",
            source,
        })?;
    Ok(())
}

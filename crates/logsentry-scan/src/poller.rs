//! Retry/backoff state machine for asynchronous remote scan jobs.
//!
//! ```text
//! Submitted -> Polling { attempt } -> Confirmed | TimedOut | Errored | Cancelled
//! ```
//!
//! After submission the poller waits `initial_delay`, then queries the job
//! up to `max_attempts` times. A failed query counts as an attempt and is
//! otherwise ignored. Between attempts it sleeps
//! `min(base^(attempt + 1) s, cap)`. Every non-confirmed ending produces a
//! verdict with `is_clean == false`.

use std::time::Duration;

use logsentry_core::{ClientError, PollConfig, ScanVerdict};
use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{ScanClient, ScanTicket};

/// Message of the verdict produced when the attempt budget runs out.
pub(crate) const TIMED_OUT_MESSAGE: &str = "Virus scan timed out.";

/// Message of the verdict produced when the poll is cancelled.
pub(crate) const CANCELLED_MESSAGE: &str = "Virus scan cancelled.";

/// Where a scan job currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PollState {
    /// Not yet submitted.
    Idle,
    /// Job accepted by the remote service.
    Submitted(ScanTicket),
    /// Querying job status; `attempt` is 0-based.
    Polling { attempt: u32 },
    /// The job finished and produced a report.
    Confirmed(ScanVerdict),
    /// Every attempt ran without the job leaving the queue.
    TimedOut,
    /// Submission or the surrounding flow failed.
    Errored(String),
    /// The caller's cancellation token fired during a wait.
    Cancelled,
}

impl PollState {
    /// Check if no further transitions can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Confirmed(_) | Self::TimedOut | Self::Errored(_) | Self::Cancelled
        )
    }

    /// Verdict for a terminal state. Non-terminal states fail closed.
    pub fn verdict(&self) -> ScanVerdict {
        match self {
            Self::Confirmed(verdict) => verdict.clone(),
            Self::TimedOut => ScanVerdict::unsafe_with(TIMED_OUT_MESSAGE),
            Self::Errored(details) => {
                ScanVerdict::unsafe_with(format!("Virus scan failed: {details}"))
            }
            Self::Cancelled => ScanVerdict::unsafe_with(CANCELLED_MESSAGE),
            Self::Idle | Self::Submitted(_) | Self::Polling { .. } => {
                ScanVerdict::unsafe_with("Virus scan did not complete.")
            }
        }
    }
}

/// Drives one scan job from submission to a terminal state.
pub struct ScanPoller<'a> {
    client: &'a dyn ScanClient,
    config: &'a PollConfig,
    cancel: Option<&'a CancellationToken>,
    state: PollState,
    attempts: u32,
}

impl<'a> ScanPoller<'a> {
    /// Create a poller for one job.
    pub fn new(client: &'a dyn ScanClient, config: &'a PollConfig) -> Self {
        Self {
            client,
            config,
            cancel: None,
            state: PollState::Idle,
            attempts: 0,
        }
    }

    /// Abort waits when the token is cancelled.
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Current state.
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Number of status queries issued so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Submit the bytes and poll until the job reaches a terminal state.
    pub async fn run(&mut self, bytes: &[u8], filename: &str) -> ScanVerdict {
        let state = self.drive(bytes, filename).await;
        self.transition(state);
        self.state.verdict()
    }

    async fn drive(&mut self, bytes: &[u8], filename: &str) -> PollState {
        if filename.chars().count() > self.config.max_filename_len {
            let err = ClientError::InvalidFilename {
                max: self.config.max_filename_len,
            };
            return PollState::Errored(err.to_string());
        }

        let ticket = match self.client.submit(bytes, filename).await {
            Ok(ticket) => ticket,
            Err(err) => return PollState::Errored(err.to_string()),
        };
        self.transition(PollState::Submitted(ticket.clone()));

        // Give the remote job time to start before the first query.
        if !self.wait(self.config.initial_delay).await {
            return PollState::Cancelled;
        }

        for attempt in 0..self.config.max_attempts {
            self.transition(PollState::Polling { attempt });
            self.attempts += 1;

            match self.client.report(&ticket).await {
                Ok(report) if report.status.is_terminal() => {
                    return PollState::Confirmed(report.to_verdict());
                }
                Ok(report) => {
                    debug!(attempt, status = %report.status, "scan job still queued");
                }
                Err(err) => {
                    debug!(attempt, error = %err, "scan report not available yet");
                }
            }

            if attempt + 1 < self.config.max_attempts {
                let delay = self.config.backoff_delay(attempt);
                debug!(attempt, delay_secs = delay.as_secs(), "backing off");
                if !self.wait(delay).await {
                    return PollState::Cancelled;
                }
            }
        }

        PollState::TimedOut
    }

    fn transition(&mut self, next: PollState) {
        match &next {
            PollState::TimedOut => {
                warn!(attempts = self.attempts, "scan job did not finish in time")
            }
            PollState::Errored(details) => warn!(%details, "scan job failed"),
            PollState::Cancelled => info!("scan job polling cancelled"),
            _ => debug!(from = %self.state, to = %next, "scan job state change"),
        }
        self.state = next;
    }

    /// Sleep for `delay`. Returns `false` if cancelled first.
    async fn wait(&self, delay: Duration) -> bool {
        match self.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => false,
                _ = tokio::time::sleep(delay) => true,
            },
            None => {
                tokio::time::sleep(delay).await;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!PollState::Idle.is_terminal());
        assert!(!PollState::Polling { attempt: 3 }.is_terminal());
        assert!(PollState::TimedOut.is_terminal());
        assert!(PollState::Errored("boom".into()).is_terminal());
    }

    #[test]
    fn test_failure_verdicts_are_unsafe() {
        let timed_out = PollState::TimedOut.verdict();
        assert!(!timed_out.is_clean);
        assert!(timed_out.engines_consulted.is_none());
        assert_eq!(
            timed_out.diagnostic_message.as_deref(),
            Some("Virus scan timed out.")
        );

        let errored = PollState::Errored("connection reset".into()).verdict();
        assert!(!errored.is_clean);
        assert_eq!(
            errored.diagnostic_message.as_deref(),
            Some("Virus scan failed: connection reset")
        );

        assert!(!PollState::Polling { attempt: 0 }.verdict().is_clean);
    }
}

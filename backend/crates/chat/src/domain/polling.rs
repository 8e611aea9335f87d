//! Run Polling State Machine
//!
//! Pure transition function for the wait-for-completion loop. The loop
//! itself (sleeping, calling the remote service) lives in the orchestrator.

use crate::domain::value_objects::RunStatus;

/// State of a run as seen by the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    TimedOut,
}

impl PollState {
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Completed | PollState::Failed | PollState::Cancelled | PollState::TimedOut
        )
    }
}

/// Result of one status check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollObservation {
    Status(RunStatus),
    /// The status call itself failed; the run may still be fine
    TransientError,
}

impl From<RunStatus> for PollState {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Completed => PollState::Completed,
            RunStatus::Failed | RunStatus::Expired | RunStatus::Incomplete => PollState::Failed,
            RunStatus::Cancelled => PollState::Cancelled,
            // Tool calls are not answered here; the run stays pending until
            // the provider expires it.
            RunStatus::Queued | RunStatus::RequiresAction => PollState::Queued,
            RunStatus::InProgress | RunStatus::Cancelling | RunStatus::Unknown => {
                PollState::InProgress
            }
        }
    }
}

/// Next state after `attempts_used` status checks (this one included)
///
/// A terminal observation wins even on the last attempt; a pending one
/// becomes `TimedOut` once the budget is spent. Terminal states are sticky.
pub fn next_poll_state(
    current: PollState,
    observation: PollObservation,
    attempts_used: u32,
    max_attempts: u32,
) -> PollState {
    if current.is_terminal() {
        return current;
    }

    let observed = match observation {
        PollObservation::Status(status) => PollState::from(status),
        PollObservation::TransientError => current,
    };

    if observed.is_terminal() {
        return observed;
    }

    if attempts_used >= max_attempts {
        PollState::TimedOut
    } else {
        observed
    }
}

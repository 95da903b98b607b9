//! Spawner lifecycle phases.
//!
//! The phase tracks where a session is in the start/poll/stop protocol. It
//! exists to keep the protocol non-reentrant (a second `start` while one is
//! in flight is a caller error) and to make the fallback rule explicit: any
//! in-flight phase drops back to `Idle` on a scheduler-reported failure,
//! timeout, or terminal outcome.
//!
//! ```text
//!   Idle ──▶ Submitting ──▶ AwaitingRun ──▶ Running ──▶ Stopping
//!    ▲            │               │            ▲  │         │
//!    └────────────┴───────────────┴────────────┼──┴─────────┘
//!                (failure / terminal)          │
//!                                (cancel unconfirmed)
//! ```

/// Where the session currently is in the start/poll/stop protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnerPhase {
    /// No job associated with this session.
    #[default]
    Idle,
    /// Submission handed to the scheduler, identifier not yet known.
    Submitting,
    /// Identifier known, polling until the scheduler reports RUNNING.
    AwaitingRun,
    /// Job running and endpoint resolved (or restored from saved state).
    Running,
    /// Cancellation issued, awaiting confirmation.
    Stopping,
}

/// Check whether a phase transition is allowed.
#[must_use]
pub const fn is_valid_transition(from: SpawnerPhase, to: SpawnerPhase) -> bool {
    use SpawnerPhase::{AwaitingRun, Idle, Running, Stopping, Submitting};

    matches!(
        (from, to),
        (Idle, Submitting)
            | (Submitting, AwaitingRun)
            | (AwaitingRun, Running | Stopping)
            | (Running, Stopping)
            // cancellation that did not take leaves the job running
            | (Stopping, Running)
            // any in-flight phase falls back to Idle on failure or completion
            | (Submitting | AwaitingRun | Running | Stopping, Idle)
    )
}

/// True if a new `start` may begin from this phase.
#[must_use]
pub const fn can_start(phase: SpawnerPhase) -> bool {
    matches!(phase, SpawnerPhase::Idle)
}

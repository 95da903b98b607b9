//! Error types for the spawner backend.
//!
//! Only `start` surfaces errors to the session manager; `poll` degrades to
//! "not running" and `stop` is best-effort with log output. Scheduler
//! command failures are not errors at all: they degrade to empty output and
//! take the job-gone path inside the client.

use slurmspawn_core::{JobId, JobState};
use thiserror::Error;

use crate::lifecycle::SpawnerPhase;

/// A result type using `SpawnError`.
pub type Result<T> = std::result::Result<T, SpawnError>;

/// Errors that can occur while driving the batch-job lifecycle.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The submit command output did not end in a usable job identifier.
    #[error("submission did not yield a job identifier, output was {output:?}")]
    Submission {
        /// Raw stdout of the submit command.
        output: String,
    },

    /// The job never reached RUNNING within the poll budget.
    #[error("job {job_id} was still not running after {attempts} state queries")]
    PollTimeout {
        /// The job that was being awaited.
        job_id: JobId,
        /// How many state queries were made before giving up.
        attempts: u32,
    },

    /// The scheduler reported a terminal state before RUNNING was observed.
    #[error("job {job_id} failed to start (reported state {state:?})")]
    JobFailed {
        /// The job that failed.
        job_id: JobId,
        /// The state derived from the last query.
        state: JobState,
    },

    /// A running job had no resolvable execution host.
    #[error("no reachable endpoint for running job {job_id}: {reason}")]
    Resolution {
        /// The job whose endpoint could not be resolved.
        job_id: JobId,
        /// What went wrong during resolution.
        reason: String,
    },

    /// `start` was called while a previous start was still in flight.
    #[error("spawner is not idle (phase {phase:?})")]
    NotIdle {
        /// The phase the spawner was in when `start` was called.
        phase: SpawnerPhase,
    },
}

impl SpawnError {
    /// True when the error terminates a start attempt and clears the stored
    /// job identifier. `NotIdle` is a caller error and leaves the in-flight
    /// start untouched.
    #[must_use]
    pub const fn is_start_failure(&self) -> bool {
        matches!(
            self,
            Self::Submission { .. }
                | Self::PollTimeout { .. }
                | Self::JobFailed { .. }
                | Self::Resolution { .. }
        )
    }
}

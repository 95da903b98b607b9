//! Coarse job lifecycle phases derived from scheduler output.
//!
//! The scheduler only offers human-oriented status strings, so the typed
//! state is recomputed from fresh output on every query and never stored.

use serde::{Deserialize, Serialize};

/// The coarse lifecycle phase of a batch job as reported by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// The scheduler does not know the job: never submitted, finished, or
    /// cancelled. Empty query output maps here.
    Unsubmitted,
    /// Queued, waiting for resources.
    Pending,
    /// Dispatched to an execution node.
    Running,
    /// Any other reported state. Unrecognized output maps here as the
    /// fail-safe default.
    Terminal,
}

impl JobState {
    /// Derive the job state from raw scheduler query output.
    ///
    /// RUNNING is checked before PENDING so that output carrying both
    /// substrings (which should not occur) resolves to `Running`.
    #[must_use]
    pub fn from_scheduler_output(output: &str) -> Self {
        let output = output.trim();
        if output.is_empty() {
            Self::Unsubmitted
        } else if output.contains("RUNNING") {
            Self::Running
        } else if output.contains("PENDING") {
            Self::Pending
        } else {
            Self::Terminal
        }
    }

    /// True while the job still occupies the scheduler (queued or running).
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

//! The spawner protocol and its SLURM implementation.
//!
//! [`Spawner`] is the interface the session-manager framework holds; it
//! knows how to start, poll, and stop an opaque backend process and how to
//! persist its state blob. [`SlurmSpawner`] implements the protocol on top
//! of a [`SlurmClient`], owning the lifecycle phases, the stored job
//! identifier, and the wait/retry policy.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use slurmspawn_core::{JobId, JobState};

use crate::endpoint::{self, EndpointAddress};
use crate::error::{Result, SpawnError};
use crate::lifecycle::{self, SpawnerPhase};
use crate::scheduler_client::{CancelOutcome, SlurmClient};
use crate::script::SubmissionRequest;
use crate::state;
use crate::submit::SubmitGate;
use crate::types::SpawnerConfig;

/// Liveness as reported to the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// The job is queued or running.
    Alive,
    /// No job, or the scheduler no longer reports it.
    NotRunning,
}

/// The backend interface held by the session manager.
///
/// `start` is the only fallible operation; `poll` and `stop` convert every
/// failure into "not running" or a logged warning so the framework is never
/// left with an exception mid-protocol.
#[async_trait]
pub trait Spawner: Send + Sync {
    /// Launch the user process and return its endpoint once it is live.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError::NotIdle` when a start is already in flight, or
    /// a start failure (submission, timeout, job failure, resolution) after
    /// clearing the stored identifier.
    async fn start(&self) -> Result<EndpointAddress>;

    /// Report liveness from a fresh scheduler query.
    ///
    /// Idempotent: with no stored identifier this returns `NotRunning`
    /// without invoking the scheduler.
    async fn poll(&self) -> ProcessStatus;

    /// Best-effort cancellation; never fails and never hangs.
    ///
    /// `now` skips the graceful confirmation re-poll.
    async fn stop(&self, now: bool);

    /// Restore the job identifier from a persisted state blob.
    fn load_state(&self, blob: &Value);

    /// Snapshot the persistable state (the job identifier, if any).
    fn get_state(&self) -> Value;

    /// Forget the job identifier and return to idle.
    fn clear_state(&self);
}

/// Per-session mutable state guarded behind the spawner's `&self` surface.
#[derive(Debug, Default)]
struct Inner {
    phase: SpawnerPhase,
    job_id: Option<JobId>,
    submitted_at: Option<DateTime<Utc>>,
}

/// SLURM-backed spawner managing exactly one batch job per session.
///
/// Each instance owns its session's state exclusively; the only resource
/// shared across sessions is the injected [`SubmitGate`].
pub struct SlurmSpawner<C: SlurmClient> {
    client: Arc<C>,
    request: SubmissionRequest,
    port: u16,
    config: SpawnerConfig,
    gate: SubmitGate,
    inner: Mutex<Inner>,
}

impl<C: SlurmClient> SlurmSpawner<C> {
    /// Create a spawner with explicit timing policy and submit gate.
    #[must_use]
    pub fn new(
        client: Arc<C>,
        request: SubmissionRequest,
        port: u16,
        config: SpawnerConfig,
        gate: SubmitGate,
    ) -> Self {
        Self {
            client,
            request,
            port,
            config,
            gate,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Create a spawner with default timing policy and its own gate.
    ///
    /// Suitable when the process manages a single session; multi-session
    /// hosts should share one [`SubmitGate`] across spawners via [`new`].
    ///
    /// [`new`]: Self::new
    #[must_use]
    pub fn with_defaults(client: Arc<C>, request: SubmissionRequest, port: u16) -> Self {
        Self::new(
            client,
            request,
            port,
            SpawnerConfig::default(),
            SubmitGate::new(),
        )
    }

    /// The submission request this spawner renders on start.
    #[must_use]
    pub const fn request(&self) -> &SubmissionRequest {
        &self.request
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SpawnerPhase {
        self.inner.lock().phase
    }

    /// The stored job identifier, if a job is associated with the session.
    #[must_use]
    pub fn job_id(&self) -> Option<JobId> {
        self.inner.lock().job_id.clone()
    }

    fn set_phase(&self, to: SpawnerPhase) {
        let mut inner = self.inner.lock();
        debug_assert!(
            lifecycle::is_valid_transition(inner.phase, to),
            "invalid phase transition {:?} -> {to:?}",
            inner.phase
        );
        inner.phase = to;
    }

    /// Drop the job identifier and fall back to idle.
    fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.job_id = None;
        inner.submitted_at = None;
        inner.phase = SpawnerPhase::Idle;
    }

    /// Submit, await RUNNING, resolve the endpoint.
    async fn drive_start(&self) -> Result<EndpointAddress> {
        tracing::info!(user = %self.request.user, "submitting batch job");
        let job_id = self.gate.run(self.client.submit(&self.request)).await?;

        {
            let mut inner = self.inner.lock();
            inner.job_id = Some(job_id.clone());
            inner.submitted_at = Some(Utc::now());
            inner.phase = SpawnerPhase::AwaitingRun;
        }
        tracing::info!(job_id = %job_id, "batch job submitted");

        self.await_running(&job_id).await?;
        endpoint::resolve(&*self.client, &job_id, self.port).await
    }

    /// Poll the scheduler until the job runs, fails, or the budget is spent.
    async fn await_running(&self, job_id: &JobId) -> Result<()> {
        let attempts = self.config.start_poll_attempts;
        for attempt in 1..=attempts {
            let job_state = self.client.query_state(job_id).await;
            tracing::debug!(job_id = %job_id, attempt, state = ?job_state, "queried job state");
            match job_state {
                JobState::Running => return Ok(()),
                JobState::Pending => {
                    if attempt < attempts {
                        tokio::time::sleep(self.config.start_poll_interval).await;
                    }
                }
                // empty output counts as the job being gone, not an error
                state => {
                    return Err(SpawnError::JobFailed {
                        job_id: job_id.clone(),
                        state,
                    })
                }
            }
        }
        Err(SpawnError::PollTimeout {
            job_id: job_id.clone(),
            attempts,
        })
    }
}

#[async_trait]
impl<C: SlurmClient> Spawner for SlurmSpawner<C> {
    async fn start(&self) -> Result<EndpointAddress> {
        {
            let mut inner = self.inner.lock();
            if !lifecycle::can_start(inner.phase) {
                return Err(SpawnError::NotIdle { phase: inner.phase });
            }
            inner.phase = SpawnerPhase::Submitting;
        }

        match self.drive_start().await {
            Ok(address) => {
                self.set_phase(SpawnerPhase::Running);
                tracing::info!(endpoint = %address, "user process is up");
                Ok(address)
            }
            Err(err) => {
                tracing::warn!(error = %err, "start failed");
                self.reset();
                Err(err)
            }
        }
    }

    async fn poll(&self) -> ProcessStatus {
        let Some(job_id) = self.job_id() else {
            return ProcessStatus::NotRunning;
        };

        let job_state = self.client.query_state(&job_id).await;
        tracing::info!(job_id = %job_id, state = ?job_state, "job status");

        if job_state.is_alive() {
            ProcessStatus::Alive
        } else {
            let submitted_at = self.inner.lock().submitted_at;
            tracing::info!(
                job_id = %job_id,
                submitted_at = ?submitted_at,
                "job is no longer running"
            );
            self.reset();
            ProcessStatus::NotRunning
        }
    }

    async fn stop(&self, now: bool) {
        if self.poll().await == ProcessStatus::NotRunning {
            return;
        }
        let Some(job_id) = self.job_id() else {
            return;
        };

        tracing::info!(job_id = %job_id, user = %self.request.user, "cancelling batch job");
        self.set_phase(SpawnerPhase::Stopping);

        match self.client.cancel(&job_id).await {
            CancelOutcome::Cancelled | CancelOutcome::AlreadyTerminal => {
                self.reset();
            }
            CancelOutcome::Unknown => {
                if now {
                    // forced stop: the session is over regardless
                    tracing::debug!(job_id = %job_id, "skipping cancel confirmation");
                    self.reset();
                } else if self.poll().await == ProcessStatus::Alive {
                    tracing::warn!(job_id = %job_id, "job did not confirm cancellation");
                    self.set_phase(SpawnerPhase::Running);
                }
            }
        }
    }

    fn load_state(&self, blob: &Value) {
        let job_id = state::job_id_from_blob(blob);
        let mut inner = self.inner.lock();
        inner.phase = if job_id.is_some() {
            // assume alive until the next poll says otherwise
            SpawnerPhase::Running
        } else {
            SpawnerPhase::Idle
        };
        inner.job_id = job_id;
        inner.submitted_at = None;
    }

    fn get_state(&self) -> Value {
        state::blob_from_job_id(self.inner.lock().job_id.as_ref())
    }

    fn clear_state(&self) {
        self.reset();
    }
}

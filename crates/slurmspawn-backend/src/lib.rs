//! SLURM batch-job lifecycle backend for session managers.
//!
//! This crate manages exactly one long-running user compute process per
//! logical session on a SLURM cluster. A session-manager framework drives it
//! through the [`Spawner`] interface (`start` / `poll` / `stop` plus state
//! persistence) and gets back a reachable [`EndpointAddress`] once the job is
//! live.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Session manager framework                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  start / poll / stop
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SlurmSpawner                           │
//! │  ┌─────────────┐ ┌──────────────┐ ┌────────────────────┐   │
//! │  │  Lifecycle  │ │  Job id      │ │  Endpoint          │   │
//! │  │  phases     │ │  store       │ │  resolution        │   │
//! │  └─────────────┘ └──────────────┘ └────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                │ SubmitGate (one submission at a time)
//!                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SlurmClient                            │
//! │        sbatch ── squeue ── scancel ── host (DNS)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler is treated as an unreliable, latency-heavy external system
//! reached only through command invocation and stdout parsing. Every typed
//! result is recomputed from fresh output; the only state that survives
//! between calls is the scheduler-assigned job identifier.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use slurmspawn_backend::{
//!     CommandSlurmClient, SlurmSpawner, Spawner, SubmissionRequest,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(CommandSlurmClient::new());
//! let request = SubmissionRequest::new("alice", "export JPY_API_TOKEN=t;run.sh");
//!
//! // Port is chosen by the session manager before submission.
//! let spawner = SlurmSpawner::with_defaults(client, request, 8888);
//!
//! let endpoint = spawner.start().await?;
//! println!("user server is at {endpoint}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod endpoint;
pub mod error;
pub mod lifecycle;
pub mod scheduler_client;
pub mod script;
pub mod spawner;
pub mod state;
pub mod submit;
pub mod types;

pub use endpoint::EndpointAddress;
pub use error::{Result, SpawnError};
pub use lifecycle::SpawnerPhase;
pub use scheduler_client::{CancelOutcome, CommandSlurmClient, SlurmClient, SlurmCommands};
pub use script::SubmissionRequest;
pub use spawner::{ProcessStatus, SlurmSpawner, Spawner};
pub use submit::SubmitGate;
pub use types::SpawnerConfig;

// Re-export commonly used types from the core crate for convenience
pub use slurmspawn_core::{JobId, JobState};

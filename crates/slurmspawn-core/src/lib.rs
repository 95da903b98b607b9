//! Core types for slurmspawn.
//!
//! This crate provides the foundational types shared across the slurmspawn
//! workspace:
//!
//! - **Identifiers**: the scheduler-assigned [`JobId`] token
//! - **Job state**: the coarse [`JobState`] phase derived from scheduler
//!   output
//!
//! # Example
//!
//! ```
//! use slurmspawn_core::{JobId, JobState};
//!
//! // Parse the identifier sbatch handed back
//! let job_id = JobId::parse("209").unwrap();
//! assert_eq!(job_id.as_str(), "209");
//!
//! // Derive the job phase from squeue output
//! let state = JobState::from_scheduler_output("PENDING");
//! assert_eq!(state, JobState::Pending);
//! assert!(state.is_alive());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod state;

pub use ids::{JobId, JobIdError};
pub use state::JobState;

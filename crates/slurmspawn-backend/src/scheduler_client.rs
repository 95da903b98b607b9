//! Client for the external scheduler CLI.
//!
//! Every operation is one external process invocation with text output.
//! None are idempotent at the scheduler level (resubmission creates a new,
//! distinct job) except cancellation, which is safe to repeat.
//!
//! Invocation failures (spawn error, non-zero exit, timeout) deliberately
//! degrade to empty output so they take the job-gone path instead of
//! crashing the lifecycle; the submit parser is the one place where empty
//! output turns into a hard error.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use slurmspawn_core::{JobId, JobState};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{Result, SpawnError};
use crate::script::SubmissionRequest;

/// Default bound on any single external scheduler invocation.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The scheduler confirmed the job is being cancelled.
    Cancelled,
    /// The job had already finished on its own.
    AlreadyTerminal,
    /// The cancel command gave no usable confirmation.
    Unknown,
}

/// Trait for scheduler communication.
///
/// This trait abstracts the scheduler CLI, allowing for mock
/// implementations in tests.
#[async_trait]
pub trait SlurmClient: Send + Sync {
    /// Submit a job and return the scheduler-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError::Submission` when the submit output does not end
    /// in a numeric job identifier.
    async fn submit(&self, request: &SubmissionRequest) -> Result<JobId>;

    /// Query the coarse state of a job from fresh scheduler output.
    ///
    /// Never fails: an unreachable scheduler degrades to `Unsubmitted`.
    async fn query_state(&self, id: &JobId) -> JobState;

    /// Name of the execution node the job was dispatched to, if any.
    async fn query_node(&self, id: &JobId) -> Option<String>;

    /// Resolve an execution-node name to a network address.
    async fn resolve_host(&self, node: &str) -> Option<String>;

    /// Request cancellation of a job. Safe to repeat.
    async fn cancel(&self, id: &JobId) -> CancelOutcome;
}

/// Program names for the scheduler CLI.
///
/// Overridable so tests (and nonstandard installs) can point the client at
/// stub executables.
#[derive(Debug, Clone)]
pub struct SlurmCommands {
    /// Job submission, script on stdin.
    pub sbatch: String,
    /// State and node queries.
    pub squeue: String,
    /// Cancellation.
    pub scancel: String,
    /// Node-name to address resolution.
    pub host: String,
}

impl Default for SlurmCommands {
    fn default() -> Self {
        Self {
            sbatch: "sbatch".to_string(),
            squeue: "squeue".to_string(),
            scancel: "scancel".to_string(),
            host: "host".to_string(),
        }
    }
}

/// Scheduler client that spawns the external CLI per operation.
#[derive(Debug, Clone)]
pub struct CommandSlurmClient {
    commands: SlurmCommands,
    timeout: Duration,
}

impl CommandSlurmClient {
    /// Create a client using the standard command names and timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_commands(SlurmCommands::default(), DEFAULT_COMMAND_TIMEOUT)
    }

    /// Create a client with custom command names and invocation timeout.
    #[must_use]
    pub const fn with_commands(commands: SlurmCommands, timeout: Duration) -> Self {
        Self { commands, timeout }
    }

    /// Run one scheduler command and return its trimmed stdout.
    ///
    /// Spawn failures, non-zero exits, and timeouts all collapse to empty
    /// output with a warning, per the degradation policy above.
    async fn run(&self, program: &str, args: &[&str], stdin: Option<&str>) -> String {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let invocation = async {
            let mut child = command.spawn()?;
            if let Some(input) = stdin {
                if let Some(mut pipe) = child.stdin.take() {
                    pipe.write_all(input.as_bytes()).await?;
                    pipe.shutdown().await?;
                }
            }
            child.wait_with_output().await
        };

        match tokio::time::timeout(self.timeout, invocation).await {
            Ok(Ok(output)) => {
                if output.status.success() {
                    String::from_utf8_lossy(&output.stdout).trim().to_string()
                } else {
                    tracing::warn!(
                        program,
                        status = %output.status,
                        stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                        "scheduler command exited non-zero"
                    );
                    String::new()
                }
            }
            Ok(Err(err)) => {
                tracing::warn!(program, error = %err, "failed to run scheduler command");
                String::new()
            }
            Err(_) => {
                tracing::warn!(
                    program,
                    timeout_secs = self.timeout.as_secs(),
                    "scheduler command timed out"
                );
                String::new()
            }
        }
    }
}

impl Default for CommandSlurmClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the job identifier from submit output.
///
/// The identifier is the last whitespace-delimited token of a line like
/// `Submitted batch job 209`. A non-numeric trailing token (error text)
/// fails submission outright rather than letting a nonexistent job be
/// polled.
pub(crate) fn parse_submit_output(output: &str) -> Result<JobId> {
    let token = output.split_whitespace().last().unwrap_or("");
    JobId::parse(token).map_err(|_| SpawnError::Submission {
        output: output.to_string(),
    })
}

/// Map cancel-command output to an outcome.
pub(crate) fn cancel_outcome(output: &str) -> CancelOutcome {
    match output.trim() {
        "CANCELLED" | "COMPLETING" => CancelOutcome::Cancelled,
        "COMPLETED" | "FAILED" => CancelOutcome::AlreadyTerminal,
        _ => CancelOutcome::Unknown,
    }
}

#[async_trait]
impl SlurmClient for CommandSlurmClient {
    async fn submit(&self, request: &SubmissionRequest) -> Result<JobId> {
        let script = request.render();
        tracing::debug!(user = %request.user, script = %script, "submitting batch script");

        let output = self.run(&self.commands.sbatch, &[], Some(&script)).await;
        parse_submit_output(&output)
    }

    async fn query_state(&self, id: &JobId) -> JobState {
        let output = self
            .run(
                &self.commands.squeue,
                &["-h", "-j", id.as_str(), "-o", "%T"],
                None,
            )
            .await;
        JobState::from_scheduler_output(&output)
    }

    async fn query_node(&self, id: &JobId) -> Option<String> {
        let output = self
            .run(
                &self.commands.squeue,
                &["-h", "-j", id.as_str(), "-o", "%N"],
                None,
            )
            .await;
        if output.is_empty() {
            None
        } else {
            Some(output)
        }
    }

    async fn resolve_host(&self, node: &str) -> Option<String> {
        let output = self.run(&self.commands.host, &[node], None).await;
        // the address is the last portion of the resolver output
        output.split_whitespace().last().map(str::to_string)
    }

    async fn cancel(&self, id: &JobId) -> CancelOutcome {
        let output = self.run(&self.commands.scancel, &[id.as_str()], None).await;
        cancel_outcome(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    #[test]
    fn submit_output_parsing() {
        let id = parse_submit_output("Submitted batch job 209").unwrap();
        assert_eq!(id.as_str(), "209");

        assert!(matches!(
            parse_submit_output("sbatch: error: invalid partition"),
            Err(SpawnError::Submission { .. })
        ));
        assert!(matches!(
            parse_submit_output(""),
            Err(SpawnError::Submission { .. })
        ));
    }

    #[test]
    fn cancel_outcome_mapping() {
        assert_eq!(cancel_outcome("CANCELLED"), CancelOutcome::Cancelled);
        assert_eq!(cancel_outcome("COMPLETING"), CancelOutcome::Cancelled);
        assert_eq!(cancel_outcome("COMPLETED"), CancelOutcome::AlreadyTerminal);
        assert_eq!(cancel_outcome("FAILED"), CancelOutcome::AlreadyTerminal);
        assert_eq!(cancel_outcome(""), CancelOutcome::Unknown);
        assert_eq!(cancel_outcome("RUNNING"), CancelOutcome::Unknown);
    }

    /// Write an executable shell stub and return its path.
    fn stub(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn stub_client(commands: SlurmCommands) -> CommandSlurmClient {
        CommandSlurmClient::with_commands(commands, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn submit_via_stub_sbatch() {
        let dir = tempfile::tempdir().unwrap();
        let commands = SlurmCommands {
            // consume the script from stdin, then report an id
            sbatch: stub(dir.path(), "sbatch", "cat > /dev/null\necho 'Submitted batch job 209'"),
            ..SlurmCommands::default()
        };

        let client = stub_client(commands);
        let request = SubmissionRequest::new("alice", "export X=1;run.sh");
        let id = client.submit(&request).await.unwrap();
        assert_eq!(id.as_str(), "209");
    }

    #[tokio::test]
    async fn submit_error_text_is_a_submission_error() {
        let dir = tempfile::tempdir().unwrap();
        let commands = SlurmCommands {
            sbatch: stub(
                dir.path(),
                "sbatch",
                "cat > /dev/null\necho 'sbatch: error: Batch job submission failed'",
            ),
            ..SlurmCommands::default()
        };

        let client = stub_client(commands);
        let request = SubmissionRequest::new("alice", "run.sh");
        assert!(matches!(
            client.submit(&request).await,
            Err(SpawnError::Submission { .. })
        ));
    }

    #[tokio::test]
    async fn query_state_via_stub_squeue() {
        let dir = tempfile::tempdir().unwrap();
        let commands = SlurmCommands {
            squeue: stub(dir.path(), "squeue", "echo RUNNING"),
            ..SlurmCommands::default()
        };

        let client = stub_client(commands);
        let id = JobId::parse("209").unwrap();
        assert_eq!(client.query_state(&id).await, JobState::Running);
    }

    #[tokio::test]
    async fn missing_binary_degrades_to_job_gone() {
        let commands = SlurmCommands {
            squeue: "/nonexistent/squeue".to_string(),
            ..SlurmCommands::default()
        };

        let client = stub_client(commands);
        let id = JobId::parse("209").unwrap();
        assert_eq!(client.query_state(&id).await, JobState::Unsubmitted);
    }

    #[tokio::test]
    async fn non_zero_exit_degrades_to_empty_output() {
        let dir = tempfile::tempdir().unwrap();
        let commands = SlurmCommands {
            squeue: stub(dir.path(), "squeue", "echo RUNNING\nexit 1"),
            ..SlurmCommands::default()
        };

        let client = stub_client(commands);
        let id = JobId::parse("209").unwrap();
        assert_eq!(client.query_state(&id).await, JobState::Unsubmitted);
    }

    #[tokio::test]
    async fn resolve_host_takes_last_token() {
        let dir = tempfile::tempdir().unwrap();
        let commands = SlurmCommands {
            host: stub(
                dir.path(),
                "host",
                "echo 'node001.cluster has address 10.1.2.3'",
            ),
            ..SlurmCommands::default()
        };

        let client = stub_client(commands);
        let addr = client.resolve_host("node001").await;
        assert_eq!(addr.as_deref(), Some("10.1.2.3"));
    }

    #[tokio::test]
    async fn query_node_empty_output_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let commands = SlurmCommands {
            squeue: stub(dir.path(), "squeue", "true"),
            ..SlurmCommands::default()
        };

        let client = stub_client(commands);
        let id = JobId::parse("209").unwrap();
        assert_eq!(client.query_node(&id).await, None);
    }

    #[tokio::test]
    async fn cancel_via_stub_scancel() {
        let dir = tempfile::tempdir().unwrap();
        let commands = SlurmCommands {
            scancel: stub(dir.path(), "scancel", "echo CANCELLED"),
            ..SlurmCommands::default()
        };

        let client = stub_client(commands);
        let id = JobId::parse("209").unwrap();
        assert_eq!(client.cancel(&id).await, CancelOutcome::Cancelled);
    }
}

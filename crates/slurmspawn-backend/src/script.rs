//! Batch-script rendering for submission.
//!
//! The rendered script is fed to the submit command on stdin: a shebang,
//! the fixed resource directive block, then an environment-export line
//! followed by the user command. The directive values and log-path pattern
//! are load-bearing for compatibility and must not drift.

use std::fmt::Write as _;

/// Immutable description of one job submission.
///
/// Built by the session manager's environment per start call: the command
/// line (with an optional leading `export K=V;` prefix), the invoking user,
/// and the resource hints for the scheduler. Defaults match the fixed
/// template: partition `all`, 200 scheduler memory units, a two hour wall
/// clock.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// User the job runs as; also fixes the working directory and log path.
    pub user: String,
    /// Command body, optionally prefixed with `export ...;`.
    pub command: String,
    /// Scheduler partition (queue) name.
    pub partition: String,
    /// Memory limit in the scheduler's memory unit.
    pub memory: String,
    /// Wall-clock limit in whole hours, rendered as `H:00:00`.
    pub hours: String,
}

impl SubmissionRequest {
    /// Create a request with the default resource hints.
    #[must_use]
    pub fn new(user: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            command: command.into(),
            partition: "all".to_string(),
            memory: "200".to_string(),
            hours: "2".to_string(),
        }
    }

    /// Override the resource hints.
    #[must_use]
    pub fn with_resources(
        mut self,
        partition: impl Into<String>,
        memory: impl Into<String>,
        hours: impl Into<String>,
    ) -> Self {
        self.partition = partition.into();
        self.memory = memory.into();
        self.hours = hours.into();
        self
    }

    /// Render the batch script handed to the submit command on stdin.
    #[must_use]
    pub fn render(&self) -> String {
        let (export_line, command) = split_export(&self.command);

        let mut script = String::from("#!/bin/bash\n");
        let _ = writeln!(script, "#SBATCH --partition={}", self.partition);
        let _ = writeln!(script, "#SBATCH --time={}:00:00", self.hours);
        let _ = writeln!(
            script,
            "#SBATCH -o /home/{}/jupyterhub_slurmspawner_%j.log",
            self.user
        );
        script.push_str("#SBATCH --job-name=spawner-jupyterhub\n");
        let _ = writeln!(script, "#SBATCH --workdir=/home/{}", self.user);
        let _ = writeln!(script, "#SBATCH --mem={}", self.memory);
        let _ = writeln!(script, "#SBATCH --uid={}", self.user);
        script.push_str("#SBATCH --get-user-env=L\n");
        script.push('\n');
        if let Some(export_line) = export_line {
            let _ = writeln!(script, "{export_line}");
        }
        let _ = writeln!(script, "{command}");
        script
    }
}

/// Split the leading `export ...;` prefix off a command body.
fn split_export(command: &str) -> (Option<&str>, &str) {
    match command.split_once(';') {
        Some((head, tail)) => (Some(head.trim()), tail.trim()),
        None => (None, command.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_resource_hints() {
        let request = SubmissionRequest::new("bob", "run.sh");
        assert_eq!(request.partition, "all");
        assert_eq!(request.memory, "200");
        assert_eq!(request.hours, "2");
    }

    #[test]
    fn renders_fixed_directive_block() {
        let script = SubmissionRequest::new("bob", "export A=1;run.sh").render();

        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("#SBATCH --partition=all\n"));
        assert!(script.contains("#SBATCH --time=2:00:00\n"));
        assert!(script.contains("#SBATCH -o /home/bob/jupyterhub_slurmspawner_%j.log\n"));
        assert!(script.contains("#SBATCH --job-name=spawner-jupyterhub\n"));
        assert!(script.contains("#SBATCH --workdir=/home/bob\n"));
        assert!(script.contains("#SBATCH --mem=200\n"));
        assert!(script.contains("#SBATCH --uid=bob\n"));
        assert!(script.contains("#SBATCH --get-user-env=L\n"));
    }

    #[test]
    fn renders_custom_resources_with_export_before_command() {
        let script = SubmissionRequest::new("alice", "export X=1;run.sh")
            .with_resources("gpu", "4000", "4")
            .render();

        assert!(script.contains("#SBATCH --partition=gpu\n"));
        assert!(script.contains("#SBATCH --mem=4000\n"));
        assert!(script.contains("#SBATCH --time=4:00:00\n"));
        assert!(script.contains("#SBATCH --uid=alice\n"));

        let export_pos = script.find("export X=1").unwrap();
        let command_pos = script.find("run.sh").unwrap();
        assert!(export_pos < command_pos);
    }

    #[test]
    fn command_without_export_prefix() {
        let script = SubmissionRequest::new("bob", "run.sh").render();
        assert!(script.ends_with("run.sh\n"));
        assert!(!script.contains("export"));
    }
}

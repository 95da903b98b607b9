//! Endpoint resolution for running jobs.

use std::fmt;

use serde::{Deserialize, Serialize};
use slurmspawn_core::JobId;

use crate::error::{Result, SpawnError};
use crate::scheduler_client::SlurmClient;

/// A reachable (host, port) pair for a running job.
///
/// The host is resolved only after the scheduler reports the job running;
/// the port is chosen by the session manager before submission and passed
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointAddress {
    /// Address of the execution node.
    pub host: String,
    /// Port the user process listens on.
    pub port: u16,
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Resolve the execution node of a running job into a reachable address.
///
/// # Errors
///
/// Returns `SpawnError::Resolution` when the scheduler reports no assigned
/// node or the node name does not resolve. The caller treats either as a
/// start failure: the job is marked running but its endpoint is unknown.
pub async fn resolve<C>(client: &C, job_id: &JobId, port: u16) -> Result<EndpointAddress>
where
    C: SlurmClient + ?Sized,
{
    let node = client
        .query_node(job_id)
        .await
        .ok_or_else(|| SpawnError::Resolution {
            job_id: job_id.clone(),
            reason: "no execution node assigned".to_string(),
        })?;

    let host = client
        .resolve_host(&node)
        .await
        .ok_or_else(|| SpawnError::Resolution {
            job_id: job_id.clone(),
            reason: format!("node {node:?} did not resolve"),
        })?;

    tracing::debug!(job_id = %job_id, node = %node, host = %host, "resolved execution node");
    Ok(EndpointAddress { host, port })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_host_colon_port() {
        let endpoint = EndpointAddress {
            host: "10.1.2.3".to_string(),
            port: 8888,
        };
        assert_eq!(endpoint.to_string(), "10.1.2.3:8888");
    }

    #[test]
    fn serde_round_trip() {
        let endpoint = EndpointAddress {
            host: "node001".to_string(),
            port: 43210,
        };
        let json = serde_json::to_string(&endpoint).unwrap();
        let back: EndpointAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, endpoint);
    }
}

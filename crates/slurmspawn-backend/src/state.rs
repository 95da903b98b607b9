//! Persistence of the job identifier across session-manager restarts.
//!
//! The framework persists an opaque JSON blob per session. Exactly one
//! field of it belongs to this backend: the scheduler-assigned job
//! identifier under the fixed `"job_id"` key. Everything else about the job
//! is recomputed from fresh scheduler queries.

use serde_json::Value;
use slurmspawn_core::JobId;

/// Fixed key for the job identifier inside the persisted state blob.
pub const JOB_ID_KEY: &str = "job_id";

/// Extract the job identifier from a persisted state blob.
///
/// An absent key, an empty value, or a non-object blob all mean "no job".
/// A malformed identifier is dropped with a warning rather than restored,
/// so a corrupt blob cannot make the lifecycle poll a bogus job.
#[must_use]
pub fn job_id_from_blob(blob: &Value) -> Option<JobId> {
    let token = blob.get(JOB_ID_KEY)?.as_str()?;
    if token.is_empty() {
        return None;
    }
    match JobId::parse(token) {
        Ok(id) => Some(id),
        Err(err) => {
            tracing::warn!(token, error = %err, "dropping malformed job identifier from saved state");
            None
        }
    }
}

/// Build the state blob for persistence.
///
/// The `job_id` key is omitted entirely when no job is held, matching the
/// "empty/absent means no job" contract.
#[must_use]
pub fn blob_from_job_id(job_id: Option<&JobId>) -> Value {
    let mut map = serde_json::Map::new();
    if let Some(id) = job_id {
        map.insert(JOB_ID_KEY.to_string(), Value::String(id.as_str().to_string()));
    }
    Value::Object(map)
}

//! The scheduler-assigned job identifier.
//!
//! SLURM assigns every accepted submission a decimal job identifier and
//! reports it as the last token of the sbatch output line. The identifier is
//! opaque to everything above the scheduler client, but parsing enforces the
//! numeric shape so that error text from a rejected submission is never
//! mistaken for a valid identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a scheduler-assigned identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobIdError {
    /// The token was empty.
    #[error("empty job identifier")]
    Empty,

    /// The token was not a decimal job identifier.
    #[error("not a numeric job identifier: {0:?}")]
    NotNumeric(String),
}

/// An opaque job identifier assigned by the scheduler on submission.
///
/// An absent `JobId` means "no job associated with this session". The
/// identifier is created by submission, read by every poll and stop, and
/// destroyed on any terminal transition.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Parse a `JobId` from a whitespace-free token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or contains anything other
    /// than ASCII digits.
    pub fn parse(token: &str) -> Result<Self, JobIdError> {
        if token.is_empty() {
            return Err(JobIdError::Empty);
        }
        if !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(JobIdError::NotNumeric(token.to_string()));
        }
        Ok(Self(token.to_string()))
    }

    /// Return the identifier as the raw token handed to scheduler commands.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = JobIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_token() {
        let id = JobId::parse("209").unwrap();
        assert_eq!(id.as_str(), "209");
        assert_eq!(id.to_string(), "209");
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(JobId::parse(""), Err(JobIdError::Empty));
    }

    #[test]
    fn parse_rejects_error_text() {
        // sbatch failure output ends in words, not an id
        let err = JobId::parse("error").unwrap_err();
        assert_eq!(err, JobIdError::NotNumeric("error".to_string()));
    }

    #[test]
    fn parse_rejects_mixed_token() {
        assert!(JobId::parse("209a").is_err());
    }

    #[test]
    fn from_str_round_trip() {
        let id: JobId = "31337".parse().unwrap();
        assert_eq!(id.as_ref(), "31337");
    }

    #[test]
    fn serde_is_transparent() {
        let id = JobId::parse("42").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"42\"");
        let back: JobId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

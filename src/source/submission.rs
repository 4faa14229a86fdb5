//! Wire types for what a node's agent uploads.
//!
//! An agent submits `{ "hostname": ..., "data": { "breakfast": ..., "top": ... } }`
//! where each artifact is either the tool's raw text output or a failure
//! marker `{ "failure": { "message": ... } }` when the tool could not run.

use serde::{Deserialize, Serialize};

use super::NodeReport;

/// One raw artifact from a node's sampler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Artifact {
    /// Raw tool output.
    Text(String),
    /// The tool failed to run or produce output.
    Failed { failure: Failure },
}

impl Artifact {
    /// Create a failure marker.
    pub fn failed(message: impl Into<String>) -> Self {
        Artifact::Failed {
            failure: Failure {
                message: message.into(),
            },
        }
    }

    /// Raw text, or the failure message.
    pub fn text(&self) -> Result<&str, &str> {
        match self {
            Artifact::Text(text) => Ok(text),
            Artifact::Failed { failure } => Err(&failure.message),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Artifact::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Absent when the agent could only report that the tool failed.
    #[serde(default)]
    pub message: String,
}

/// The payload an agent posts once its capture window ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub hostname: String,
    pub data: SubmissionData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionData {
    /// Connection trace CSV.
    pub breakfast: Artifact,
    /// `top -b` batch output.
    pub top: Artifact,
}

impl From<Submission> for NodeReport {
    fn from(s: Submission) -> Self {
        NodeReport {
            node: s.hostname,
            trace: s.data.breakfast,
            samples: s.data.top,
        }
    }
}

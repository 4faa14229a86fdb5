//! Error types for ingestion and collection.
//!
//! Only ingestion problems are errors. Unresolved endpoints and degenerate
//! normalization are absorbed into the data model.

use std::fmt;

use thiserror::Error;

/// Which raw artifact of a node an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The connection trace (`breakfast.csv`).
    Trace,
    /// The resource samples (`top.txt`).
    Samples,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Trace => f.write_str("connection trace"),
            ArtifactKind::Samples => f.write_str("resource samples"),
        }
    }
}

/// A raw artifact could not be parsed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing column {0}")]
    MissingColumn(&'static str),

    #[error("line {line}: invalid {field} value {value:?}")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: expected at least {expected} fields, found {found}")]
    ShortLine {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A node's data could not be obtained or parsed.
///
/// Any of these aborts the whole aggregation run: normalization needs every
/// node's data to be meaningful.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The sampler on the node reported a failure instead of output.
    #[error("node {node}: {artifact} collection failed: {message}")]
    ToolFailed {
        node: String,
        artifact: ArtifactKind,
        message: String,
    },

    #[error("node {node}: malformed {artifact}: {source}")]
    Malformed {
        node: String,
        artifact: ArtifactKind,
        #[source]
        source: ParseError,
    },

    /// The source ran dry before every expected node reported.
    #[error("collection incomplete, no report from: {}", missing.join(", "))]
    Incomplete { missing: Vec<String> },

    /// The source met input it could not turn into a report.
    #[error("{description}: {message}")]
    SourceFailed { description: String, message: String },

    /// Collection ended without a single report.
    #[error("no node reported")]
    NoReports,

    /// A report arrived from a node that never joined.
    #[error("report from unknown node {0}")]
    UnknownNode(String),
}

impl IngestError {
    /// Node the error belongs to, if it is node-level.
    pub fn node(&self) -> Option<&str> {
        match self {
            IngestError::ToolFailed { node, .. } | IngestError::Malformed { node, .. } => Some(node),
            IngestError::UnknownNode(node) => Some(node),
            IngestError::Incomplete { .. }
            | IngestError::SourceFailed { .. }
            | IngestError::NoReports => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_node_and_artifact() {
        let err = IngestError::Malformed {
            node: "web-1".to_string(),
            artifact: ArtifactKind::Trace,
            source: ParseError::InvalidField {
                line: 3,
                field: "MS",
                value: "abc".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("web-1"));
        assert!(msg.contains("connection trace"));
        assert_eq!(err.node(), Some("web-1"));
    }

    #[test]
    fn test_incomplete_lists_missing() {
        let err = IngestError::Incomplete {
            missing: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "collection incomplete, no report from: a, b");
        assert!(err.node().is_none());
    }
}

//! Sources of node reports.
//!
//! Every reporting node contributes one [`NodeReport`] per run: its raw
//! connection trace and its raw resource samples. This module provides a
//! trait-based abstraction over where those reports come from (persisted
//! artifact directories, uploaded submission files, or an in-process
//! channel fed by a receiver).

mod channel;
mod directory;
mod file;
mod submission;

pub use channel::ChannelSource;
pub use directory::DirectorySource;
pub use file::FileSource;
pub use submission::{Artifact, Failure, Submission, SubmissionData};

use std::fmt::Debug;

/// Raw data of one node for one capture window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeReport {
    pub node: String,
    /// Connection trace CSV, or the tracer's failure marker.
    pub trace: Artifact,
    /// `top -b` output, or the sampler's failure marker.
    pub samples: Artifact,
}

impl NodeReport {
    pub fn new(node: impl Into<String>, trace: Artifact, samples: Artifact) -> Self {
        Self {
            node: node.into(),
            trace,
            samples,
        }
    }

    /// Report built from raw text of both artifacts.
    pub fn from_text(
        node: impl Into<String>,
        trace: impl Into<String>,
        samples: impl Into<String>,
    ) -> Self {
        Self::new(node, Artifact::Text(trace.into()), Artifact::Text(samples.into()))
    }
}

/// Trait for receiving node reports from various sources.
///
/// # Example
///
/// ```
/// use fleetmap::{DirectorySource, ReportSource};
///
/// let mut source = DirectorySource::new("breakfastResults");
/// while let Some(report) = source.poll() {
///     println!("report from {}", report.node);
/// }
/// ```
pub trait ReportSource: Send + Debug {
    /// Poll for the next report.
    ///
    /// Returns `Some(report)` if one is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<NodeReport>;

    /// Returns true once the source can never produce another report.
    fn is_finished(&self) -> bool;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// Returns the error message if some input could not be turned into a
    /// report. The node behind that input is unknown, so collection treats
    /// this as fatal.
    fn error(&self) -> Option<&str>;
}

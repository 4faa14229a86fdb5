//! Tracks which nodes are expected and which have reported.
//!
//! Agents report independently and in any order. Aggregation needs every
//! expected node's data, so the engine is only handed the reports once the
//! roster is complete, and always in join order regardless of arrival order.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{ArtifactKind, IngestError};
use crate::source::{NodeReport, ReportSource};

/// Whether reports from nodes that never joined are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPolicy {
    /// Only joined nodes may report; collection ends once all of them have.
    Closed,
    /// A report joins its node; collection ends when the source is finished.
    Open,
}

#[derive(Debug)]
pub struct Roster {
    policy: JoinPolicy,
    /// Joined nodes, in join order.
    joined: Vec<String>,
    reports: HashMap<String, NodeReport>,
}

impl Roster {
    /// A roster expecting exactly `nodes`.
    pub fn expecting<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roster = Self {
            policy: JoinPolicy::Closed,
            joined: Vec::new(),
            reports: HashMap::new(),
        };
        for node in nodes {
            roster.join(node);
        }
        roster
    }

    /// A roster that accepts whichever nodes report.
    pub fn open() -> Self {
        Self {
            policy: JoinPolicy::Open,
            joined: Vec::new(),
            reports: HashMap::new(),
        }
    }

    pub fn policy(&self) -> JoinPolicy {
        self.policy
    }

    /// Register a node. Returns false if it had already joined.
    pub fn join(&mut self, node: impl Into<String>) -> bool {
        let node = node.into();
        if self.joined.contains(&node) {
            return false;
        }
        debug!(%node, "node joined");
        self.joined.push(node);
        true
    }

    /// Accept a report. Returns whether the roster is now complete.
    ///
    /// A report carrying a failure marker aborts collection: a graph missing
    /// one node's data cannot be normalized meaningfully.
    pub fn submit(&mut self, report: NodeReport) -> Result<bool, IngestError> {
        if !self.joined.contains(&report.node) {
            match self.policy {
                JoinPolicy::Closed => return Err(IngestError::UnknownNode(report.node)),
                JoinPolicy::Open => {
                    self.join(report.node.clone());
                }
            }
        }

        info!(node = %report.node, "receiving data");
        check_artifacts(&report)?;

        let node = report.node.clone();
        if self.reports.insert(node.clone(), report).is_some() {
            warn!(%node, "node reported twice, keeping the latest report");
        }
        Ok(self.is_complete())
    }

    /// True once at least one node joined and every joined node reported.
    pub fn is_complete(&self) -> bool {
        !self.joined.is_empty() && self.joined.iter().all(|n| self.reports.contains_key(n))
    }

    /// Joined nodes without a report yet.
    pub fn missing(&self) -> Vec<String> {
        self.joined
            .iter()
            .filter(|n| !self.reports.contains_key(*n))
            .cloned()
            .collect()
    }

    /// Poll `source` until the roster is complete or the source runs dry.
    ///
    /// Input the source could not read fails the run, even under an open
    /// roster that would otherwise never miss the node behind it. `idle` is
    /// how long to wait between polls that returned nothing.
    pub fn collect(
        mut self,
        source: &mut dyn ReportSource,
        idle: Duration,
    ) -> Result<Vec<NodeReport>, IngestError> {
        info!(source = source.description(), "collecting node reports");
        loop {
            let report = source.poll();
            if let Some(message) = source.error() {
                warn!(source = source.description(), error = message, "unusable input");
                return Err(IngestError::SourceFailed {
                    description: source.description().to_string(),
                    message: message.to_string(),
                });
            }
            match report {
                Some(report) => {
                    let complete = self.submit(report)?;
                    if complete && self.policy == JoinPolicy::Closed {
                        break;
                    }
                }
                None if source.is_finished() => break,
                None => thread::sleep(idle),
            }
        }
        self.into_reports()
    }

    /// The reports in join order, if every joined node reported.
    pub fn into_reports(mut self) -> Result<Vec<NodeReport>, IngestError> {
        if self.joined.is_empty() {
            return Err(IngestError::NoReports);
        }
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(IngestError::Incomplete { missing });
        }
        Ok(self
            .joined
            .iter()
            .filter_map(|n| self.reports.remove(n))
            .collect())
    }
}

fn check_artifacts(report: &NodeReport) -> Result<(), IngestError> {
    for (artifact, kind) in [
        (&report.trace, ArtifactKind::Trace),
        (&report.samples, ArtifactKind::Samples),
    ] {
        if let Err(message) = artifact.text() {
            return Err(IngestError::ToolFailed {
                node: report.node.clone(),
                artifact: kind,
                message: message.to_string(),
            });
        }
    }
    Ok(())
}

//! The aggregation pipeline, from raw node reports to the rendered graph.
//!
//! ```text
//! NodeReport ──▶ ingest() ──▶ NodeData ─┐
//! NodeReport ──▶ ingest() ──▶ NodeData ─┼──▶ Topology::build() ──▶ normalize() ──▶ NormalizedGraph
//! NodeReport ──▶ ingest() ──▶ NodeData ─┘
//! ```
//!
//! The whole run fails on the first node that cannot be ingested; there is
//! no partial graph.

use fleetmap_types::NormalizedGraph;
use tracing::debug;

use super::identity::resolve_identities;
use super::normalize::{normalize, NormalizeSettings};
use super::stats::parse_stats;
use super::topology::{EdgeStates, NodeData, Topology};
use super::trace::parse_trace;
use crate::error::{ArtifactKind, IngestError};
use crate::source::{Artifact, NodeReport};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineSettings {
    pub edge_states: EdgeStates,
    pub normalize: NormalizeSettings,
}

/// Parse one node's artifacts and resolve its endpoint identities.
pub fn ingest(report: &NodeReport) -> Result<NodeData, IngestError> {
    let node = report.node.as_str();

    let trace = artifact_text(node, &report.trace, ArtifactKind::Trace)?;
    let records = parse_trace(trace).map_err(|source| IngestError::Malformed {
        node: node.to_string(),
        artifact: ArtifactKind::Trace,
        source,
    })?;

    let samples = artifact_text(node, &report.samples, ArtifactKind::Samples)?;
    let stats = parse_stats(samples).map_err(|source| IngestError::Malformed {
        node: node.to_string(),
        artifact: ArtifactKind::Samples,
        source,
    })?;

    let identities = resolve_identities(node, &records);
    debug!(
        node,
        records = records.len(),
        processes = stats.len(),
        endpoints = identities.len(),
        "node ingested"
    );

    Ok(NodeData {
        node: node.to_string(),
        records,
        stats,
        identities,
    })
}

/// Run the full pipeline over a complete set of node reports.
pub fn aggregate(
    reports: &[NodeReport],
    settings: &EngineSettings,
) -> Result<NormalizedGraph, IngestError> {
    let nodes = reports.iter().map(ingest).collect::<Result<Vec<_>, _>>()?;
    let topology = Topology::build(&nodes, &settings.edge_states);
    Ok(normalize(&topology, &settings.normalize))
}

fn artifact_text<'a>(
    node: &str,
    artifact: &'a Artifact,
    kind: ArtifactKind,
) -> Result<&'a str, IngestError> {
    artifact.text().map_err(|message| IngestError::ToolFailed {
        node: node.to_string(),
        artifact: kind,
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "STATE,PID,COMM,LADDR,LPORT,RADDR,RPORT,TX_KB,RX_KB,MS,TS";

    #[test]
    fn test_ingest_attaches_identities_and_stats() {
        let trace = format!("{HEADER}\n-1,7,redis,10.0.0.5,6379,10.0.0.6,40000,1,2,3,0\n");
        let top = "  7 redis 20 0 1 1 1 S 2.0 3.0 0:01.00 redis-server\n";
        let data = ingest(&NodeReport::from_text("cache", trace, top)).unwrap();

        assert_eq!(data.records.len(), 1);
        assert_eq!(data.stats[&7].mem_percent, 3.0);
        assert_eq!(data.identities.len(), 1);
    }

    #[test]
    fn test_failure_marker_is_fatal() {
        let report = NodeReport::new("a", Artifact::failed("timeout"), Artifact::Text(String::new()));
        let err = aggregate(&[report], &EngineSettings::default()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::ToolFailed { artifact: ArtifactKind::Trace, .. }
        ));
    }

    #[test]
    fn test_one_bad_node_fails_the_run() {
        let good = NodeReport::from_text("good", HEADER, "");
        let bad = NodeReport::from_text("bad", format!("{HEADER}\n-1,x,a,1,1,1,1,0,0,0,0\n"), "");
        let err = aggregate(&[good, bad], &EngineSettings::default()).unwrap_err();
        assert_eq!(err.node(), Some("bad"));
    }

    #[test]
    fn test_negative_range_scores_offset() {
        let trace = format!("{HEADER}\n-1,1,svc,10.0.0.1,80,10.0.0.2,9000,50,100,5,0\n");
        let settings = EngineSettings {
            normalize: NormalizeSettings {
                range: -10.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let graph = aggregate(&[NodeReport::from_text("a", trace, "")], &settings).unwrap();
        assert!(graph.nodes.iter().all(|n| n.norm_data == 5 && n.norm_lat == 5));
    }

    #[test]
    fn test_malformed_samples_name_artifact() {
        let report = NodeReport::from_text("a", HEADER, "12 short line");
        match ingest(&report).unwrap_err() {
            IngestError::Malformed { artifact, .. } => assert_eq!(artifact, ArtifactKind::Samples),
            other => panic!("unexpected error: {other}"),
        }
    }
}

//! Persisting the rendered graph.
//!
//! The graph is written as JSON; embedding it into a viewer document is the
//! rendering layer's job.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use fleetmap_types::NormalizedGraph;
use serde_json::json;

/// Write `graph` as pretty-printed JSON to `path`.
pub fn write_graph(graph: &NormalizedGraph, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(graph)?;
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Node and link counts, overall and per category.
pub fn summary(graph: &NormalizedGraph) -> serde_json::Value {
    let per_category: serde_json::Map<String, serde_json::Value> = graph
        .categories
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let count = graph.nodes.iter().filter(|n| n.category == i).count();
            (c.name.clone(), json!(count))
        })
        .collect();

    json!({
        "nodes": graph.nodes.len(),
        "links": graph.links.len(),
        "categories": per_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetmap_types::{CategoryLabel, GraphLink, EXTERNAL_CATEGORY};
    use tempfile::TempDir;

    fn sample_graph() -> NormalizedGraph {
        NormalizedGraph {
            categories: vec![
                CategoryLabel::new("web"),
                CategoryLabel::new(EXTERNAL_CATEGORY),
            ],
            links: vec![GraphLink {
                source: "a".to_string(),
                target: "b".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_write_graph() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.json");
        write_graph(&sample_graph(), &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["links"][0]["source"], "a");
        assert_eq!(written["categories"][1]["name"], "external");
        assert_eq!(written["version"]["major"], 1);
    }

    #[test]
    fn test_write_graph_bad_path() {
        let err = write_graph(&sample_graph(), Path::new("/nonexistent/dir/graph.json"));
        assert!(err.is_err());
    }

    #[test]
    fn test_summary_counts() {
        let s = summary(&sample_graph());
        assert_eq!(s["nodes"], 0);
        assert_eq!(s["links"], 1);
        assert_eq!(s["categories"]["web"], 0);
    }
}

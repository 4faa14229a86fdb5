//! The rendered topology graph handed to the visualization layer.

use crate::{SchemaVersion, EXTERNAL_CATEGORY};

/// Final output of one aggregation run.
///
/// Nodes carry normalized visual weights rather than raw accumulations, so
/// processes of very different scale can be drawn on one chart.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizedGraph {
    pub version: SchemaVersion,
    pub nodes: Vec<GraphNode>,
    /// One label per contributing node, in report order, then `external`.
    pub categories: Vec<CategoryLabel>,
    pub links: Vec<GraphLink>,
}

impl NormalizedGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Index of the `external` category.
    pub fn external_category(&self) -> Option<usize> {
        self.categories
            .iter()
            .position(|c| c.name == EXTERNAL_CATEGORY)
    }
}

/// A process (or unresolved endpoint) in the rendered graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphNode {
    pub id: String,
    /// Display name; identical to `data_name`.
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "dataName"))]
    pub data_name: String,
    #[cfg_attr(feature = "serde", serde(rename = "latName"))]
    pub lat_name: String,
    #[cfg_attr(feature = "serde", serde(rename = "cpuName"))]
    pub cpu_name: String,
    #[cfg_attr(feature = "serde", serde(rename = "memName"))]
    pub mem_name: String,
    #[cfg_attr(feature = "serde", serde(rename = "normData"))]
    pub norm_data: u32,
    #[cfg_attr(feature = "serde", serde(rename = "normLat"))]
    pub norm_lat: u32,
    #[cfg_attr(feature = "serde", serde(rename = "normCPU"))]
    pub norm_cpu: u32,
    #[cfg_attr(feature = "serde", serde(rename = "normMEM"))]
    pub norm_mem: u32,
    /// Default drawing size; identical to `norm_data`.
    #[cfg_attr(feature = "serde", serde(rename = "symbolSize"))]
    pub symbol_size: u32,
    /// Index into [`NormalizedGraph::categories`].
    pub category: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryLabel {
    pub name: String,
}

impl CategoryLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A directed communication path between two graph nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphLink {
    pub source: String,
    pub target: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_node() -> GraphNode {
        GraphNode {
            id: "svc (1, a)".to_string(),
            name: "svc (1, a)\ntx: 0kb/s\nrx: 0kb/s".to_string(),
            data_name: "svc (1, a)\ntx: 0kb/s\nrx: 0kb/s".to_string(),
            lat_name: "svc (1, a)\nrtt: 0ms".to_string(),
            cpu_name: "svc (1, a)\ncpu: 0%".to_string(),
            mem_name: "svc (1, a)\nmem: 0%".to_string(),
            norm_data: 5,
            norm_lat: 5,
            norm_cpu: 5,
            norm_mem: 5,
            symbol_size: 5,
            category: 0,
        }
    }

    #[test]
    fn test_external_category_lookup() {
        let graph = NormalizedGraph {
            categories: vec![CategoryLabel::new("a"), CategoryLabel::new(EXTERNAL_CATEGORY)],
            ..Default::default()
        };
        assert_eq!(graph.external_category(), Some(1));
        assert!(graph.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_node_field_names() {
        let value = serde_json::to_value(sample_node()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "id", "name", "dataName", "latName", "cpuName", "memName", "normData", "normLat",
            "normCPU", "normMEM", "symbolSize", "category",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 12);
    }
}

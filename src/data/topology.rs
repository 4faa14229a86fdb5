//! Fleet-wide communication graph construction.
//!
//! Every node's records are folded into one graph of processes. Endpoints
//! are attributed to processes through each node's [`Identities`]; endpoints
//! no node can attribute become `external` graph nodes keyed by their raw
//! `address:port`.
//!
//! ```text
//! NodeData (per node: records, stats, identities)
//!        │
//!        ▼
//! Topology::register()   every winning identity becomes a node
//!        │
//!        ▼
//! Topology::fold_node()  edge-eligible records add edges and accumulate
//!        │               rx/tx/latency/calls
//!        ▼
//! Topology (raw accumulations, ready for normalization)
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use fleetmap_types::{ConnectionRecord, Endpoint, ProcessStats};
use tracing::debug;

use super::identity::{Identities, Owner};

/// Everything known about one reporting node after ingestion.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub node: String,
    pub records: Vec<ConnectionRecord>,
    pub stats: BTreeMap<u32, ProcessStats>,
    pub identities: Identities,
}

/// State codes whose records take part in edge construction.
///
/// The codes are opaque values from the connection sampler's state model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeStates(BTreeSet<i32>);

impl EdgeStates {
    pub fn new(codes: impl IntoIterator<Item = i32>) -> Self {
        Self(codes.into_iter().collect())
    }

    pub fn contains(&self, state: i32) -> bool {
        self.0.contains(&state)
    }
}

impl Default for EdgeStates {
    fn default() -> Self {
        Self::new([-1, -2])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// A process on the named node.
    Node(String),
    /// An endpoint no node could attribute to a process.
    External,
}

/// Raw per-node totals before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Accumulators {
    pub calls: u64,
    pub latency_ms: f64,
    pub rx_kb: f64,
    pub tx_kb: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyNode {
    pub id: String,
    pub category: Category,
    /// Averaged resource usage; zero when the process was never sampled.
    pub stats: ProcessStats,
    pub totals: Accumulators,
}

impl TopologyNode {
    fn process(id: String, node: &str, stats: ProcessStats) -> Self {
        Self {
            id,
            category: Category::Node(node.to_string()),
            stats,
            totals: Accumulators::default(),
        }
    }

    fn external(id: String) -> Self {
        Self {
            id,
            category: Category::External,
            stats: ProcessStats::default(),
            totals: Accumulators::default(),
        }
    }

    pub fn is_external(&self) -> bool {
        self.category == Category::External
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyEdge {
    pub source: String,
    pub target: String,
    /// Node whose trace observed this path.
    pub observed_on: String,
}

/// The assembled graph with raw accumulations.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    nodes: Vec<TopologyNode>,
    index: HashMap<String, usize>,
    edges: Vec<TopologyEdge>,
    reporters: Vec<String>,
}

impl Topology {
    /// Build the graph for a complete set of nodes.
    pub fn build(nodes: &[NodeData], edge_states: &EdgeStates) -> Self {
        let topology = (0..nodes.len()).fold(Self::register(nodes), |topology, i| {
            topology.fold_node(nodes, i, edge_states)
        });
        debug!(
            nodes = topology.nodes.len(),
            edges = topology.edges.len(),
            "topology built"
        );
        topology
    }

    /// Start a graph holding one node per winning identity of every node.
    fn register(nodes: &[NodeData]) -> Self {
        let mut topology = Self {
            reporters: nodes.iter().map(|n| n.node.clone()).collect(),
            ..Default::default()
        };
        for data in nodes {
            for (_, owner) in data.identities.iter() {
                if topology.index.contains_key(&owner.identity) {
                    continue;
                }
                let stats = data.stats.get(&owner.pid).copied().unwrap_or_default();
                topology.insert(TopologyNode::process(owner.identity.clone(), &data.node, stats));
            }
        }
        topology
    }

    /// Fold one node's edge-eligible records into the graph.
    fn fold_node(mut self, nodes: &[NodeData], own: usize, edge_states: &EdgeStates) -> Self {
        let data = &nodes[own];
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for record in data.records.iter().filter(|r| edge_states.contains(r.state)) {
            let source = self.endpoint_node(nodes, own, &record.local);
            let target = self.endpoint_node(nodes, own, &record.remote);

            if seen.insert((source.clone(), target.clone())) {
                self.edges.push(TopologyEdge {
                    source: source.clone(),
                    target: target.clone(),
                    observed_on: data.node.clone(),
                });
            }

            if let Some(node) = self.node_mut(&source) {
                node.totals.calls += 1;
                node.totals.latency_ms += record.latency_ms;
                node.totals.rx_kb += record.rx_kb;
                node.totals.tx_kb += record.tx_kb;
            }

            // The far end of a known process sees the same transfer reversed.
            if let Some(node) = self.node_mut(&target).filter(|n| !n.is_external()) {
                node.totals.rx_kb += record.tx_kb;
                node.totals.tx_kb += record.rx_kb;
            }
        }

        self
    }

    /// Id of the graph node for an endpoint, creating an external node when
    /// no reporting node owns it.
    fn endpoint_node(&mut self, nodes: &[NodeData], own: usize, endpoint: &Endpoint) -> String {
        if let Some(owner) = resolve(nodes, own, endpoint) {
            return owner.identity.clone();
        }
        let id = endpoint.to_string();
        if !self.index.contains_key(&id) {
            self.insert(TopologyNode::external(id.clone()));
        }
        id
    }

    fn insert(&mut self, node: TopologyNode) {
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut TopologyNode> {
        let i = *self.index.get(id)?;
        self.nodes.get_mut(i)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[TopologyNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&TopologyNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn edges(&self) -> &[TopologyEdge] {
        &self.edges
    }

    /// Reporting node ids, in report order.
    pub fn reporters(&self) -> &[String] {
        &self.reporters
    }
}

/// Owner of an endpoint: the observing node's own vote first, then the other
/// nodes in report order.
fn resolve<'a>(nodes: &'a [NodeData], own: usize, endpoint: &Endpoint) -> Option<&'a Owner> {
    nodes[own].identities.get(endpoint).or_else(|| {
        nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != own)
            .find_map(|(_, n)| n.identities.get(endpoint))
    })
}

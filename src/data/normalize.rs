//! Min-max normalization of node metrics into visual weights.
//!
//! Each metric is rescaled independently so a chart can size nodes by data
//! rate, latency, CPU or memory on the same fixed scale. The minimum is
//! floored at zero since every accumulator starts there.

use std::time::Duration;

use fleetmap_types::{CategoryLabel, GraphLink, GraphNode, NormalizedGraph, EXTERNAL_CATEGORY};

use super::topology::{Category, Topology, TopologyNode};

/// Width of the visual-weight scale.
pub const DEFAULT_RANGE: f64 = 20.0;
/// Smallest visual weight.
pub const DEFAULT_OFFSET: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeSettings {
    /// Capture window length; turns accumulated kilobytes into kb/s.
    pub window: Duration,
    pub range: f64,
    pub offset: f64,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15),
            range: DEFAULT_RANGE,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl NormalizeSettings {
    fn per_second(&self, kb: f64) -> f64 {
        let secs = self.window.as_secs_f64();
        if secs > 0.0 {
            kb / secs
        } else {
            kb
        }
    }
}

/// Observed bounds of one metric, always including zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
        values.into_iter().fold(Self { min: 0.0, max: 0.0 }, |b, v| Self {
            min: b.min.min(v),
            max: b.max.max(v),
        })
    }

    /// Scale `value` into `[offset, offset + range]`.
    ///
    /// When every node has the same value there is nothing to compare, and
    /// every node gets `offset`. A negative range collapses the scale onto
    /// `offset`; NaN settings score 0.
    pub fn score(&self, value: f64, settings: &NormalizeSettings) -> u32 {
        let low = settings.offset;
        let high = (settings.offset + settings.range).max(low);
        let span = self.max - self.min;
        if span <= 0.0 || !span.is_finite() {
            return low.round() as u32;
        }
        let scaled = ((value - self.min) / span * settings.range + settings.offset).round();
        // Float-to-int casts saturate, and NaN becomes 0.
        scaled.max(low).min(high) as u32
    }
}

fn data_rate(node: &TopologyNode, settings: &NormalizeSettings) -> f64 {
    settings.per_second(node.totals.rx_kb + node.totals.tx_kb)
}

/// Rescale every metric of a built topology and attach display labels.
pub fn normalize(topology: &Topology, settings: &NormalizeSettings) -> NormalizedGraph {
    let nodes = topology.nodes();

    let data = Bounds::of(nodes.iter().map(|n| data_rate(n, settings)));
    let latency = Bounds::of(nodes.iter().map(|n| n.totals.latency_ms));
    let cpu = Bounds::of(nodes.iter().map(|n| n.stats.cpu_percent));
    let mem = Bounds::of(nodes.iter().map(|n| n.stats.mem_percent));

    let reporters = topology.reporters();
    let external_index = reporters.len();

    let graph_nodes = nodes
        .iter()
        .map(|n| {
            let norm_data = data.score(data_rate(n, settings), settings);
            let data_name = format!(
                "{}\ntx: {}kb/s\nrx: {}kb/s",
                n.id,
                settings.per_second(n.totals.tx_kb).round() as u64,
                settings.per_second(n.totals.rx_kb).round() as u64,
            );
            let category = match &n.category {
                Category::Node(node) => reporters
                    .iter()
                    .position(|r| r == node)
                    .unwrap_or(external_index),
                Category::External => external_index,
            };

            GraphNode {
                id: n.id.clone(),
                name: data_name.clone(),
                data_name,
                lat_name: format!("{}\nrtt: {}ms", n.id, n.totals.latency_ms),
                cpu_name: format!("{}\ncpu: {}%", n.id, n.stats.cpu_percent.round() as u64),
                mem_name: format!("{}\nmem: {}%", n.id, n.stats.mem_percent.round() as u64),
                norm_data,
                norm_lat: latency.score(n.totals.latency_ms, settings),
                norm_cpu: cpu.score(n.stats.cpu_percent, settings),
                norm_mem: mem.score(n.stats.mem_percent, settings),
                symbol_size: norm_data,
                category,
            }
        })
        .collect();

    let categories = reporters
        .iter()
        .map(|r| CategoryLabel::new(r.as_str()))
        .chain(std::iter::once(CategoryLabel::new(EXTERNAL_CATEGORY)))
        .collect();

    let links = topology
        .edges()
        .iter()
        .map(|e| GraphLink {
            source: e.source.clone(),
            target: e.target.clone(),
        })
        .collect();

    NormalizedGraph {
        nodes: graph_nodes,
        categories,
        links,
        ..Default::default()
    }
}

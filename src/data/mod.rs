//! Parsing, identity resolution, graph construction and normalization.
//!
//! ## Submodules
//!
//! - [`trace`]: Connection trace CSV into [`ConnectionRecord`](fleetmap_types::ConnectionRecord)s
//! - [`stats`]: `top -b` output into per-process averages
//! - [`identity`]: Frequency vote of which process owns each local endpoint
//! - [`topology`]: Fleet-wide graph with raw accumulations
//! - [`normalize`]: Per-metric min-max scaling into visual weights
//! - [`engine`]: The pipeline tying the above together
//! - [`duration`]: Parsing of capture window strings (e.g. "15s")
//!
//! ## Data Flow
//!
//! ```text
//! NodeReport (raw text per node)
//!        │
//!        ├──▶ trace::parse_trace() ──▶ identity::resolve_identities()
//!        ├──▶ stats::parse_stats()
//!        ▼
//! NodeData ──▶ Topology::build() ──▶ normalize() ──▶ NormalizedGraph
//! ```

pub mod duration;
pub mod engine;
pub mod identity;
pub mod normalize;
pub mod stats;
pub mod topology;
pub mod trace;

pub use engine::{aggregate, ingest, EngineSettings};
pub use identity::{Identities, IdentityResolver, Owner};
pub use normalize::{normalize, Bounds, NormalizeSettings};
pub use topology::{Accumulators, Category, EdgeStates, NodeData, Topology, TopologyEdge, TopologyNode};

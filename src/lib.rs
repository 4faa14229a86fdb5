//! # fleetmap
//!
//! Infers a process communication topology across a fleet of hosts from
//! per-host connection traces and resource samples, and renders it as a
//! graph with normalized, comparable node weights.
//!
//! Each host contributes one capture window: a connection trace (which
//! process owned which socket, latency, bytes moved) and `top` samples (CPU
//! and memory per process). Hosts share no identity namespace, so endpoints
//! are attributed to processes by frequency vote, and endpoints nobody owns
//! become `external` nodes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  ┌─────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐ │
//! │  │ source  │───▶│  roster  │───▶│     data     │───▶│  report  │ │
//! │  │ (input) │    │(complete)│    │ (aggregation)│    │  (JSON)  │ │
//! │  └─────────┘    └──────────┘    └──────────────┘    └──────────┘ │
//! │       ▲                                                          │
//! │       └── DirectorySource | FileSource | ChannelSource           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Where node reports come from ([`ReportSource`] trait)
//! - **[`roster`]**: Which nodes are expected, and whether all have reported
//! - **[`data`]**: Parsing, identity resolution, topology and normalization
//! - **[`report`]**: Writing the rendered graph
//! - **[`config`]**: Layered settings (file, environment)
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Aggregate persisted artifacts under breakfastResults/<node>/
//! fleetmap --results breakfastResults --output graph.json
//!
//! # Aggregate agent upload payloads
//! fleetmap --submission web-1.json --submission db-1.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use fleetmap::{aggregate, EngineSettings, NodeReport};
//!
//! let trace = "STATE,PID,COMM,LADDR,LPORT,RADDR,RPORT,TX_KB,RX_KB,MS,TS\n\
//!              -1,123,svc,10.0.0.1,80,10.0.0.2,9000,50,100,5,0\n";
//! let top = "123 root 20 0 1 1 1 S 10.0 5.0 0:01.00 svc\n";
//!
//! let reports = vec![NodeReport::from_text("nodeA", trace, top)];
//! let graph = aggregate(&reports, &EngineSettings::default()).unwrap();
//!
//! assert_eq!(graph.nodes.len(), 2);
//! assert_eq!(graph.links[0].target, "10.0.0.2:9000");
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod roster;
pub mod source;

// Re-export main types for convenience
pub use config::Settings;
pub use data::{aggregate, EngineSettings};
pub use error::{ArtifactKind, IngestError, ParseError};
pub use fleetmap_types::{NormalizedGraph, EXTERNAL_CATEGORY};
pub use roster::{JoinPolicy, Roster};
pub use source::{
    Artifact, ChannelSource, DirectorySource, FileSource, NodeReport, ReportSource, Submission,
};

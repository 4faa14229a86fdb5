//! # fleetmap-types
//!
//! Core types for fleet topology inference. This crate defines the records
//! produced by the per-host samplers and the rendered graph consumed by the
//! visualization layer, so that collectors, the aggregation engine and
//! renderers agree on one schema.
//!
//! ## Features
//!
//! - `serde`: JSON serialization via serde. The rendered graph uses the
//!   camelCase field names the chart layer expects (`dataName`, `normCPU`, ...).
//!
//! ## Example
//!
//! ```rust
//! use fleetmap_types::{ConnectionRecord, Endpoint};
//!
//! let record = ConnectionRecord::builder()
//!     .local(Endpoint::new("10.0.0.1", 80))
//!     .remote(Endpoint::new("10.0.0.2", 9000))
//!     .state(-1)
//!     .latency_ms(5.0)
//!     .kilobytes(100.0, 50.0)
//!     .process("svc", 123)
//!     .build();
//!
//! assert_eq!(record.local.to_string(), "10.0.0.1:80");
//! assert_eq!(record.identity("nodeA"), "svc (123, nodeA)");
//! ```
//!
//! ## Schema Version
//!
//! The current schema version is **1**. The version is included in rendered
//! graphs so consumers can handle format evolution.

mod endpoint;
mod graph;
mod record;
mod version;

pub use endpoint::*;
pub use graph::*;
pub use record::*;
pub use version::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the graph format.
pub const SCHEMA_VERSION: u32 = 1;

/// Category label given to endpoints no node could resolve to a process.
pub const EXTERNAL_CATEGORY: &str = "external";

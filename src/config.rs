//! Run configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `FLEETMAP_*` environment variables. Command-line flags override the result
//! in `main`.
//!
//! ```toml
//! window = "15s"
//! edge_states = [-1, -2]
//! results_dir = "breakfastResults"
//! output = "graph.json"
//! nodes = ["web-1", "db-1"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::normalize::{DEFAULT_OFFSET, DEFAULT_RANGE};
use crate::data::{EdgeStates, EngineSettings, NormalizeSettings};

/// Config file read when no path is given, if it exists.
pub const DEFAULT_CONFIG: &str = "fleetmap.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Capture window length, e.g. "15s".
    pub window: String,
    /// Connection state codes that take part in edge construction.
    pub edge_states: Vec<i32>,
    /// Width of the visual-weight scale.
    pub range: f64,
    /// Smallest visual weight.
    pub offset: f64,
    /// Directory of persisted per-node artifacts.
    pub results_dir: PathBuf,
    /// Where the rendered graph is written.
    pub output: PathBuf,
    /// Expected nodes; empty means whatever is found.
    pub nodes: Vec<String>,
    /// Wait between empty polls of a live source, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: "15s".to_string(),
            edge_states: vec![-1, -2],
            range: DEFAULT_RANGE,
            offset: DEFAULT_OFFSET,
            results_dir: PathBuf::from("breakfastResults"),
            output: PathBuf::from("graph.json"),
            nodes: Vec::new(),
            poll_interval_ms: 100,
        }
    }
}

impl Settings {
    /// Load settings from `path` (required if given) or [`DEFAULT_CONFIG`]
    /// (optional), layered with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG)).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("FLEETMAP")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("edge_states")
                    .with_list_parse_key("nodes"),
            )
            .build()
            .context("failed to load configuration")?;

        config
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Validated engine settings.
    pub fn engine(&self) -> Result<EngineSettings> {
        let window = parse_duration(&self.window)
            .with_context(|| format!("invalid window {:?}", self.window))?;
        if window.is_zero() {
            bail!("window must be longer than zero");
        }
        if !(self.range.is_finite() && self.range >= 0.0) {
            bail!("range must be a non-negative number, got {}", self.range);
        }
        if !(self.offset.is_finite() && self.offset >= 0.0) {
            bail!("offset must be a non-negative number, got {}", self.offset);
        }
        if self.edge_states.is_empty() {
            bail!("edge_states must name at least one state code");
        }

        Ok(EngineSettings {
            edge_states: EdgeStates::new(self.edge_states.iter().copied()),
            normalize: NormalizeSettings {
                window,
                range: self.range,
                offset: self.offset,
            },
        })
    }
}

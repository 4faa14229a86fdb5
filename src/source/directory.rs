//! Directory-based report source.
//!
//! Reads the artifacts a coordinator persisted for each node:
//!
//! ```text
//! breakfastResults/
//! ├── web-1/
//! │   ├── breakfast.csv
//! │   └── top.txt
//! └── db-1/
//!     ├── breakfast.csv
//!     └── top.txt
//! ```

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Artifact, NodeReport, ReportSource};

/// File name of the persisted connection trace.
pub const TRACE_FILE: &str = "breakfast.csv";
/// File name of the persisted resource samples.
pub const SAMPLES_FILE: &str = "top.txt";

/// A source yielding one report per node directory.
///
/// A node whose artifact file cannot be read yields a failure marker for
/// that artifact rather than being skipped, so a missing file aborts the run
/// instead of silently dropping the node.
#[derive(Debug)]
pub struct DirectorySource {
    root: PathBuf,
    description: String,
    /// Nodes still to be read; `None` until discovered.
    pending: Option<VecDeque<String>>,
    last_error: Option<String>,
}

impl DirectorySource {
    /// Read every node subdirectory of `root`, in name order.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let description = format!("directory: {}", root.display());
        Self {
            root,
            description,
            pending: None,
            last_error: None,
        }
    }

    /// Read only the given nodes, in the given order.
    pub fn with_nodes<P: AsRef<Path>>(root: P, nodes: Vec<String>) -> Self {
        let mut source = Self::new(root);
        source.pending = Some(nodes.into());
        source
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Node directory names under the root, sorted.
    pub fn discover(&self) -> std::io::Result<Vec<String>> {
        let mut nodes = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                nodes.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        nodes.sort();
        Ok(nodes)
    }

    fn read_artifact(&self, node: &str, file: &str) -> Artifact {
        let path = self.root.join(node).join(file);
        match fs::read_to_string(&path) {
            Ok(text) => Artifact::Text(text),
            Err(e) => Artifact::failed(format!("Read error: {}: {}", path.display(), e)),
        }
    }
}

impl ReportSource for DirectorySource {
    fn poll(&mut self) -> Option<NodeReport> {
        if self.pending.is_none() {
            match self.discover() {
                Ok(nodes) => {
                    debug!(count = nodes.len(), root = %self.root.display(), "discovered nodes");
                    self.pending = Some(nodes.into());
                }
                Err(e) => {
                    self.last_error = Some(format!("Read error: {}", e));
                    self.pending = Some(VecDeque::new());
                }
            }
        }

        let node = self.pending.as_mut()?.pop_front()?;
        let trace = self.read_artifact(&node, TRACE_FILE);
        let samples = self.read_artifact(&node, SAMPLES_FILE);
        Some(NodeReport::new(node, trace, samples))
    }

    fn is_finished(&self) -> bool {
        self.pending.as_ref().is_some_and(VecDeque::is_empty)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_node(root: &Path, node: &str, trace: &str, top: Option<&str>) {
        let dir = root.join(node);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(TRACE_FILE), trace).unwrap();
        if let Some(top) = top {
            fs::write(dir.join(SAMPLES_FILE), top).unwrap();
        }
    }

    #[test]
    fn test_reads_nodes_in_name_order() {
        let tmp = TempDir::new().unwrap();
        write_node(tmp.path(), "b-node", "trace-b", Some("top-b"));
        write_node(tmp.path(), "a-node", "trace-a", Some("top-a"));
        fs::write(tmp.path().join("stray.txt"), "not a node").unwrap();

        let mut source = DirectorySource::new(tmp.path());
        assert!(!source.is_finished());

        let first = source.poll().unwrap();
        assert_eq!(first.node, "a-node");
        assert_eq!(first.trace, Artifact::Text("trace-a".to_string()));
        assert_eq!(first.samples, Artifact::Text("top-a".to_string()));

        assert_eq!(source.poll().unwrap().node, "b-node");
        assert!(source.poll().is_none());
        assert!(source.is_finished());
    }

    #[test]
    fn test_missing_file_becomes_failure_marker() {
        let tmp = TempDir::new().unwrap();
        write_node(tmp.path(), "web", "trace", None);

        let mut source = DirectorySource::new(tmp.path());
        let report = source.poll().unwrap();
        assert!(!report.trace.is_failure());
        assert!(report.samples.is_failure());
        assert!(report.samples.text().unwrap_err().contains("top.txt"));
    }

    #[test]
    fn test_explicit_node_list() {
        let tmp = TempDir::new().unwrap();
        write_node(tmp.path(), "a", "t", Some("s"));
        write_node(tmp.path(), "b", "t", Some("s"));

        let mut source = DirectorySource::with_nodes(tmp.path(), vec!["b".to_string()]);
        assert_eq!(source.poll().unwrap().node, "b");
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_missing_root() {
        let mut source = DirectorySource::new("/nonexistent/breakfastResults");
        assert!(source.poll().is_none());
        assert!(source.is_finished());
        assert!(source.error().unwrap().contains("Read error"));
        assert_eq!(source.description(), "directory: /nonexistent/breakfastResults");
    }
}

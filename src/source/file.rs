//! Submission file source.
//!
//! Reads agent upload payloads saved as JSON files, one per node.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use super::{NodeReport, ReportSource, Submission};

/// A source that reads one [`Submission`] per JSON file.
///
/// Files are read lazily, one per poll. A file that cannot be read or
/// parsed yields no report and is recorded as the source error, which
/// aborts collection.
#[derive(Debug)]
pub struct FileSource {
    pending: VecDeque<PathBuf>,
    description: String,
    last_error: Option<String>,
}

impl FileSource {
    /// Create a new file source for the given submission files.
    pub fn new<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Self {
        let pending: VecDeque<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();
        let description = format!("files: {} submissions", pending.len());
        Self {
            pending,
            description,
            last_error: None,
        }
    }

    fn read_file(&mut self, path: &Path) -> Option<Submission> {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(submission) => Some(submission),
                Err(e) => {
                    self.last_error = Some(format!("Parse error: {}: {}", path.display(), e));
                    None
                }
            },
            Err(e) => {
                self.last_error = Some(format!("Read error: {}: {}", path.display(), e));
                None
            }
        }
    }
}

impl ReportSource for FileSource {
    fn poll(&mut self) -> Option<NodeReport> {
        while let Some(path) = self.pending.pop_front() {
            if let Some(submission) = self.read_file(&path) {
                return Some(submission.into());
            }
        }
        None
    }

    fn is_finished(&self) -> bool {
        self.pending.is_empty()
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
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json(host: &str) -> String {
        format!(r#"{{"hostname":"{host}","data":{{"breakfast":"","top":""}}}}"#)
    }

    #[test]
    fn test_file_source_reads_submissions() {
        let mut a = NamedTempFile::new().unwrap();
        writeln!(a, "{}", sample_json("a")).unwrap();
        let mut b = NamedTempFile::new().unwrap();
        writeln!(b, "{}", sample_json("b")).unwrap();

        let mut source = FileSource::new([a.path(), b.path()]);
        assert_eq!(source.description(), "files: 2 submissions");
        assert_eq!(source.poll().unwrap().node, "a");
        assert_eq!(source.poll().unwrap().node, "b");
        assert!(source.poll().is_none());
        assert!(source.is_finished());
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_invalid_json_is_skipped() {
        let mut bad = NamedTempFile::new().unwrap();
        writeln!(bad, "not valid json").unwrap();
        let mut good = NamedTempFile::new().unwrap();
        writeln!(good, "{}", sample_json("good")).unwrap();

        let mut source = FileSource::new([bad.path(), good.path()]);
        assert_eq!(source.poll().unwrap().node, "good");
        assert!(source.error().unwrap().contains("Parse error"));
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new(["/nonexistent/path/submission.json"]);
        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }
}

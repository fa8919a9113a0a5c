//! Artifact sinks
//!
//! Every stage persists its output through an [`ArtifactSink`]. Paths are
//! relative (e.g. `code/main.py`); the sink decides where they land.

use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use crate::{Error, Result};

/// Relative artifact paths written by the pipeline
pub mod paths {
    /// Structured requirements from the analysis stage
    pub const STRUCTURED_REQUIREMENTS: &str = "structured_requirements.json";
    /// First version of the code
    pub const CODE: &str = "code/main.py";
    /// Most recent review
    pub const CODE_REVIEW: &str = "code_review.md";
    /// Most recent revision
    pub const REVISED_CODE: &str = "code/main_revised.py";
    /// Documentation
    pub const DOCUMENTATION: &str = "docs/documentation.md";
    /// Generated tests
    pub const TESTS: &str = "tests/test_main.py";
    /// Generated UI code
    pub const UI_CODE: &str = "code/app.py";
    /// Serialized run report
    pub const RUN_SUMMARY: &str = "run_summary.json";
}

/// Capability for persisting stage output
pub trait ArtifactSink: Send + Sync {
    /// Save `content` at the relative `path`, replacing any previous content
    fn save(&self, content: &str, path: &str) -> Result<()>;
}

/// Writes artifacts under a root directory
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    /// Create a sink rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root and the standard subdirectories
    pub fn prepare(&self) -> Result<()> {
        for sub in ["", "code", "docs", "tests"] {
            std::fs::create_dir_all(self.root.join(sub))?;
        }
        Ok(())
    }

    /// Resolve a relative artifact path, rejecting escapes from the root
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if path.is_empty() || escapes {
            return Err(Error::Other(format!(
                "Artifact path must be relative to the output directory: {}",
                path
            )));
        }

        Ok(self.root.join(relative))
    }
}

impl ArtifactSink for FsSink {
    fn save(&self, content: &str, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, content)?;
        info!(path = %target.display(), bytes = content.len(), "File saved");
        Ok(())
    }
}

/// Records artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Every save in order, as (path, content)
    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Latest content saved at `path`
    pub fn get(&self, path: &str) -> Option<String> {
        self.saved()
            .into_iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c)
    }

    /// Number of saves made to `path`
    pub fn count(&self, path: &str) -> usize {
        self.saved().iter().filter(|(p, _)| p == path).count()
    }
}

impl ArtifactSink for MemorySink {
    fn save(&self, content: &str, path: &str) -> Result<()> {
        self.saved
            .lock()
            .map_err(|_| Error::Other("artifact sink lock poisoned".to_string()))?
            .push((path.to_string(), content.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_sink_creates_parents() {
        let dir = TempDir::new().unwrap();
        let sink = FsSink::new(dir.path().join("output"));

        sink.save("print('hi')", paths::CODE).unwrap();

        let written = std::fs::read_to_string(dir.path().join("output/code/main.py")).unwrap();
        assert_eq!(written, "print('hi')");
    }

    #[test]
    fn test_fs_sink_overwrites() {
        let dir = TempDir::new().unwrap();
        let sink = FsSink::new(dir.path());

        sink.save("first", paths::CODE_REVIEW).unwrap();
        sink.save("second", paths::CODE_REVIEW).unwrap();

        let written = std::fs::read_to_string(dir.path().join("code_review.md")).unwrap();
        assert_eq!(written, "second");
    }

    #[test]
    fn test_fs_sink_prepare() {
        let dir = TempDir::new().unwrap();
        let sink = FsSink::new(dir.path().join("out"));
        sink.prepare().unwrap();

        assert!(dir.path().join("out/code").is_dir());
        assert!(dir.path().join("out/docs").is_dir());
        assert!(dir.path().join("out/tests").is_dir());
    }

    #[test]
    fn test_fs_sink_rejects_escaping_paths() {
        let sink = FsSink::new("/tmp/forge-out");
        assert!(sink.resolve("../etc/passwd").is_err());
        assert!(sink.resolve("/etc/passwd").is_err());
        assert!(sink.resolve("").is_err());
        assert!(sink.resolve("docs/documentation.md").is_ok());
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.save("a", paths::CODE_REVIEW).unwrap();
        sink.save("b", paths::CODE_REVIEW).unwrap();
        sink.save("c", paths::CODE).unwrap();

        assert_eq!(sink.count(paths::CODE_REVIEW), 2);
        assert_eq!(sink.get(paths::CODE_REVIEW), Some("b".to_string()));
        assert_eq!(sink.get(paths::TESTS), None);
        assert_eq!(sink.saved().len(), 3);
    }
}

//! Hooks notified after every graph mutation.
//!
//! Observers receive the graph read-only. A failing observer never aborts the
//! mutation that triggered it; the retriever logs the error and carries on.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::graph::types::{Edge, Node};
use crate::graph::KnowledgeGraph;

pub trait GraphObserver: Send {
    fn graph_changed(&self, graph: &KnowledgeGraph) -> Result<()>;
}

/// Observer that does nothing.
pub struct NoopObserver;

impl GraphObserver for NoopObserver {
    fn graph_changed(&self, _graph: &KnowledgeGraph) -> Result<()> {
        Ok(())
    }
}

/// Serialized form of the whole graph.
#[derive(Debug, Serialize)]
pub struct GraphSnapshot<'a> {
    pub nodes: Vec<&'a Node>,
    pub edges: Vec<&'a Edge>,
}

impl<'a> GraphSnapshot<'a> {
    pub fn of(graph: &'a KnowledgeGraph) -> Self {
        Self {
            nodes: graph.nodes().collect(),
            edges: graph.edges().collect(),
        }
    }
}

/// Writes a JSON snapshot of the graph to a file for external viewers.
pub struct JsonSnapshotObserver {
    path: PathBuf,
}

impl JsonSnapshotObserver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GraphObserver for JsonSnapshotObserver {
    /// Atomic write (tmp + rename) so readers never see a partial file.
    fn graph_changed(&self, graph: &KnowledgeGraph) -> Result<()> {
        let json = serde_json::to_vec_pretty(&GraphSnapshot::of(graph))
            .context("failed to serialize graph snapshot")?;

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to rename snapshot to {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "graph snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::PersonData;
    use tempfile::TempDir;

    #[test]
    fn snapshot_lists_nodes_and_edges() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("graph.json");

        let mut kg = KnowledgeGraph::new();
        kg.add_person("user", PersonData::new("Margaret", 81)).unwrap();
        kg.add_person("alice", PersonData::new("Alice", 52)).unwrap();
        kg.connect("user", "alice", "loves", false).unwrap();

        JsonSnapshotObserver::new(&path).graph_changed(&kg).unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(value["nodes"][1]["data"]["type"], "PERSON");
        assert_eq!(value["nodes"][1]["data"]["data"]["name"], "Alice");
        assert_eq!(value["edges"][0]["relation"], "loves");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let observer = JsonSnapshotObserver::new(tmp.path().join("missing/dir/graph.json"));
        assert!(observer.graph_changed(&KnowledgeGraph::new()).is_err());
    }
}

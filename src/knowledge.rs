//! Knowledge-base file: the people, events and connections a session starts from.
//!
//! ```toml
//! connections = [
//!     ["user", "loves", "alice", true],
//!     ["alice", "hasChild", "tom"],
//! ]
//!
//! [people.user]
//! name = "Margaret"
//! age = 81
//!
//! [people.alice]
//! name = "Alice"
//! age = 52
//! misc = { job = "nurse" }
//!
//! [events.bingo]
//! title = "Bingo"
//! description = "Weekly bingo at the community hall"
//! time = "15:00"
//! day = "Tuesday"
//! location = "Community hall"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::graph::types::{EventData, PersonData, USER_ID};
use crate::graph::{Connection, KnowledgeGraph};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KnowledgeBase {
    pub people: BTreeMap<String, PersonData>,
    pub events: BTreeMap<String, EventData>,
    pub connections: Vec<Connection>,
}

impl KnowledgeBase {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read knowledge base {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid knowledge base {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse knowledge base TOML")
    }

    /// Build the session graph. The `user` person must be present.
    pub fn into_graph(self) -> Result<KnowledgeGraph> {
        anyhow::ensure!(
            self.people.contains_key(USER_ID),
            "knowledge base must define a person with id \"{USER_ID}\""
        );
        let graph = KnowledgeGraph::from_config(self.people, self.events, self.connections)?;
        Ok(graph)
    }
}

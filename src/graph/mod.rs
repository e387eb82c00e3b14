//! In-memory knowledge graph of people and events.
//!
//! A directed multigraph stored as explicit adjacency lists: every node keeps
//! its outgoing edges in insertion order, so text rendering (and therefore
//! embeddings) are reproducible. Nodes carry a version stamp that is bumped
//! whenever their rendered text changes, which the embedding index uses to
//! detect stale vectors.

pub mod types;

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use types::{Edge, EventData, Node, NodeData, NodeType, PersonData};

/// A `(source, relation, target)` connection from configuration, optionally
/// mirrored in the opposite direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawConnection", into = "RawConnection")]
pub struct Connection {
    pub source: String,
    pub relation: String,
    pub target: String,
    pub bidirectional: bool,
}

impl Connection {
    pub fn new(
        source: impl Into<String>,
        relation: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            relation: relation.into(),
            target: target.into(),
            bidirectional: false,
        }
    }

    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }
}

/// Wire form: `["a", "loves", "b"]` or `["a", "loves", "b", true]`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawConnection {
    Directed(String, String, String),
    Flagged(String, String, String, bool),
}

impl From<RawConnection> for Connection {
    fn from(raw: RawConnection) -> Self {
        match raw {
            RawConnection::Directed(source, relation, target) => Self {
                source,
                relation,
                target,
                bidirectional: false,
            },
            RawConnection::Flagged(source, relation, target, bidirectional) => Self {
                source,
                relation,
                target,
                bidirectional,
            },
        }
    }
}

impl From<Connection> for RawConnection {
    fn from(c: Connection) -> Self {
        if c.bidirectional {
            RawConnection::Flagged(c.source, c.relation, c.target, true)
        } else {
            RawConnection::Directed(c.source, c.relation, c.target)
        }
    }
}

/// Directed multigraph over person and event nodes.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    /// Outgoing edges, parallel to `nodes`.
    outgoing: Vec<Vec<Edge>>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from configuration: people first, then events, then
    /// connections, so connections may reference either kind.
    pub fn from_config(
        people: impl IntoIterator<Item = (String, PersonData)>,
        events: impl IntoIterator<Item = (String, EventData)>,
        connections: impl IntoIterator<Item = Connection>,
    ) -> Result<Self> {
        let mut kg = Self::new();
        for (id, person) in people {
            kg.add_person(id, person)?;
        }
        for (id, event) in events {
            kg.add_event(id, event)?;
        }
        for c in connections {
            kg.connect(&c.source, &c.target, &c.relation, c.bidirectional)?;
        }
        tracing::info!(
            nodes = kg.len(),
            edges = kg.edge_count(),
            "knowledge graph built from config"
        );
        Ok(kg)
    }

    pub fn add_person(&mut self, id: impl Into<String>, person: PersonData) -> Result<String> {
        self.insert(id.into(), NodeData::Person(person))
    }

    pub fn add_event(&mut self, id: impl Into<String>, event: EventData) -> Result<String> {
        self.insert(id.into(), NodeData::Event(event))
    }

    fn insert(&mut self, id: String, data: NodeData) -> Result<String> {
        if id.trim().is_empty() {
            return Err(Error::EmptyNodeId);
        }
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateNode(id));
        }
        let data = data.validated(&id)?;
        tracing::debug!(id = %id, node_type = %data.node_type(), "node added");
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(Node {
            id: id.clone(),
            data,
            version: 1,
        });
        self.outgoing.push(Vec::new());
        Ok(id)
    }

    /// Add a `src -(relation)-> dest` edge, plus the reverse edge when
    /// `bidirectional` is set. Both endpoints must already exist.
    pub fn connect(&mut self, src: &str, dest: &str, relation: &str, bidirectional: bool) -> Result<()> {
        let src_idx = self.position(src)?;
        let dest_idx = self.position(dest)?;

        self.push_edge(src_idx, dest, relation);
        if bidirectional {
            self.push_edge(dest_idx, src, relation);
        }
        tracing::debug!(src, relation, dest, bidirectional, "nodes connected");
        Ok(())
    }

    fn push_edge(&mut self, from_idx: usize, to: &str, relation: &str) {
        let source = self.nodes[from_idx].id.clone();
        self.outgoing[from_idx].push(Edge {
            source,
            target: to.to_string(),
            relation: relation.to_string(),
        });
        // Outgoing edges are part of the node's text.
        self.nodes[from_idx].version += 1;
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownNode(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Result<&Node> {
        Ok(&self.nodes[self.position(id)?])
    }

    /// Current version stamp of a node, or `None` if it does not exist.
    pub fn version_of(&self, id: &str) -> Option<u64> {
        self.index.get(id).map(|&i| self.nodes[i].version)
    }

    /// All node ids in insertion order.
    pub fn get_nodes(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Ids of all nodes of one type, in insertion order.
    pub fn nodes_of_type(&self, node_type: NodeType) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.node_type() == node_type)
            .map(|n| n.id.clone())
            .collect()
    }

    pub fn edges_from(&self, id: &str) -> Result<&[Edge]> {
        Ok(&self.outgoing[self.position(id)?])
    }

    /// Every edge, grouped by source node in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.outgoing.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.iter().map(Vec::len).sum()
    }

    /// Nodes reachable from `id` in at most `max_distance` directed hops,
    /// including `id` itself, each listed once in BFS discovery order.
    pub fn get_neighbors(&self, id: &str, max_distance: usize) -> Result<Vec<String>> {
        let start = self.position(id)?;

        let mut visited = HashSet::from([start]);
        let mut order = vec![start];
        let mut queue = VecDeque::from([(start, 0usize)]);

        while let Some((idx, dist)) = queue.pop_front() {
            if dist == max_distance {
                continue;
            }
            for edge in &self.outgoing[idx] {
                let next = self.index[&edge.target];
                if visited.insert(next) {
                    order.push(next);
                    queue.push_back((next, dist + 1));
                }
            }
        }

        Ok(order.into_iter().map(|i| self.nodes[i].id.clone()).collect())
    }

    /// Render a node's attributes followed by its outgoing relations, e.g.
    /// `"alice loves user. attended picnic1."` on the final line.
    pub fn node_to_text(&self, id: &str) -> Result<String> {
        let idx = self.position(id)?;
        let mut text = self.nodes[idx].data.to_text();
        let edges = &self.outgoing[idx];
        if !edges.is_empty() {
            text.push('\n');
            text.push_str(id);
            for edge in edges {
                text.push_str(&format!(" {} {}.", edge.relation, edge.target));
            }
        }
        Ok(text)
    }

    /// Render several nodes in the given order, separated by a blank line.
    pub fn nodes_to_text<S: AsRef<str>>(&self, ids: &[S]) -> Result<String> {
        let texts = ids
            .iter()
            .map(|id| self.node_to_text(id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(texts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn family() -> KnowledgeGraph {
        let mut kg = KnowledgeGraph::new();
        kg.add_person("user", PersonData::new("Margaret", 81)).unwrap();
        kg.add_person("alice", PersonData::new("Alice", 52)).unwrap();
        kg.add_person("tom", PersonData::new("Tom", 19)).unwrap();
        kg.connect("user", "alice", "hasChild", false).unwrap();
        kg.connect("alice", "tom", "hasChild", false).unwrap();
        kg
    }

    #[test]
    fn duplicate_id_is_rejected_across_types() {
        let mut kg = family();
        let err = kg
            .add_event("alice", EventData::new("x", "", "10:00", "Monday", ""))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateNode(id) if id == "alice"));
    }

    #[test]
    fn connect_requires_existing_endpoints() {
        let mut kg = family();
        assert!(matches!(
            kg.connect("user", "nobody", "knows", false),
            Err(Error::UnknownNode(id)) if id == "nobody"
        ));
        assert!(matches!(
            kg.connect("nobody", "user", "knows", false),
            Err(Error::UnknownNode(_))
        ));
        assert_eq!(kg.edge_count(), 2, "failed connect must not add edges");
    }

    #[test]
    fn bidirectional_creates_two_plain_edges() {
        let mut kg = family();
        kg.connect("user", "tom", "loves", true).unwrap();
        assert!(kg.edges_from("user").unwrap().iter().any(|e| e.target == "tom"));
        assert!(kg.edges_from("tom").unwrap().iter().any(|e| e.target == "user" && e.relation == "loves"));
    }

    #[test]
    fn parallel_edges_are_kept() {
        let mut kg = family();
        kg.connect("user", "alice", "loves", false).unwrap();
        let relations: Vec<_> = kg
            .edges_from("user")
            .unwrap()
            .iter()
            .map(|e| e.relation.as_str())
            .collect();
        assert_eq!(relations, vec!["hasChild", "loves"]);
    }

    #[test]
    fn neighbors_respect_direction_and_distance() {
        let kg = family();
        assert_eq!(kg.get_neighbors("user", 0).unwrap(), vec!["user"]);
        assert_eq!(kg.get_neighbors("user", 1).unwrap(), vec!["user", "alice"]);
        assert_eq!(kg.get_neighbors("user", 2).unwrap(), vec!["user", "alice", "tom"]);
        // No edge points back to the user.
        assert_eq!(kg.get_neighbors("tom", 5).unwrap(), vec!["tom"]);
    }

    #[test]
    fn neighbors_terminate_on_cycles() {
        let mut kg = family();
        kg.connect("tom", "user", "visits", false).unwrap();
        let set: HashSet<_> = kg.get_neighbors("user", 10).unwrap().into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn neighbors_of_unknown_node_fail() {
        assert!(matches!(
            family().get_neighbors("ghost", 1),
            Err(Error::UnknownNode(_))
        ));
    }

    #[test]
    fn node_text_lists_outgoing_relations_in_insertion_order() {
        let mut kg = family();
        kg.connect("user", "tom", "loves", false).unwrap();
        assert_eq!(
            kg.node_to_text("user").unwrap(),
            "name: Margaret\nage: 81\nuser hasChild alice. loves tom."
        );
        assert_eq!(kg.node_to_text("tom").unwrap(), "name: Tom\nage: 19");
    }

    #[test]
    fn nodes_to_text_joins_with_blank_line() {
        let kg = family();
        let text = kg.nodes_to_text(&["tom", "alice"]).unwrap();
        assert_eq!(text, "name: Tom\nage: 19\n\nname: Alice\nage: 52\nalice hasChild tom.");
    }

    #[test]
    fn connect_bumps_source_version_only() {
        let mut kg = family();
        let user_v = kg.version_of("user").unwrap();
        let tom_v = kg.version_of("tom").unwrap();
        kg.connect("user", "tom", "loves", false).unwrap();
        assert!(kg.version_of("user").unwrap() > user_v);
        assert_eq!(kg.version_of("tom").unwrap(), tom_v);
    }

    #[test]
    fn from_config_applies_people_events_then_connections() {
        let kg = KnowledgeGraph::from_config(
            vec![("user".to_string(), PersonData::new("Margaret", 81))],
            vec![(
                "bingo".to_string(),
                EventData::new("Bingo", "Weekly bingo", "15:00", "tuesday", "Hall"),
            )],
            vec![Connection::new("user", "attends", "bingo").bidirectional()],
        )
        .unwrap();
        assert_eq!(kg.get_nodes(), vec!["user", "bingo"]);
        assert_eq!(kg.edge_count(), 2);
        match &kg.node("bingo").unwrap().data {
            NodeData::Event(e) => assert_eq!(e.day, "Tuesday"),
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn connection_parses_triples_and_flagged_quads() {
        let parsed: Vec<Connection> =
            serde_json::from_str(r#"[["a","knows","b"],["b","loves","c",true]]"#).unwrap();
        assert_eq!(parsed[0], Connection::new("a", "knows", "b"));
        assert_eq!(parsed[1], Connection::new("b", "loves", "c").bidirectional());
    }
}

//! Context retrieval over the knowledge graph.
//!
//! [`Retriever`] owns a session's graph and embedding index. It builds the
//! context block that seeds every conversation, answers free-text queries with
//! the serialized neighborhoods of the best-matching nodes, and records new
//! events reported by the agent.

pub mod index;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::graph::types::{canonical_day, canonical_time, EventData, NodeType, USER_ID};
use crate::graph::KnowledgeGraph;
use crate::observer::{GraphObserver, NoopObserver};
use index::{EmbeddingIndex, ScoredNode};

/// Anything that can answer a free-text request for information about the user.
pub trait InformationSource {
    fn retrieve(&mut self, description: &str) -> String;
}

pub struct Retriever {
    graph: KnowledgeGraph,
    index: EmbeddingIndex,
    provider: Arc<dyn EmbeddingProvider>,
    observer: Box<dyn GraphObserver>,
    settings: RetrievalConfig,
}

impl Retriever {
    /// Create a retriever, making sure the embedding model is available first.
    pub fn new(
        graph: KnowledgeGraph,
        provider: Arc<dyn EmbeddingProvider>,
        settings: RetrievalConfig,
    ) -> Result<Self> {
        provider.ensure_model_available().map_err(Error::Embedding)?;
        Ok(Self {
            graph,
            index: EmbeddingIndex::new(),
            provider,
            observer: Box::new(NoopObserver),
            settings,
        })
    }

    pub fn with_observer(mut self, observer: Box<dyn GraphObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    /// Embed every node that has no current vector. See [`EmbeddingIndex::compute_node_embeddings`].
    pub fn compute_node_embeddings(&mut self) -> Result<usize> {
        self.index
            .compute_node_embeddings(&self.graph, self.provider.as_ref())
    }

    /// Every candidate node scored against `query`, best first.
    pub fn rank(&mut self, query: &str, category: Option<NodeType>) -> Result<Vec<ScoredNode>> {
        self.index
            .rank(&self.graph, self.provider.as_ref(), query, category)
    }

    pub fn get_matching_node(&mut self, query: &str, top_n: usize) -> Result<Vec<String>> {
        self.index
            .get_matching_node(&self.graph, self.provider.as_ref(), query, top_n, None)
    }

    /// Context block for a new conversation: current day and time, location,
    /// and what the graph knows about the user.
    pub fn get_initial_context(&self, time: &str, day: &str, location: &str) -> Result<String> {
        let time = canonical_time(time).inspect_err(|e| tracing::error!("{e}"))?;
        let day = canonical_day(day).inspect_err(|e| tracing::error!("{e}"))?;

        tracing::info!("retrieving initial context from knowledge graph");
        let node_ids = self
            .graph
            .get_neighbors(USER_ID, self.settings.initial_distance)?;
        let info = self.graph.nodes_to_text(&node_ids)?;
        Ok(format!(
            "{day} {time}\n{location}\nUser information:\n{info}"
        ))
    }

    /// Answer a query with the neighborhoods of the best-matching nodes.
    ///
    /// `category` is `""` for all nodes, or `PERSON`/`EVENT` (any case). An
    /// empty candidate set is reported in the returned text, not as an error.
    pub fn retrieve_information(&mut self, query: &str, category: &str) -> Result<String> {
        tracing::info!(query, category, "retrieving information");

        let node_type = match category.trim() {
            "" => None,
            c => Some(c.parse::<NodeType>()?),
        };
        let has_candidates = self
            .graph
            .nodes()
            .any(|n| n.id != USER_ID && node_type.map_or(true, |t| n.node_type() == t));
        if !has_candidates {
            return Ok(format!(
                "No information found for {query} in category {category}."
            ));
        }

        let matches = self.index.get_matching_node(
            &self.graph,
            self.provider.as_ref(),
            query,
            self.settings.top_n,
            node_type,
        )?;

        let mut info = String::new();
        for node_id in &matches {
            let neighbors = self
                .graph
                .get_neighbors(node_id, self.settings.neighbor_distance)?;
            let node_info = self.graph.nodes_to_text(&neighbors)?;
            info.push_str(&format!("Info on {node_id}:\n{node_info}\n"));
        }
        tracing::debug!(%info, "retrieved information");
        Ok(info)
    }

    /// Record an event and connect its participants to it.
    ///
    /// The event is created only if `event_id` is new. Participants missing
    /// from the graph are skipped and named in the result. Never fails: errors
    /// become a message listing the valid node ids, since the caller is an
    /// LLM tool loop that can only react to text.
    #[allow(clippy::too_many_arguments)]
    pub fn add_event(
        &mut self,
        participants: &[String],
        predicate: &str,
        event_id: &str,
        description: &str,
        time: &str,
        day: &str,
        location: &str,
    ) -> String {
        match self.try_add_event(participants, predicate, event_id, description, time, day, location) {
            Ok(skipped) => {
                self.notify_observer();
                if skipped.is_empty() {
                    format!("Successfully added {event_id} to the knowledge graph")
                } else {
                    format!(
                        "Successfully added {event_id} to the knowledge graph. \
                         Skipped unknown participants: {}",
                        skipped.join(", ")
                    )
                }
            }
            Err(e) => {
                tracing::error!(event = event_id, error = %e, "failed to add event to knowledge graph");
                format!(
                    "Failed to add event to knowledge graph ({e}). node_names must be one of {:?}",
                    self.retrieve_nodes()
                )
            }
        }
    }

    /// Returns the participant ids that were skipped.
    #[allow(clippy::too_many_arguments)]
    fn try_add_event(
        &mut self,
        participants: &[String],
        predicate: &str,
        event_id: &str,
        description: &str,
        time: &str,
        day: &str,
        location: &str,
    ) -> Result<Vec<String>> {
        // An existing id must already be an event; its participants are added to it.
        match self.graph.node(event_id).ok().map(|n| n.node_type()) {
            Some(NodeType::Event) => {}
            Some(_) => return Err(Error::DuplicateNode(event_id.to_string())),
            None => {
                self.graph.add_event(
                    event_id,
                    EventData::new(event_id, description, time, day, location),
                )?;
            }
        }

        let mut skipped = Vec::new();
        for participant in participants {
            if self.graph.contains(participant) {
                self.graph.connect(participant, event_id, predicate, false)?;
                tracing::info!(participant = %participant, predicate, event = event_id, "participant connected");
            } else {
                tracing::warn!(participant = %participant, event = event_id, "unknown participant skipped");
                skipped.push(participant.clone());
            }
        }
        Ok(skipped)
    }

    fn notify_observer(&self) {
        if let Err(e) = self.observer.graph_changed(&self.graph) {
            tracing::warn!(error = %e, "graph observer failed");
        }
    }

    /// All node ids in insertion order. Callers should check participant ids
    /// against this list before calling [`Retriever::add_event`].
    pub fn retrieve_nodes(&self) -> Vec<String> {
        self.graph.get_nodes()
    }
}

impl InformationSource for Retriever {
    fn retrieve(&mut self, description: &str) -> String {
        self.retrieve_information(description, "")
            .unwrap_or_else(|e| format!("Failed to retrieve information: {e}"))
    }
}

/// Source answering from a fixed table, for tests or a human operator
/// standing in for the graph.
#[derive(Debug, Clone, Default)]
pub struct CannedSource {
    answers: HashMap<String, String>,
    fallback: String,
}

impl CannedSource {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            answers: HashMap::new(),
            fallback: fallback.into(),
        }
    }

    pub fn answer(mut self, description: impl Into<String>, info: impl Into<String>) -> Self {
        self.answers.insert(description.into(), info.into());
        self
    }
}

impl InformationSource for CannedSource {
    fn retrieve(&mut self, description: &str) -> String {
        self.answers
            .get(description)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

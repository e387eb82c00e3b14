//! Per-node embedding cache and cosine-similarity matching.
//!
//! Each cache entry remembers the node version it was computed from. Before
//! matching, every node whose entry is missing or older than the node is
//! re-embedded, so graph mutations are always reflected in scores.

use std::collections::HashMap;

use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::graph::types::{NodeType, USER_ID};
use crate::graph::KnowledgeGraph;

#[derive(Debug, Clone, PartialEq)]
struct CachedEmbedding {
    node_id: String,
    version: u64,
    vector: Vec<f32>,
}

/// A node id with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNode {
    pub id: String,
    pub score: f32,
}

/// Embedding cache keyed by node id, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingIndex {
    entries: Vec<CachedEmbedding>,
    positions: HashMap<String, usize>,
}

impl EmbeddingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&[f32]> {
        self.positions
            .get(id)
            .map(|&i| self.entries[i].vector.as_slice())
    }

    /// Ids of nodes whose cached vector is missing or older than the node.
    /// The user node is never embedded.
    pub fn stale_nodes(&self, graph: &KnowledgeGraph) -> Vec<String> {
        graph
            .nodes()
            .filter(|n| n.id != USER_ID)
            .filter(|n| {
                self.positions
                    .get(&n.id)
                    .map_or(true, |&i| self.entries[i].version != n.version)
            })
            .map(|n| n.id.clone())
            .collect()
    }

    /// Embed every stale node. Returns how many vectors were (re)computed;
    /// calling again without mutating the graph computes nothing.
    pub fn compute_node_embeddings(
        &mut self,
        graph: &KnowledgeGraph,
        provider: &dyn EmbeddingProvider,
    ) -> Result<usize> {
        let stale = self.stale_nodes(graph);
        if stale.is_empty() {
            return Ok(0);
        }

        tracing::info!(count = stale.len(), "computing node embeddings");
        let texts = stale
            .iter()
            .map(|id| graph.node_to_text(id))
            .collect::<Result<Vec<_>>>()?;
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = provider.embed_batch(&refs).map_err(Error::Embedding)?;
        if vectors.len() != stale.len() {
            return Err(Error::Embedding(anyhow::anyhow!(
                "provider returned {} vectors for {} texts",
                vectors.len(),
                stale.len()
            )));
        }

        for (id, vector) in stale.into_iter().zip(vectors) {
            let version = graph.version_of(&id).unwrap_or_default();
            self.upsert(id, version, vector);
        }
        Ok(refs.len())
    }

    fn upsert(&mut self, node_id: String, version: u64, vector: Vec<f32>) {
        match self.positions.get(&node_id) {
            Some(&i) => {
                self.entries[i].version = version;
                self.entries[i].vector = vector;
            }
            None => {
                self.positions.insert(node_id.clone(), self.entries.len());
                self.entries.push(CachedEmbedding {
                    node_id,
                    version,
                    vector,
                });
            }
        }
    }

    /// Score every cached node (optionally only one type) against `query`,
    /// highest first. Ties keep cache insertion order.
    pub fn rank(
        &mut self,
        graph: &KnowledgeGraph,
        provider: &dyn EmbeddingProvider,
        query: &str,
        category: Option<NodeType>,
    ) -> Result<Vec<ScoredNode>> {
        self.compute_node_embeddings(graph, provider)?;
        let query_embedding = provider.embed(query).map_err(Error::Embedding)?;

        let mut scored: Vec<ScoredNode> = self
            .entries
            .iter()
            .filter(|e| e.node_id != USER_ID)
            .filter(|e| match category {
                Some(wanted) => graph
                    .node(&e.node_id)
                    .map(|n| n.node_type() == wanted)
                    .unwrap_or(false),
                None => true,
            })
            .map(|e| ScoredNode {
                id: e.node_id.clone(),
                score: cosine_similarity(&query_embedding, &e.vector),
            })
            .collect();
        // Stable sort: equal scores stay in insertion order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            query,
            scores = %scored
                .iter()
                .map(|s| format!("{}={:.4}", s.id, s.score))
                .collect::<Vec<_>>()
                .join(", "),
            "retrieval scores"
        );
        Ok(scored)
    }

    /// The `top_n` node ids most similar to `query`, best first.
    pub fn get_matching_node(
        &mut self,
        graph: &KnowledgeGraph,
        provider: &dyn EmbeddingProvider,
        query: &str,
        top_n: usize,
        category: Option<NodeType>,
    ) -> Result<Vec<String>> {
        Ok(self
            .rank(graph, provider, query, category)?
            .into_iter()
            .take(top_n)
            .map(|s| s.id)
            .collect())
    }
}

/// Cosine similarity in `[-1, 1]`. Zero-norm vectors score 0; vectors of
/// different lengths are compared over their common prefix.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let sim = dot / (norm_a * norm_b);
    if sim.is_finite() {
        sim.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#![allow(dead_code)]

use std::sync::Arc;

use carekg::config::RetrievalConfig;
use carekg::embedding::EmbeddingProvider;
use carekg::graph::types::{EventData, PersonData};
use carekg::graph::KnowledgeGraph;
use carekg::retrieval::Retriever;

/// Deterministic embedder: one dimension per keyword, valued by how often the
/// keyword occurs (case-insensitive substring) in the text.
pub struct KeywordEmbedder {
    keywords: Vec<String>,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl EmbeddingProvider for KeywordEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let text = text.to_lowercase();
        Ok(self
            .keywords
            .iter()
            .map(|k| text.matches(k.as_str()).count() as f32)
            .collect())
    }

    fn model(&self) -> &str {
        "keywords"
    }
}

pub fn keywords() -> Arc<KeywordEmbedder> {
    Arc::new(KeywordEmbedder::new(&[
        "love", "user", "picnic", "park", "bingo", "doctor", "garden",
    ]))
}

/// `user` (Margaret, 81) loves `alice` both ways; `bob` is a neighbor who
/// gardens; `bingo` is a weekly event the user attends.
pub fn family_graph() -> KnowledgeGraph {
    let mut kg = KnowledgeGraph::new();
    kg.add_person("user", PersonData::new("Margaret", 81)).unwrap();
    kg.add_person("alice", PersonData::new("Alice", 52)).unwrap();
    kg.add_person("bob", PersonData::new("Bob", 67).with_misc("hobby", "garden"))
        .unwrap();
    kg.add_event(
        "bingo",
        EventData::new("Bingo", "Weekly bingo night", "15:00", "Tuesday", "Hall"),
    )
    .unwrap();
    kg.connect("user", "alice", "loves", true).unwrap();
    kg.connect("user", "bingo", "attends", false).unwrap();
    kg
}

pub fn retriever(graph: KnowledgeGraph) -> Retriever {
    Retriever::new(graph, keywords(), RetrievalConfig::default()).unwrap()
}

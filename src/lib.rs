//! Semantic knowledge retrieval for a dementia-care conversational agent.
//!
//! carekg keeps a small personal knowledge base of the people and events in a
//! cared-for person's life, and grounds an LLM's answers in it. A free-text
//! query is embedded, matched against every node by cosine similarity, and
//! the best matches are expanded to their graph neighborhoods and rendered as
//! plain text for the model.
//!
//! # Architecture
//!
//! - **Graph**: typed person/event nodes and labeled directed edges, stored as
//!   explicit adjacency lists so rendering order is stable
//! - **Embeddings**: Ollama over HTTP, or an offline hashing provider
//! - **Index**: version-stamped per-node vectors, recomputed when a node changes
//! - **Tools**: a per-session registry exposing retrieval and event recording
//!   to the model, served over MCP stdio by the `carekg` binary
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`knowledge`] — Knowledge-base file format and graph construction
//! - [`graph`] — Node types, the knowledge graph, and text rendering
//! - [`embedding`] — Text-to-vector embedding providers
//! - [`retrieval`] — Embedding index, matcher, and the context retriever
//! - [`registry`] — LLM-callable tool registry
//! - [`session`] — Wiring a retriever's tools into a chat session
//! - [`observer`] — Hooks notified after graph mutations

pub mod config;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod knowledge;
pub mod observer;
pub mod registry;
pub mod retrieval;
pub mod session;

pub use error::{Error, Result};

//! MCP server initialization for the stdio transport.
//!
//! [`build_session`] loads the knowledge base and wires up the embedding
//! provider and retriever; [`serve_stdio`] exposes the session over MCP.

use anyhow::Result;
use carekg::config::CarekgConfig;
use carekg::embedding::{self, EmbeddingProvider};
use carekg::knowledge::KnowledgeBase;
use carekg::observer::JsonSnapshotObserver;
use carekg::retrieval::Retriever;
use carekg::session::AgentSession;
use rmcp::ServiceExt;
use std::sync::Arc;

use crate::tools::CarekgTools;

/// Shared setup: load the knowledge base, create the embedding provider,
/// and build the session's retriever and tool registry.
///
/// Blocks on embedding I/O; call from sync code or `spawn_blocking`.
pub fn build_session(config: &CarekgConfig) -> Result<AgentSession> {
    let kb_path = config.resolved_knowledge_path();
    let graph = KnowledgeBase::load(&kb_path)?.into_graph()?;
    tracing::info!(path = %kb_path.display(), nodes = graph.len(), "knowledge base loaded");

    let provider = embedding::create_provider(&config.embedding)?;
    let provider: Arc<dyn EmbeddingProvider> = Arc::from(provider);
    tracing::info!(model = provider.model(), "embedding provider ready");

    let mut retriever = Retriever::new(graph, provider, config.retrieval.clone())?;
    if let Some(path) = config.resolved_snapshot_path() {
        tracing::info!(path = %path.display(), "writing graph snapshots");
        retriever = retriever.with_observer(Box::new(JsonSnapshotObserver::new(path)));
    }
    let computed = retriever.compute_node_embeddings()?;
    tracing::info!(computed, "node embeddings ready");

    Ok(AgentSession::new(retriever)?)
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: CarekgConfig) -> Result<()> {
    tracing::info!("starting carekg MCP server on stdio");

    let defaults = Arc::new(config.session.clone());
    let session = tokio::task::spawn_blocking(move || build_session(&config)).await??;

    let tools = CarekgTools::new(Arc::new(session), defaults);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

pub mod add_event;
pub mod initial_context;
pub mod retrieve_information;
pub mod retrieve_nodes;

use add_event::AddEventParams;
use carekg::config::SessionConfig;
use carekg::session::{lock, AgentSession};
use initial_context::InitialContextParams;
use retrieve_information::RetrieveInformationParams;
use retrieve_nodes::RetrieveNodesParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// The carekg MCP tool handler. Every graph tool is dispatched through the
/// session's [`carekg::registry::ToolRegistry`] so MCP clients and in-process
/// chat models see the same functions with the same argument checks.
#[derive(Clone)]
pub struct CarekgTools {
    tool_router: ToolRouter<Self>,
    session: Arc<AgentSession>,
    defaults: Arc<SessionConfig>,
}

#[tool_router]
impl CarekgTools {
    pub fn new(session: Arc<AgentSession>, defaults: Arc<SessionConfig>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            session,
            defaults,
        }
    }

    /// Context block to seed a new conversation.
    #[tool(description = "Get the current time, location and what is known about the user. Call once at the start of a conversation.")]
    async fn initial_context(
        &self,
        Parameters(params): Parameters<InitialContextParams>,
    ) -> Result<String, String> {
        let time = params.time.unwrap_or_else(|| self.defaults.time.clone());
        let day = params.day.unwrap_or_else(|| self.defaults.day.clone());
        let location = params
            .location
            .unwrap_or_else(|| self.defaults.location.clone());
        tracing::info!(%time, %day, %location, "initial_context called");

        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || {
            lock(session.retriever())
                .map_err(|e| e.to_string())?
                .get_initial_context(&time, &day, &location)
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| format!("retrieval task failed: {e}"))?
    }

    /// Search the knowledge graph.
    #[tool(description = "Retrieve information about the elder based on a query. Optionally restrict to category 'PERSON' or 'EVENT'.")]
    async fn retrieve_information(
        &self,
        Parameters(params): Parameters<RetrieveInformationParams>,
    ) -> Result<String, String> {
        self.dispatch("retrieve_information", &params).await
    }

    /// Record a new event.
    #[tool(description = "Add an event to the elder's knowledge graph and connect the participating nodes to it. Call retrieve_nodes first to check participant ids.")]
    async fn add_event(
        &self,
        Parameters(params): Parameters<AddEventParams>,
    ) -> Result<String, String> {
        self.dispatch("add_event", &params).await
    }

    /// List node ids.
    #[tool(description = "Return the ids of all existing nodes in the knowledge graph.")]
    async fn retrieve_nodes(
        &self,
        Parameters(params): Parameters<RetrieveNodesParams>,
    ) -> Result<String, String> {
        self.dispatch("retrieve_nodes", &params).await
    }
}

impl CarekgTools {
    /// Invoke a registry tool off the async runtime and render its result as text.
    async fn dispatch<P: Serialize>(&self, name: &'static str, params: &P) -> Result<String, String> {
        let args = match serde_json::to_value(params) {
            Ok(Value::Object(map)) => map,
            Ok(_) => serde_json::Map::new(),
            Err(e) => return Err(format!("serialization failed: {e}")),
        };
        tracing::info!(tool = name, "tool called");

        let session = Arc::clone(&self.session);
        let value = tokio::task::spawn_blocking(move || session.registry().invoke(name, &args))
            .await
            .map_err(|e| format!("{name} task failed: {e}"))?
            .map_err(|e| e.to_string())?;

        Ok(match value {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }
}

#[tool_handler]
impl ServerHandler for CarekgTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "carekg holds what is known about the person you are caring for. Call \
                 initial_context at the start, retrieve_information to look things up, and \
                 retrieve_nodes before add_event when recording something new."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

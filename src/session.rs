//! Agent session: one graph, one registry, one chat.
//!
//! [`AgentSession`] exposes the retriever's operations as tools in a fresh
//! [`ToolRegistry`] and starts the chat model with the initial context.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use serde_json::Value;

use crate::registry::{string_arg, string_list_arg, ParamType, Tool, ToolRegistry};
use crate::retrieval::Retriever;

/// LLM chat client. Implementations invoke the registry's tools by name while
/// answering and feed the results back into the conversation.
pub trait ChatModel {
    /// Begin a conversation with `context` appended to the system instruction.
    fn start(&mut self, context: &str, tools: &ToolRegistry) -> Result<()>;

    fn query(&mut self, prompt: &str) -> Result<String>;
}

pub type SharedRetriever = Arc<Mutex<Retriever>>;

pub fn lock(retriever: &SharedRetriever) -> Result<MutexGuard<'_, Retriever>> {
    retriever
        .lock()
        .map_err(|e| anyhow::anyhow!("retriever lock poisoned: {e}"))
}

pub struct AgentSession {
    retriever: SharedRetriever,
    registry: ToolRegistry,
}

impl AgentSession {
    pub fn new(retriever: Retriever) -> crate::Result<Self> {
        let retriever = Arc::new(Mutex::new(retriever));
        let mut registry = ToolRegistry::new();
        register_retriever_tools(&mut registry, &retriever)?;
        Ok(Self {
            retriever,
            registry,
        })
    }

    pub fn retriever(&self) -> &SharedRetriever {
        &self.retriever
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Build the initial context and start `chat` with this session's tools.
    pub fn start_chat(
        &self,
        chat: &mut dyn ChatModel,
        time: &str,
        day: &str,
        location: &str,
    ) -> Result<()> {
        let context = lock(&self.retriever)?.get_initial_context(time, day, location)?;
        tracing::info!(tools = self.registry.len(), "starting chat session");
        chat.start(&context, &self.registry)
    }
}

/// Register `retrieve_information`, `add_event` and `retrieve_nodes`.
pub fn register_retriever_tools(
    registry: &mut ToolRegistry,
    retriever: &SharedRetriever,
) -> crate::Result<()> {
    let r = Arc::clone(retriever);
    registry.register(
        Tool::new(
            "retrieve_information",
            "Retrieve information about the elder based on a query.",
            move |args| {
                let info = lock(&r)?
                    .retrieve_information(string_arg(args, "query"), string_arg(args, "category"))?;
                Ok(Value::String(info))
            },
        )
        .param("query", ParamType::String, "The description of the information to retrieve.")
        .optional(
            "category",
            ParamType::String,
            "The category of the nodes to search, one of 'PERSON', 'EVENT' or '' for all.",
        ),
    )?;

    let r = Arc::clone(retriever);
    registry.register(
        Tool::new(
            "add_event",
            "Add an event to the elder's knowledge graph. Every participating node name must be \
             one of the nodes returned by retrieve_nodes; always call retrieve_nodes first.",
            move |args| {
                let result = lock(&r)?.add_event(
                    &string_list_arg(args, "node_names"),
                    string_arg(args, "predicate"),
                    string_arg(args, "event"),
                    string_arg(args, "description"),
                    string_arg(args, "time"),
                    string_arg(args, "day"),
                    string_arg(args, "location"),
                );
                Ok(Value::String(result))
            },
        )
        .param(
            "node_names",
            ParamType::list_of(ParamType::String),
            "Ids of the nodes participating in the event.",
        )
        .param("predicate", ParamType::String, "The relation, e.g. 'attended' or 'hosted'.")
        .param("event", ParamType::String, "Id of the event to add.")
        .param("description", ParamType::String, "Description of the event.")
        .param("time", ParamType::String, "Time of the event, HH:MM.")
        .param("day", ParamType::String, "Day of the week of the event.")
        .param("location", ParamType::String, "Location of the event."),
    )?;

    let r = Arc::clone(retriever);
    registry.register(Tool::new(
        "retrieve_nodes",
        "Return the ids of all existing nodes in the knowledge graph.",
        move |_| Ok(serde_json::to_value(lock(&r)?.retrieve_nodes())?),
    ))?;

    Ok(())
}

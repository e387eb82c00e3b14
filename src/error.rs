//! Error taxonomy for the retrieval engine.
//!
//! Graph and registry misuse (duplicate or unknown ids, unknown functions) is
//! reported through [`Error`] and propagated to the immediate caller. The
//! agent-facing `add_event` boundary converts these into strings instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A node with this id already exists (ids are shared by people and events).
    #[error("node already exists: {0}")]
    DuplicateNode(String),

    #[error("node id must not be empty")]
    EmptyNodeId,

    /// The referenced node id is not in the graph.
    #[error("node not found: {0}")]
    UnknownNode(String),

    #[error("invalid time format: {0:?}, expected HH:MM")]
    InvalidTimeFormat(String),

    #[error("invalid day: {0:?}, expected a day of the week (e.g. Monday or monday)")]
    InvalidDayFormat(String),

    #[error("person {0} must have a non-empty name")]
    EmptyPersonName(String),

    #[error("unknown node category: {0:?}, expected PERSON or EVENT")]
    UnknownCategory(String),

    #[error("function '{0}' is already registered")]
    DuplicateRegistration(String),

    #[error("function '{0}' is not registered")]
    UnknownFunction(String),

    /// A tool declaration that the tool-calling protocol cannot express.
    #[error("invalid tool declaration for '{name}': {reason}")]
    InvalidDeclaration { name: String, reason: String },

    /// Arguments supplied to a tool did not match its declared parameters.
    #[error("invalid arguments for '{name}': {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("function '{name}' failed: {source}")]
    ToolFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! MCP `retrieve_information` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `retrieve_information` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RetrieveInformationParams {
    /// Free-text description of what to look up.
    #[schemars(description = "The description of the information to retrieve")]
    pub query: String,

    /// `"PERSON"`, `"EVENT"`, or omitted for all nodes.
    #[schemars(
        description = "Category of nodes to search: 'PERSON', 'EVENT', or omit to search all"
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

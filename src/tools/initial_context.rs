//! MCP `initial_context` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `initial_context` MCP tool. Omitted fields fall back to
/// the `[session]` section of the config.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct InitialContextParams {
    #[schemars(description = "Current time in 24h HH:MM format")]
    pub time: Option<String>,

    #[schemars(description = "Current day of the week, e.g. 'Monday'")]
    pub day: Option<String>,

    #[schemars(description = "Where the user currently is, e.g. 'Living Room'")]
    pub location: Option<String>,
}

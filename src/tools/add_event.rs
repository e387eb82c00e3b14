//! MCP `add_event` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `add_event` MCP tool.
///
/// Participants must be existing node ids (see `retrieve_nodes`); unknown ids
/// are skipped and reported back in the result text.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddEventParams {
    #[schemars(description = "Ids of the nodes participating in the event. Call retrieve_nodes first.")]
    pub node_names: Vec<String>,

    #[schemars(description = "The relation from each participant to the event, e.g. 'attended'")]
    pub predicate: String,

    #[schemars(description = "Id of the event to add")]
    pub event: String,

    #[schemars(description = "Description of the event")]
    pub description: String,

    #[schemars(description = "Time of the event in 24h HH:MM format")]
    pub time: String,

    #[schemars(description = "Day of the week of the event, e.g. 'Saturday'")]
    pub day: String,

    #[schemars(description = "Location of the event")]
    pub location: String,
}

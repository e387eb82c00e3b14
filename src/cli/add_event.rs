use anyhow::Result;
use serde_json::{Map, Value};

use carekg::config::CarekgConfig;

/// Record an event through the session's `add_event` tool and print the reply.
///
/// The graph lives only for this process, so the change is visible afterwards
/// only through `knowledge.snapshot_path` when one is configured.
#[allow(clippy::too_many_arguments)]
pub fn add_event(
    config: &CarekgConfig,
    event: String,
    participants: Vec<String>,
    predicate: String,
    description: String,
    time: String,
    day: String,
    location: String,
) -> Result<()> {
    let session = crate::server::build_session(config)?;

    let mut args = Map::new();
    args.insert("node_names".into(), participants.into());
    args.insert("predicate".into(), predicate.into());
    args.insert("event".into(), event.into());
    args.insert("description".into(), description.into());
    args.insert("time".into(), time.into());
    args.insert("day".into(), day.into());
    args.insert("location".into(), location.into());

    match session.registry().invoke("add_event", &args)? {
        Value::String(reply) => println!("{reply}"),
        other => println!("{other}"),
    }
    Ok(())
}

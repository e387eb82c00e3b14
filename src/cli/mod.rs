pub mod add_event;
pub mod context;
pub mod nodes;
pub mod query;

use anyhow::Result;
use clap::Subcommand;

use carekg::config::CarekgConfig;

/// One-shot commands. They run synchronously; `main` calls [`run`] from
/// `spawn_blocking` because embedding providers block on I/O.
#[derive(Subcommand)]
pub enum Command {
    /// Print the initial conversation context
    Context {
        /// Current time, HH:MM (defaults to [session].time)
        #[arg(long)]
        time: Option<String>,
        /// Current weekday (defaults to [session].day)
        #[arg(long)]
        day: Option<String>,
        /// Current location (defaults to [session].location)
        #[arg(long)]
        location: Option<String>,
    },
    /// Retrieve information for a query
    Query {
        text: String,
        /// Restrict matches to PERSON or EVENT nodes
        #[arg(long)]
        category: Option<String>,
    },
    /// Record an event and connect participants to it
    AddEvent {
        /// Event id, also used as its title
        event: String,
        /// Ids of participating nodes
        #[arg(long = "participant", required = true)]
        participants: Vec<String>,
        /// Relation from each participant to the event
        #[arg(long, default_value = "attends")]
        predicate: String,
        #[arg(long, default_value = "")]
        description: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        day: String,
        #[arg(long, default_value = "")]
        location: String,
    },
    /// List all nodes and their relations
    Nodes,
    /// Print the tool declarations exposed to the model
    Tools,
}

pub fn run(command: Command, config: &CarekgConfig) -> Result<()> {
    match command {
        Command::Context {
            time,
            day,
            location,
        } => context::context(config, time, day, location),
        Command::Query { text, category } => query::query(config, &text, category),
        Command::AddEvent {
            event,
            participants,
            predicate,
            description,
            time,
            day,
            location,
        } => add_event::add_event(
            config,
            event,
            participants,
            predicate,
            description,
            time,
            day,
            location,
        ),
        Command::Nodes => nodes::nodes(config),
        Command::Tools => nodes::tools(config),
    }
}

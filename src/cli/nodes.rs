use anyhow::Result;

use carekg::config::CarekgConfig;
use carekg::session::lock;

/// List every node with its type and label.
pub fn nodes(config: &CarekgConfig) -> Result<()> {
    let session = crate::server::build_session(config)?;
    let retriever = lock(session.retriever())?;
    let graph = retriever.graph();

    println!("{} node(s), {} edge(s)\n", graph.len(), graph.edge_count());
    for node in graph.nodes() {
        println!("  [{}] {} — {}", node.node_type(), node.id, node.data.label());
        for edge in graph.edges_from(&node.id)? {
            println!("      {} → {}", edge.relation, edge.target);
        }
    }
    Ok(())
}

/// Print the function declarations handed to a chat model.
pub fn tools(config: &CarekgConfig) -> Result<()> {
    let session = crate::server::build_session(config)?;
    let declarations = session.registry().declarations();
    println!("{}", serde_json::to_string_pretty(&declarations)?);
    Ok(())
}

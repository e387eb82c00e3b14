use anyhow::Result;

use carekg::config::CarekgConfig;
use carekg::graph::types::NodeType;
use carekg::session::lock;

/// Run a retrieval from the terminal and show the match scores.
pub fn query(config: &CarekgConfig, text: &str, category: Option<String>) -> Result<()> {
    let session = crate::server::build_session(config)?;
    let category = category.unwrap_or_default();
    let mut retriever = lock(session.retriever())?;

    let info = retriever.retrieve_information(text, &category)?;
    println!("{info}");

    let filter = match category.trim() {
        "" => None,
        c => Some(c.parse::<NodeType>()?),
    };
    let ranked = retriever.rank(text, filter)?;
    if ranked.is_empty() {
        return Ok(());
    }

    println!("Scores:");
    for (i, scored) in ranked.iter().enumerate() {
        println!("  {}. {} (score: {:.4})", i + 1, scored.id, scored.score);
    }
    Ok(())
}

use anyhow::Result;

use carekg::config::CarekgConfig;
use carekg::session::lock;

/// Print the context block a new conversation would start with.
pub fn context(
    config: &CarekgConfig,
    time: Option<String>,
    day: Option<String>,
    location: Option<String>,
) -> Result<()> {
    let session = crate::server::build_session(config)?;
    let time = time.unwrap_or_else(|| config.session.time.clone());
    let day = day.unwrap_or_else(|| config.session.day.clone());
    let location = location.unwrap_or_else(|| config.session.location.clone());

    let context = lock(session.retriever())?.get_initial_context(&time, &day, &location)?;
    println!("{context}");
    Ok(())
}

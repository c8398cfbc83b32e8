use anyhow::Context;

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_resolve(config: Config, text: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let card = state
        .typeahead
        .resolve(text)
        .await
        .context("Could not resolve selection")?;

    println!("{}", serde_json::to_string_pretty(&card)?);
    Ok(())
}

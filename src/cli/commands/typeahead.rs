use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_typeahead(config: Config, text: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let suggestions = state.typeahead.suggest(text).await;

    println!("{}", serde_json::to_string_pretty(&suggestions)?);
    Ok(())
}

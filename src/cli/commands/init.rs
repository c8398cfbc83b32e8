use crate::config::Config;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings");
        println!("Set credentials.places and credentials.darksky, or export");
        println!("GOOGLE_PLACES_KEY and DARK_SKY_KEY.");
    } else {
        println!("config.toml already exists, leaving it untouched");
    }
    Ok(())
}

use anyhow::{Context, Result};
use std::collections::HashMap;

use crate::constants::icons::DEFAULT;

/// Provider condition code (optionally `-night` suffixed) to icon URL,
/// plus the `default` and `thermo*` entries.
#[derive(Debug, Clone)]
pub struct IconMap {
    entries: HashMap<String, String>,
    default_icon: String,
}

impl IconMap {
    pub fn load(override_path: Option<&str>) -> Result<Self> {
        let content = super::read_asset("data/icon-map.json", override_path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let entries: HashMap<String, String> =
            serde_json::from_str(content).context("Icon map must be a JSON object of strings")?;
        Self::new(entries)
    }

    pub fn new(entries: HashMap<String, String>) -> Result<Self> {
        let default_icon = entries
            .get(DEFAULT)
            .cloned()
            .with_context(|| format!("Icon map has no \"{DEFAULT}\" entry"))?;

        Ok(Self {
            entries,
            default_icon,
        })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn get_or_default(&self, key: &str) -> &str {
        self.get(key).unwrap_or(&self.default_icon)
    }

    #[must_use]
    pub fn default_icon(&self) -> &str {
        &self.default_icon
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

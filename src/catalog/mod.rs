//! Read-only lookup tables and templates shipped with the binary.
//!
//! Everything here is loaded once at startup and shared behind `Arc`;
//! nothing mutates it afterwards.

pub mod countries;
pub mod icons;

use anyhow::{Context, Result};
use rust_embed::RustEmbed;
use std::path::Path;

pub use countries::CountryIndex;
pub use icons::IconMap;

#[derive(RustEmbed)]
#[folder = "assets/"]
pub(crate) struct Asset;

/// Reads `override_path` when given, otherwise the embedded asset.
pub(crate) fn read_asset(embedded: &str, override_path: Option<&str>) -> Result<String> {
    if let Some(path) = override_path {
        return std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read {path}"));
    }

    let file = Asset::get(embedded).with_context(|| format!("Missing embedded asset {embedded}"))?;
    String::from_utf8(file.data.into_owned())
        .with_context(|| format!("Embedded asset {embedded} is not UTF-8"))
}

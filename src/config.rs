use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub credentials: CredentialsConfig,

    pub upstream: UpstreamConfig,

    pub cache: CacheConfig,

    pub assets: AssetsConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    /// Exact origins allowed in addition to `allowed_origin_pattern`.
    pub cors_allowed_origins: Vec<String>,

    /// Regex an `Origin` header must match. The compose widget calls the
    /// API straight from the browser, so only its host family is allowed.
    pub allowed_origin_pattern: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9145,
            cors_allowed_origins: vec![],
            allowed_origin_pattern: r"^https?://[^.\s]+\.mixmax\.com$".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Google Places API key
    pub places: String,

    /// Dark Sky secret key
    pub darksky: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub places_base_url: String,

    pub darksky_base_url: String,

    /// Timeout for autocomplete, details and photo lookups
    pub places_timeout_seconds: u64,

    /// Timeout for forecast lookups
    pub forecast_timeout_seconds: u64,

    pub default_thumb_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            places_base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            darksky_base_url: "https://api.darksky.net".to_string(),
            places_timeout_seconds: 10,
            forecast_timeout_seconds: 15,
            default_thumb_url: constants::DEFAULT_THUMB_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Only used by the sqlite backend
    pub database_url: String,

    pub max_connections: u32,

    pub weather_ttl_seconds: u64,

    pub location_ttl_seconds: u64,

    /// Only used by the memory backend
    pub max_entries: u64,

    /// Upper bound for a single get/set/touch before it counts as a miss
    pub operation_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            database_url: "sqlite:data/wthrn-cache.db".to_string(),
            max_connections: 5,
            weather_ttl_seconds: constants::cache::WEATHER_TTL_SECONDS,
            location_ttl_seconds: constants::cache::LOCATION_TTL_SECONDS,
            max_entries: constants::cache::MEMORY_MAX_ENTRIES,
            operation_timeout_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Replaces the embedded icon map when set
    pub icon_map_path: Option<String>,

    /// Replaces the embedded country list when set
    pub countries_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            credentials: CredentialsConfig::default(),
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            assets: AssetsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Production deployments keep secrets in the environment rather than
    /// in `config.toml`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GOOGLE_PLACES_KEY") {
            self.credentials.places = key;
        }

        if let Some(key) = lookup("DARK_SKY_KEY") {
            self.credentials.darksky = key;
        }

        if let Some(url) = lookup("WTHRN_CACHE_URL") {
            self.cache.backend = CacheBackend::Sqlite;
            self.cache.database_url = url;
        }

        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("wthrn").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".wthrn").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache.weather_ttl_seconds == 0 || self.cache.location_ttl_seconds == 0 {
            anyhow::bail!("Cache TTLs must be > 0");
        }

        if self.cache.max_entries == 0 {
            anyhow::bail!("cache.max_entries must be > 0");
        }

        if self.cache.operation_timeout_ms == 0 {
            anyhow::bail!("Cache operation timeout must be > 0");
        }

        if self.upstream.places_timeout_seconds == 0 || self.upstream.forecast_timeout_seconds == 0
        {
            anyhow::bail!("Upstream timeouts must be > 0");
        }

        regex::Regex::new(&self.server.allowed_origin_pattern)
            .context("Invalid server.allowed_origin_pattern")?;

        if self.cache.backend == CacheBackend::Sqlite && self.cache.database_url.is_empty() {
            anyhow::bail!("cache.database_url cannot be empty with the sqlite backend");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 9145);
        assert_eq!(config.cache.weather_ttl_seconds, 900);
        assert_eq!(config.cache.location_ttl_seconds, 1800);
        assert_eq!(config.upstream.places_timeout_seconds, 10);
        assert_eq!(config.upstream.forecast_timeout_seconds, 15);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.max_entries, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[credentials]"));
        assert!(toml_str.contains("[cache]"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [credentials]
            places = "abc"

            [cache]
            backend = "sqlite"
            max_entries = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.credentials.places, "abc");
        assert_eq!(config.cache.backend, CacheBackend::Sqlite);
        assert_eq!(config.cache.weather_ttl_seconds, 900);
        assert_eq!(config.cache.max_entries, 250);
        assert_eq!(config.server.port, 9145);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|name| match name {
            "GOOGLE_PLACES_KEY" => Some("places-key".to_string()),
            "DARK_SKY_KEY" => Some("darksky-key".to_string()),
            "WTHRN_CACHE_URL" => Some("sqlite::memory:".to_string()),
            "PORT" => Some("8080".to_string()),
            _ => None,
        });

        assert_eq!(config.credentials.places, "places-key");
        assert_eq!(config.credentials.darksky, "darksky-key");
        assert_eq!(config.cache.backend, CacheBackend::Sqlite);
        assert_eq!(config.cache.database_url, "sqlite::memory:");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.cache.weather_ttl_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.max_entries = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.allowed_origin_pattern = "([".to_string();
        assert!(config.validate().is_err());
    }
}

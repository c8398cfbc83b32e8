use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::catalog::{CountryIndex, IconMap};
use crate::clients::{DarkSkyClient, ForecastApi, PlacesApi, PlacesClient};
use crate::config::{CacheBackend, Config};
use crate::db::Store;
use crate::services::{
    CacheAside, CacheStore, CacheTtls, MemoryCache, SuggestionService, TypeaheadService,
    WeatherService,
};
use crate::templates::Templates;

/// Build a shared HTTP client for both upstream providers. Per-request
/// timeouts are applied by the clients themselves.
fn build_shared_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("wthrn/", env!("CARGO_PKG_VERSION")))
        .gzip(true)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Upstream providers and cache backend the services run against.
pub struct Dependencies {
    pub places: Arc<dyn PlacesApi>,
    pub forecast: Arc<dyn ForecastApi>,
    pub cache: Arc<dyn CacheStore>,
    /// Present only with the SQLite backend, for health checks.
    pub store: Option<Store>,
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Option<Store>,

    pub typeahead: TypeaheadService,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let dependencies = Self::connect(&config).await?;
        Self::with_dependencies(config, dependencies)
    }

    /// Real upstream clients over one pooled HTTP client, plus the
    /// configured cache backend.
    async fn connect(config: &Config) -> anyhow::Result<Dependencies> {
        let http_client = build_shared_http_client()?;

        let places = Arc::new(PlacesClient::with_shared_client(
            http_client.clone(),
            &config.upstream.places_base_url,
            &config.credentials.places,
            Duration::from_secs(config.upstream.places_timeout_seconds),
            &config.upstream.default_thumb_url,
        ));

        let forecast = Arc::new(DarkSkyClient::with_shared_client(
            http_client,
            &config.upstream.darksky_base_url,
            &config.credentials.darksky,
            Duration::from_secs(config.upstream.forecast_timeout_seconds),
        ));

        let (cache, store): (Arc<dyn CacheStore>, Option<Store>) = match config.cache.backend {
            CacheBackend::Memory => {
                info!(max_entries = config.cache.max_entries, "Using in-memory cache");
                (Arc::new(MemoryCache::new(config.cache.max_entries)), None)
            }
            CacheBackend::Sqlite => {
                let store =
                    Store::with_pool_options(&config.cache.database_url, config.cache.max_connections, 1)
                        .await?;
                info!(url = %config.cache.database_url, "Using SQLite cache");
                (Arc::new(store.cache_repo()), Some(store))
            }
        };

        Ok(Dependencies {
            places,
            forecast,
            cache,
            store,
        })
    }

    pub fn with_dependencies(config: Config, dependencies: Dependencies) -> anyhow::Result<Self> {
        let countries = Arc::new(CountryIndex::load(config.assets.countries_path.as_deref())?);
        let icons = Arc::new(IconMap::load(config.assets.icon_map_path.as_deref())?);
        let templates = Arc::new(Templates::load()?);

        info!(
            countries = countries.len(),
            icons = icons.len(),
            "Static tables loaded"
        );

        let cache = CacheAside::new(
            dependencies.cache,
            Duration::from_millis(config.cache.operation_timeout_ms),
        );

        let typeahead = TypeaheadService::new(
            countries,
            SuggestionService::new(dependencies.places, &config.upstream.default_thumb_url),
            WeatherService::new(dependencies.forecast, icons),
            cache,
            templates,
            CacheTtls {
                location: Duration::from_secs(config.cache.location_ttl_seconds),
                weather: Duration::from_secs(config.cache.weather_ttl_seconds),
            },
        );

        Ok(Self {
            config: Arc::new(config),
            store: dependencies.store,
            typeahead,
        })
    }
}

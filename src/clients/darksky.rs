use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::forecast::EXCLUDE;
use crate::models::Coordinates;

use super::record_upstream;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Forecast {
    pub timezone: Option<String>,
    pub currently: Option<DataPoint>,
    pub minutely: Option<DataBlock>,
    pub daily: Option<DataBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DataPoint {
    pub time: Option<i64>,
    pub summary: Option<String>,
    pub icon: Option<String>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DataBlock {
    pub summary: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub data: Vec<DataPoint>,
}

/// The single sample the weather card is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSample {
    pub summary: Option<String>,
    pub icon: Option<String>,
    pub time: Option<i64>,
    pub temperature: Option<f64>,
    pub timezone: Option<String>,
}

impl Forecast {
    /// Current conditions when present, else the minutely block, else the
    /// daily block. Fields missing on a block are taken from `data[1]`, the
    /// upcoming period rather than the one already passing.
    #[must_use]
    pub fn sample(&self) -> Option<WeatherSample> {
        let timezone = self.timezone.clone();

        if let Some(current) = &self.currently {
            return Some(WeatherSample {
                summary: current.summary.clone(),
                icon: current.icon.clone(),
                time: current.time,
                temperature: current.temperature,
                timezone,
            });
        }

        let block = self.minutely.as_ref().or(self.daily.as_ref())?;
        let next = block.data.get(1);

        Some(WeatherSample {
            summary: block.summary.clone(),
            icon: block
                .icon
                .clone()
                .or_else(|| next.and_then(|p| p.icon.clone())),
            time: next.and_then(|p| p.time),
            temperature: next.and_then(|p| p.temperature),
            timezone,
        })
    }
}

#[async_trait]
pub trait ForecastApi: Send + Sync {
    /// `None` on any transport error, timeout, non-200 or unusable body.
    async fn forecast(&self, coordinates: Coordinates) -> Option<Forecast>;
}

#[derive(Clone)]
pub struct DarkSkyClient {
    client: Client,
    base_url: String,
    secret_key: String,
    timeout: Duration,
}

impl DarkSkyClient {
    #[must_use]
    pub fn with_shared_client(
        client: Client,
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            secret_key: secret_key.into(),
            timeout,
        }
    }

    fn forecast_url(&self, coordinates: Coordinates) -> String {
        // The exclude list must keep its literal commas.
        format!(
            "{}/forecast/{}/{},{}?exclude={}",
            self.base_url.trim_end_matches('/'),
            self.secret_key,
            coordinates.lat,
            coordinates.lng,
            EXCLUDE
        )
    }

    async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<Forecast> {
        let response = self
            .client
            .get(self.forecast_url(coordinates))
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            anyhow::bail!("forecast returned {}", response.status());
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ForecastApi for DarkSkyClient {
    async fn forecast(&self, coordinates: Coordinates) -> Option<Forecast> {
        debug!(lat = coordinates.lat, lng = coordinates.lng, "Fetching forecast");
        match self.fetch_forecast(coordinates).await {
            Ok(forecast) => {
                record_upstream("darksky_forecast", true);
                Some(forecast)
            }
            Err(e) => {
                record_upstream("darksky_forecast", false);
                warn!(lat = coordinates.lat, lng = coordinates.lng, error = %e, "Forecast unavailable");
                None
            }
        }
    }
}

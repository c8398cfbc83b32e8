use chrono::{DateTime, Local};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::IconMap;
use crate::clients::ForecastApi;
use crate::models::{LocationSelection, Temperature, WeatherDisplay};

use super::icons::{neutral_thermometer, resolve_icon, resolve_thermometer};

/// Builds the weather card record for a selected location.
#[derive(Clone)]
pub struct WeatherService {
    forecast: Arc<dyn ForecastApi>,
    icons: Arc<IconMap>,
}

impl WeatherService {
    #[must_use]
    pub fn new(forecast: Arc<dyn ForecastApi>, icons: Arc<IconMap>) -> Self {
        Self { forecast, icons }
    }

    /// The record shown when the forecast provider gives us nothing.
    #[must_use]
    pub fn defaults(&self, selection: &LocationSelection) -> WeatherDisplay {
        WeatherDisplay {
            title: selection.title(),
            description: String::new(),
            icon: self.icons.default_icon().to_string(),
            temperature: Temperature::UNKNOWN,
            thermometer: neutral_thermometer(&self.icons),
            time: Local::now().format("%a %b %d %Y").to_string(),
        }
    }

    pub async fn weather_for(&self, selection: &LocationSelection) -> WeatherDisplay {
        let mut display = self.defaults(selection);

        let Some(sample) = self
            .forecast
            .forecast(selection.coordinates)
            .await
            .and_then(|f| f.sample())
        else {
            let title = &display.title;
            debug!(title = %title, "No forecast data, using defaults");
            return display;
        };

        let timezone = sample.timezone.as_deref();

        display.description = sample.summary.clone().unwrap_or_default();
        display.icon = resolve_icon(&self.icons, sample.icon.as_deref(), sample.time, timezone);
        display.time = sample
            .time
            .zip(timezone)
            .and_then(|(time, tz)| format_timestamp(time, tz))
            .unwrap_or_default();

        match sample.temperature {
            Some(degrees) => {
                display.temperature = Temperature::Degrees(degrees);
                display.thermometer = resolve_thermometer(&self.icons, degrees);
            }
            None => {
                display.temperature = Temperature::UNKNOWN;
                display.thermometer = neutral_thermometer(&self.icons);
            }
        }

        display
    }
}

/// `Friday, October 16, 2026 @ 07:05 PM`, rendered in the location's own
/// timezone. `None` for unknown zones or out-of-range timestamps.
#[must_use]
pub fn format_timestamp(unix_seconds: i64, timezone: &str) -> Option<String> {
    let tz: Tz = timezone.parse().ok()?;
    let local = DateTime::from_timestamp(unix_seconds, 0)?.with_timezone(&tz);
    Some(local.format("%A, %B %-d, %Y @ %I:%M %p").to_string())
}

#[cfg(test)]
pub(crate) mod fakes {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::clients::{Forecast, ForecastApi};
    use crate::models::Coordinates;

    #[derive(Default)]
    pub struct FakeForecast {
        pub forecast: Option<Forecast>,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl ForecastApi for FakeForecast {
        async fn forecast(&self, _coordinates: Coordinates) -> Option<Forecast> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.forecast.clone()
        }
    }
}

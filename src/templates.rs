use anyhow::Result;

use crate::catalog::read_asset;
use crate::models::{LocationSelection, WeatherDisplay};

/// HTML snippets with `{{field}}` placeholders. Every substituted value
/// is escaped, so upstream text can never inject markup.
#[derive(Debug, Clone)]
pub struct Templates {
    location: String,
    weather: String,
}

impl Templates {
    pub fn load() -> Result<Self> {
        Ok(Self {
            location: read_asset("templates/location.html", None)?,
            weather: read_asset("templates/weather.html", None)?,
        })
    }

    #[must_use]
    pub fn render_location(&self, selection: &LocationSelection) -> String {
        render(
            &self.location,
            &[
                ("location", selection.location.as_str()),
                ("context", selection.context.as_str()),
                ("thumb", selection.thumb.as_str()),
            ],
        )
    }

    #[must_use]
    pub fn render_weather(&self, weather: &WeatherDisplay) -> String {
        let temperature = weather.temperature.to_string();
        render(
            &self.weather,
            &[
                ("title", weather.title.as_str()),
                ("description", weather.description.as_str()),
                ("icon", weather.icon.as_str()),
                ("temperature", temperature.as_str()),
                ("thermometer", weather.thermometer.as_str()),
                ("time", weather.time.as_str()),
            ],
        )
    }
}

fn render(template: &str, fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .fold(template.to_string(), |html, (name, value)| {
            html.replace(
                &format!("{{{{{name}}}}}"),
                &html_escape::encode_double_quoted_attribute(value),
            )
        })
        .trim()
        .to_string()
}

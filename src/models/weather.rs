use serde::{Deserialize, Serialize};

/// Degrees Fahrenheit, or `"-"` when the provider had nothing to say.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Temperature {
    Degrees(f64),
    Unknown(UnknownMarker),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownMarker {
    #[serde(rename = "-")]
    Dash,
}

impl Temperature {
    pub const UNKNOWN: Self = Self::Unknown(UnknownMarker::Dash);

    #[cfg(test)]
    #[must_use]
    pub const fn degrees(self) -> Option<f64> {
        match self {
            Self::Degrees(value) => Some(value),
            Self::Unknown(_) => None,
        }
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Adding zero turns a rounded -0 into 0
            Self::Degrees(value) => write!(f, "{}", value.round() + 0.0),
            Self::Unknown(_) => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDisplay {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub temperature: Temperature,
    pub thermometer: String,
    pub time: String,
}

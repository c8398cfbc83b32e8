use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Weather cache key: the JSON form of the coordinates. Always starts
    /// with `{`, so it can never collide with a location search key.
    #[must_use]
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{{},{}}}", self.lat, self.lng))
    }
}

/// A resolved place, handed to the client as the suggestion `text` and
/// echoed back verbatim to the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSelection {
    pub location: String,
    pub context: String,
    pub coordinates: Coordinates,
    pub thumb: String,
}

impl LocationSelection {
    #[must_use]
    pub fn title(&self) -> String {
        format!("{}, {}", self.location, self.context)
    }
}

/// Location cache key: `<code>:<term>` with spaces swapped for `#`.
#[must_use]
pub fn location_cache_key(country_code: &str, search_term: &str) -> String {
    format!("{}:{}", country_code, search_term.replace(' ', "#"))
}

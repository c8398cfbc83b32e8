use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::constants::places::{AUTOCOMPLETE_TYPES, LANGUAGE, THUMB_SIZE};
use crate::models::Coordinates;

use super::record_upstream;

#[derive(Debug, Clone, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub place_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub terms: Vec<PredictionTerm>,
}

impl Prediction {
    /// The second term is usually the region or state containing the city.
    #[must_use]
    pub fn context_term(&self) -> Option<&str> {
        self.terms.get(1).map(|t| t.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionTerm {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DetailsResponse {
    result: Option<PlaceDetails>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceDetails {
    pub name: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub photos: Vec<PlacePhoto>,
}

impl PlaceDetails {
    #[must_use]
    pub fn first_photo_reference(&self) -> Option<&str> {
        self.photos.first().map(|p| p.photo_reference.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Geometry {
    pub location: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlacePhoto {
    pub photo_reference: String,
}

/// Place autocomplete, details and photo lookups.
///
/// Every method absorbs upstream failures: `None` (or the placeholder
/// thumbnail for photos) means "nothing usable came back".
#[async_trait]
pub trait PlacesApi: Send + Sync {
    async fn autocomplete(&self, input: &str, country_code: &str) -> Option<Vec<Prediction>>;

    async fn details(&self, place_id: &str) -> Option<PlaceDetails>;

    /// Final image URL behind a photo reference, so the API key never
    /// reaches the browser.
    async fn photo_url(&self, photo_reference: &str) -> String;
}

#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    default_thumb: String,
}

impl PlacesClient {
    #[must_use]
    pub fn with_shared_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        default_thumb: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
            default_thumb: default_thumb.into(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|e| anyhow::anyhow!("Failed to parse places URL: {e}"))
    }

    async fn fetch_autocomplete(&self, input: &str, country_code: &str) -> Result<Vec<Prediction>> {
        let mut url = self.endpoint("autocomplete/json")?;
        // Values go out form-encoded, so `(cities)` becomes `%28cities%29` and
        // `country:FR` becomes `country%3AFR`. Places decodes both forms.
        url.query_pairs_mut()
            .append_pair("components", &format!("country:{country_code}"))
            .append_pair("types", AUTOCOMPLETE_TYPES)
            .append_pair("input", input)
            .append_pair("language", LANGUAGE)
            .append_pair("key", &self.api_key);

        let response = self.client.get(url).timeout(self.timeout).send().await?;

        if response.status() != reqwest::StatusCode::OK {
            anyhow::bail!("autocomplete returned {}", response.status());
        }

        let body: AutocompleteResponse = response.json().await?;
        Ok(body.predictions)
    }

    async fn fetch_details(&self, place_id: &str) -> Result<Option<PlaceDetails>> {
        let mut url = self.endpoint("details/json")?;
        url.query_pairs_mut()
            .append_pair("placeid", place_id)
            .append_pair("key", &self.api_key);

        let response = self.client.get(url).timeout(self.timeout).send().await?;

        if response.status() != reqwest::StatusCode::OK {
            anyhow::bail!("details returned {}", response.status());
        }

        let body: DetailsResponse = response.json().await?;
        Ok(body.result)
    }

    async fn fetch_photo_url(&self, photo_reference: &str) -> Result<String> {
        let size = THUMB_SIZE.to_string();
        let mut url = self.endpoint("photo")?;
        url.query_pairs_mut()
            .append_pair("maxwidth", &size)
            .append_pair("maxheight", &size)
            .append_pair("photoreference", photo_reference)
            .append_pair("key", &self.api_key);

        // The redirect chain is followed but the image body is never read.
        let response = self.client.get(url).timeout(self.timeout).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("photo returned {}", response.status());
        }

        Ok(response.url().to_string())
    }
}

#[async_trait]
impl PlacesApi for PlacesClient {
    async fn autocomplete(&self, input: &str, country_code: &str) -> Option<Vec<Prediction>> {
        debug!(input, country_code, "Fetching place autocomplete");
        match self.fetch_autocomplete(input, country_code).await {
            Ok(predictions) => {
                record_upstream("places_autocomplete", true);
                Some(predictions)
            }
            Err(e) => {
                record_upstream("places_autocomplete", false);
                warn!(input, country_code, error = %e, "Place autocomplete unavailable");
                None
            }
        }
    }

    async fn details(&self, place_id: &str) -> Option<PlaceDetails> {
        match self.fetch_details(place_id).await {
            Ok(Some(details)) => {
                record_upstream("places_details", true);
                Some(details)
            }
            Ok(None) => {
                record_upstream("places_details", true);
                debug!(place_id, "Place details had no result");
                None
            }
            Err(e) => {
                record_upstream("places_details", false);
                warn!(place_id, error = %e, "Place details unavailable");
                None
            }
        }
    }

    async fn photo_url(&self, photo_reference: &str) -> String {
        match self.fetch_photo_url(photo_reference).await {
            Ok(url) => {
                record_upstream("places_photo", true);
                url
            }
            Err(e) => {
                record_upstream("places_photo", false);
                debug!(error = %e, "Place photo unavailable, using placeholder");
                self.default_thumb.clone()
            }
        }
    }
}

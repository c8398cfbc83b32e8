use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};

use crate::clients::{PlacesApi, Prediction};
use crate::constants::EMPTY_SEARCH_PLACEHOLDER;
use crate::models::LocationSelection;

/// Upper bound on predictions enriched (details and photo lookups) at once.
/// Autocomplete returns at most five, so in practice all run together.
const ENRICH_CONCURRENCY: usize = 8;

/// Turns a partial city name into enriched location suggestions.
#[derive(Clone)]
pub struct SuggestionService {
    places: Arc<dyn PlacesApi>,
    default_thumb: String,
}

impl SuggestionService {
    #[must_use]
    pub fn new(places: Arc<dyn PlacesApi>, default_thumb: impl Into<String>) -> Self {
        Self {
            places,
            default_thumb: default_thumb.into(),
        }
    }

    /// Autocomplete, then details and photo per candidate.
    ///
    /// Candidates are enriched concurrently; a candidate whose details
    /// lookup fails is dropped without affecting the others, and the
    /// upstream order of the survivors is kept. An empty result is normal.
    pub async fn suggest(
        &self,
        country_code: &str,
        country_name: &str,
        search_term: &str,
    ) -> Vec<LocationSelection> {
        let term = if search_term.trim().is_empty() {
            EMPTY_SEARCH_PLACEHOLDER
        } else {
            search_term
        };

        let Some(predictions) = self.places.autocomplete(term, country_code).await else {
            return Vec::new();
        };

        debug!(
            country_code,
            term,
            candidates = predictions.len(),
            "Enriching autocomplete candidates"
        );

        let enrichments: Vec<_> = predictions
            .iter()
            .map(|prediction| self.enrich(prediction, country_name))
            .collect();
        let suggestions: Vec<LocationSelection> = stream::iter(enrichments)
            .buffered(ENRICH_CONCURRENCY)
            .filter_map(|x| async move { x })
            .collect()
            .await;

        info!(
            country_code,
            term,
            candidates = predictions.len(),
            suggestions = suggestions.len(),
            "Location suggestions composed"
        );

        suggestions
    }

    async fn enrich(&self, prediction: &Prediction, country_name: &str) -> Option<LocationSelection> {
        let details = self.places.details(&prediction.place_id).await?;

        let thumb = match details.first_photo_reference() {
            Some(reference) => self.places.photo_url(reference).await,
            None => self.default_thumb.clone(),
        };

        let context = prediction
            .context_term()
            .unwrap_or(country_name)
            .to_string();

        Some(LocationSelection {
            location: details.name,
            context,
            coordinates: details.geometry.location,
            thumb,
        })
    }
}

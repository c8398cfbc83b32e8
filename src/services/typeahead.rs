//! The two flows behind the compose widget: typeahead suggestions and
//! card resolution.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::catalog::CountryIndex;
use crate::models::{Card, LocationSelection, Suggestion, WeatherDisplay, location_cache_key};
use crate::templates::Templates;

use super::cache::{CacheAside, CacheDomain};
use super::suggestions::SuggestionService;
use super::weather::WeatherService;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Missing selection text")]
    MissingSelection,

    #[error("Malformed selection: {0}")]
    MalformedSelection(#[from] serde_json::Error),
}

/// What the typeahead text currently asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeaheadQuery<'a> {
    /// No `"<Country>: "` prefix yet; still picking a country.
    Country(&'a str),
    Location {
        country_name: &'a str,
        country_code: &'a str,
        term: &'a str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub location: Duration,
    pub weather: Duration,
}

#[derive(Clone)]
pub struct TypeaheadService {
    countries: Arc<CountryIndex>,
    suggestions: SuggestionService,
    weather: WeatherService,
    cache: CacheAside,
    templates: Arc<Templates>,
    ttls: CacheTtls,
}

impl TypeaheadService {
    #[must_use]
    pub fn new(
        countries: Arc<CountryIndex>,
        suggestions: SuggestionService,
        weather: WeatherService,
        cache: CacheAside,
        templates: Arc<Templates>,
        ttls: CacheTtls,
    ) -> Self {
        Self {
            countries,
            suggestions,
            weather,
            cache,
            templates,
            ttls,
        }
    }

    #[must_use]
    pub fn parse_query<'a>(&'a self, text: &'a str) -> TypeaheadQuery<'a> {
        match self.countries.split_selection(text) {
            Some((country, rest)) => TypeaheadQuery::Location {
                country_name: &country.name,
                country_code: &country.code,
                term: rest,
            },
            None => TypeaheadQuery::Country(text),
        }
    }

    pub async fn suggest(&self, text: &str) -> Vec<Suggestion> {
        match self.parse_query(text) {
            TypeaheadQuery::Country(query) => self.country_suggestions(query),
            TypeaheadQuery::Location {
                country_name,
                country_code,
                term,
            } => {
                let locations = self.locations(country_code, country_name, term).await;
                self.location_tabs(&locations)
            }
        }
    }

    /// Country picking happens locally; no upstream call until a country
    /// narrows the search.
    #[must_use]
    pub fn country_suggestions(&self, query: &str) -> Vec<Suggestion> {
        let matches = self.countries.search(query);

        if matches.is_empty() {
            return vec![Suggestion::placeholder("country not found")];
        }

        matches
            .into_iter()
            .map(|country| {
                Suggestion::keep_editing(
                    html_escape::encode_text(&country.name),
                    format!("{}: ", country.name),
                )
            })
            .collect()
    }

    /// Cached location suggestions for a country and partial city name.
    pub async fn locations(
        &self,
        country_code: &str,
        country_name: &str,
        term: &str,
    ) -> Vec<LocationSelection> {
        let term = if term.trim().is_empty() {
            crate::constants::EMPTY_SEARCH_PLACEHOLDER
        } else {
            term
        };
        let key = location_cache_key(country_code, term);

        self.cache
            .get_or_compute(CacheDomain::Location, &key, self.ttls.location, || {
                self.suggestions.suggest(country_code, country_name, term)
            })
            .await
    }

    fn location_tabs(&self, locations: &[LocationSelection]) -> Vec<Suggestion> {
        if locations.is_empty() {
            return vec![Suggestion::placeholder("location not found")];
        }

        locations
            .iter()
            .filter_map(|location| {
                let text = serde_json::to_string(location).ok()?;
                Some(Suggestion::final_choice(
                    self.templates.render_location(location),
                    text,
                ))
            })
            .collect()
    }

    /// Cached weather for a selection.
    pub async fn weather(&self, selection: &LocationSelection) -> WeatherDisplay {
        let key = selection.coordinates.cache_key();

        self.cache
            .get_or_compute(CacheDomain::Weather, &key, self.ttls.weather, || {
                self.weather.weather_for(selection)
            })
            .await
    }

    /// Parses a selection previously handed out by [`Self::suggest`] and
    /// renders its weather card.
    pub async fn resolve(&self, text: &str) -> Result<Card, ResolveError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ResolveError::MissingSelection);
        }

        let selection: LocationSelection = serde_json::from_str(text)?;
        let weather = self.weather(&selection).await;

        info!(title = %weather.title, "Resolved weather card");

        Ok(Card {
            body: self.templates.render_weather(&weather),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IconMap;
    use crate::clients::Forecast;
    use crate::services::cache::MemoryCache;
    use crate::services::suggestions::fakes::{FAKE_DEFAULT_THUMB, FakePlaces};
    use crate::services::weather::fakes::FakeForecast;
    use std::sync::atomic::Ordering;

    struct Harness {
        service: TypeaheadService,
        places: Arc<FakePlaces>,
        forecast: Arc<FakeForecast>,
    }

    fn harness(places: FakePlaces, forecast: Option<Forecast>) -> Harness {
        let places = Arc::new(places);
        let forecast = Arc::new(FakeForecast {
            forecast,
            ..Default::default()
        });
        let icons = Arc::new(IconMap::load(None).unwrap());

        let service = TypeaheadService::new(
            Arc::new(CountryIndex::load(None).unwrap()),
            SuggestionService::new(places.clone(), FAKE_DEFAULT_THUMB),
            WeatherService::new(forecast.clone(), icons),
            CacheAside::new(Arc::new(MemoryCache::new(64)), Duration::from_secs(1)),
            Arc::new(Templates::load().unwrap()),
            CacheTtls {
                location: Duration::from_secs(1800),
                weather: Duration::from_secs(900),
            },
        );

        Harness {
            service,
            places,
            forecast,
        }
    }

    fn paris_places() -> FakePlaces {
        let mut places = FakePlaces {
            predictions: Some(vec![FakePlaces::prediction("paris", &["Paris", "France"])]),
            ..Default::default()
        };
        places.details.insert(
            "paris".to_string(),
            FakePlaces::place("Paris", 48.85, 2.35, Some("p1")),
        );
        places
    }

    #[test]
    fn test_parse_query_routes_by_country_prefix() {
        let h = harness(FakePlaces::default(), None);

        assert_eq!(
            h.service.parse_query("France: Pari"),
            TypeaheadQuery::Location {
                country_name: "France",
                country_code: "FR",
                term: "Pari",
            }
        );
        assert_eq!(h.service.parse_query("France"), TypeaheadQuery::Country("France"));
    }

    #[tokio::test]
    async fn test_country_filtering() {
        let h = harness(FakePlaces::default(), None);

        let suggestions = h.service.suggest("France").await;
        assert_eq!(suggestions[0].title, "France");
        assert_eq!(suggestions[0].text, "France: ");
        assert_eq!(suggestions[0].resolve, Some(false));

        let none = h.service.suggest("Atlantis").await;
        assert_eq!(none, vec![Suggestion::placeholder("country not found")]);

        assert!(h.places.autocomplete_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_location_suggestions_are_cached() {
        let h = harness(paris_places(), None);

        let first = h.service.suggest("France: Pari").await;
        let second = h.service.suggest("France: Pari").await;

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        let selection: LocationSelection = serde_json::from_str(&first[0].text).unwrap();
        assert_eq!(selection.location, "Paris");
        assert_eq!(selection.thumb, "https://photos.example.com/p1.jpg");
        assert!(first[0].title.contains("Paris"));

        let calls = h.places.autocomplete_calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("Pari".to_string(), "FR".to_string())]);
    }

    #[tokio::test]
    async fn test_no_locations_yields_placeholder() {
        let h = harness(
            FakePlaces {
                predictions: Some(vec![]),
                ..Default::default()
            },
            None,
        );

        let suggestions = h.service.suggest("France: Qqqq").await;
        assert_eq!(suggestions, vec![Suggestion::placeholder("location not found")]);
    }

    #[tokio::test]
    async fn test_resolve_renders_and_caches_weather() {
        let forecast: Forecast = serde_json::from_str(
            r#"{"timezone": "Europe/Paris", "currently": {"time": 1623758400, "summary": "Sunny", "icon": "clear-day", "temperature": 70}}"#,
        )
        .unwrap();
        let h = harness(FakePlaces::default(), Some(forecast));

        let text = r#" {"location":"Paris","context":"France","coordinates":{"lat":48.85,"lng":2.35},"thumb":"t.png"} "#;
        let card = h.service.resolve(text).await.unwrap();
        assert!(card.body.contains("Paris, France"));
        assert!(card.body.contains("Sunny"));

        h.service.resolve(text).await.unwrap();
        assert_eq!(h.forecast.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_rejects_malformed_input() {
        let h = harness(FakePlaces::default(), None);

        assert!(matches!(
            h.service.resolve("   ").await,
            Err(ResolveError::MissingSelection)
        ));
        assert!(matches!(
            h.service.resolve("{not json").await,
            Err(ResolveError::MalformedSelection(_))
        ));
    }
}

pub mod darksky;
pub mod places;

pub use darksky::{DarkSkyClient, Forecast, ForecastApi};
pub use places::{PlaceDetails, PlacesApi, PlacesClient, Prediction};

pub(crate) fn record_upstream(provider: &'static str, ok: bool) {
    let outcome = if ok { "success" } else { "unavailable" };
    metrics::counter!("upstream_requests_total", "provider" => provider, "outcome" => outcome)
        .increment(1);
}

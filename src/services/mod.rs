pub mod cache;
pub use cache::{CacheAside, CacheDomain, CacheError, CacheStore, MemoryCache};

pub mod icons;

pub mod suggestions;
pub use suggestions::SuggestionService;

pub mod weather;
pub use weather::WeatherService;

pub mod typeahead;
pub use typeahead::{CacheTtls, ResolveError, TypeaheadQuery, TypeaheadService};

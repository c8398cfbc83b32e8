pub mod location;
pub mod suggestion;
pub mod weather;

pub use location::{Coordinates, LocationSelection, location_cache_key};
pub use suggestion::{Card, Suggestion};
pub use weather::{Temperature, WeatherDisplay};

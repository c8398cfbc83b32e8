pub const DEFAULT_THUMB_URL: &str = "https://assets.wthrn.com/images/Location-Default.png";

/// Stand-in search term so autocomplete still returns candidates for an empty query.
pub const EMPTY_SEARCH_PLACEHOLDER: &str = "a";

pub mod cache {

    pub const WEATHER_TTL_SECONDS: u64 = 900;

    pub const LOCATION_TTL_SECONDS: u64 = 1800;

    pub const MEMORY_MAX_ENTRIES: u64 = 10_000;
}

pub mod icons {

    pub const DEFAULT: &str = "default";

    pub const THERMOMETER: &str = "thermo";

    pub const NIGHT_SUFFIX: &str = "-night";
}

pub mod places {

    pub const AUTOCOMPLETE_TYPES: &str = "(cities)";

    pub const LANGUAGE: &str = "en_US";

    pub const THUMB_SIZE: u32 = 40;
}

pub mod forecast {

    pub const EXCLUDE: &str = "hourly,alerts,flags";
}

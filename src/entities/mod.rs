pub mod prelude;

pub mod cache_entries;

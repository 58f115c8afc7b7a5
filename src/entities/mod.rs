pub mod prelude;

pub mod movies;
pub mod search_cache;

pub use super::movies::Entity as Movies;
pub use super::search_cache::Entity as SearchCache;

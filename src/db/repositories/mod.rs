pub mod cache;
pub mod movie;
pub mod search_index;

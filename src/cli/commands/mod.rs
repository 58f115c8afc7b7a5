mod ingest;
mod search;

pub use ingest::cmd_ingest;
pub use search::cmd_search;

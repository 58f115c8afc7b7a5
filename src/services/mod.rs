pub mod catalog;
pub use catalog::{CatalogStore, FieldWeight, IndexQueryError, SearchIndex, StoreError};

pub mod ingestion;
pub use ingestion::{IngestionError, IngestionJob, IngestionReport, ItemOutcome};

pub mod metadata;
pub use metadata::{MetadataProvider, ProviderError};

pub mod result_cache;
pub use result_cache::{CacheError, ResultCache};

pub mod scheduler;
pub use scheduler::{InitialRun, Scheduler};

pub mod search;
pub use search::{SearchError, SearchOutcome, SearchService};

use serde::Serialize;

use crate::domain::Provenance;
use crate::models::movie::MovieRecord;
use crate::services::IngestionReport;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResultsDto {
    pub results: Vec<MovieRecord>,
    pub source: Provenance,
    pub count: usize,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct FetchResultDto {
    #[serde(flatten)]
    pub report: IngestionReport,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub catalog_size: u64,
    pub search_backend: String,
}

pub(crate) fn elapsed_ms(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

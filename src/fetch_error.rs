#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Failed to read local resource: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing expected column or field: {0}")]
    MissingColumn(String),
    #[error("Invalid station catalog: {0}")]
    InvalidCatalog(String),
    #[error("Document contained no data rows")]
    EmptyDocument,
}

impl FetchError {
    /// True for transport-level failures (network, non-2xx status, file access).
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { .. } | Self::Io(_))
    }

    /// True for malformed or incomplete documents.
    pub fn is_parse_failure(&self) -> bool {
        !self.is_fetch_failure()
    }
}

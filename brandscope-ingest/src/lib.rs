//! Ingestion policy: validate the URL, dedupe, scrape, admit, persist.
//!
//! Validation fails fast and in a fixed order, and no network fetch happens
//! until the URL has passed every gate. A scrape that comes back as the
//! reserved sentinel pair is rejected without creating a record, so the
//! store only ever holds websites that produced real metadata.

use brandscope_scrape::MetadataExtractor;
use brandscope_store::{NewWebsite, StoreError, WebsiteStore};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Maximum accepted URL length, in bytes of the trimmed input.
pub const MAX_URL_LEN: usize = 2048;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("URL is required")]
    MissingUrl,
    #[error("Invalid URL format")]
    InvalidUrlFormat,
    #[error("URL is too long (max {} characters)", MAX_URL_LEN)]
    UrlTooLong,
    #[error("Website already exists")]
    DuplicateUrl,
    #[error("Website could not be scraped")]
    Unscrapable,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a successful ingest hands back. The creation response carries the
/// id and brand name only, never the description.
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    pub id: i64,
    pub brand_name: String,
}

pub struct Ingestor {
    store: WebsiteStore,
    extractor: MetadataExtractor,
}

impl Ingestor {
    pub fn new(store: WebsiteStore, extractor: MetadataExtractor) -> Self {
        Self { store, extractor }
    }

    /// Validate, scrape, and persist one URL.
    ///
    /// Gate order: missing, invalid format, oversized, already known. Only
    /// then is the page fetched; a sentinel extraction is rejected as
    /// [`IngestError::Unscrapable`]. A uniqueness race lost at insert time
    /// still comes back as [`IngestError::DuplicateUrl`] because the store
    /// constraint has the final word.
    pub async fn ingest(&self, raw_url: &str) -> Result<IngestReceipt, IngestError> {
        let trimmed = raw_url.trim();
        if trimmed.is_empty() {
            return Err(IngestError::MissingUrl);
        }
        let parsed = Url::parse(trimmed).map_err(|_| IngestError::InvalidUrlFormat)?;
        if trimmed.len() > MAX_URL_LEN {
            return Err(IngestError::UrlTooLong);
        }

        // Records are keyed by the normalized serialization, which also
        // percent-encodes anything unsafe before the fetch.
        let normalized = parsed.to_string();
        if self.store.find_by_url(&normalized).await?.is_some() {
            debug!(url = %normalized, "ingest.duplicate");
            return Err(IngestError::DuplicateUrl);
        }

        let extracted = self.extractor.extract(&normalized).await;
        if extracted.is_sentinel() {
            return Err(IngestError::Unscrapable);
        }

        match self
            .store
            .create(NewWebsite {
                url: normalized.clone(),
                brand_name: extracted.brand_name,
                description: extracted.description,
            })
            .await
        {
            Ok(record) => {
                info!(id = record.id, url = %normalized, "ingest.created");
                Ok(IngestReceipt {
                    id: record.id,
                    brand_name: record.brand_name,
                })
            }
            Err(StoreError::DuplicateUrl) => {
                debug!(url = %normalized, "ingest.duplicate_race");
                Err(IngestError::DuplicateUrl)
            }
            Err(other) => Err(IngestError::Store(other)),
        }
    }
}

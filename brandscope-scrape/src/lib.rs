//! Brand metadata scraping for Brandscope.
//!
//! This crate fetches a web page and distils it to a `(brand name,
//! description)` pair. The public entry point is
//! [`extract::MetadataExtractor`], which never fails: any problem along the
//! way (bad URL, network error, non-HTML response) collapses into the
//! reserved sentinel pair so callers can treat "could not scrape" as an
//! ordinary value rather than an error path.
//!
//! The network edge is the [`fetch::PageFetcher`] trait; production code
//! uses the reqwest-backed [`fetch::HttpFetcher`], tests substitute stubs.

pub mod extract;
pub mod fetch;

pub use extract::{
    ExtractionResult, MetadataExtractor, DEFAULT_DESCRIPTION, SENTINEL_BRAND_NAME,
    SENTINEL_DESCRIPTION,
};
pub use fetch::{FetchError, FetchedPage, HttpFetcher, PageFetcher};

//! Port for the external catalog-lookup collaborator.
//!
//! The catalog is queried only to prefill an item's cover art before
//! registration. It is strictly best-effort: unavailability must never
//! block registering an item.

use async_trait::async_trait;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by catalog lookup adapters.
    pub enum CatalogLookupError {
        /// The catalog endpoint could not be reached.
        Transport => "catalog lookup transport failed: {message}",
        /// The catalog response could not be decoded.
        Decode => "catalog lookup decode failed: {message}",
    }
}

/// A catalog match for a searched title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Canonical title as known to the catalog.
    pub title: String,
    /// Cover image URL, when the catalog has one.
    pub cover_url: Option<String>,
}

/// Port for searching the external game catalog by title.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Return the best match for `title`, or `None` when nothing matches.
    async fn lookup(&self, title: &str) -> Result<Option<CatalogEntry>, CatalogLookupError>;
}

/// Lookup that never matches; used when no catalog endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCatalogLookup;

#[async_trait]
impl CatalogLookup for NoopCatalogLookup {
    async fn lookup(&self, _title: &str) -> Result<Option<CatalogEntry>, CatalogLookupError> {
        Ok(None)
    }
}

//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};

use crate::domain::ReturnPolicy;
use crate::domain::ports::{CatalogLookup, NoopCatalogLookup};
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) return_policy: ReturnPolicy,
    pub(crate) catalog: Arc<dyn CatalogLookup>,
}

impl ServerConfig {
    /// Construct a server configuration with the default return policy and
    /// no catalog endpoint.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        db_pool: DbPool,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool,
            return_policy: ReturnPolicy::default(),
            catalog: Arc::new(NoopCatalogLookup),
        }
    }

    /// Set who may mark a loan returned.
    #[must_use]
    pub fn with_return_policy(mut self, return_policy: ReturnPolicy) -> Self {
        self.return_policy = return_policy;
        self
    }

    /// Attach a catalog lookup for cover-art prefill.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogLookup>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

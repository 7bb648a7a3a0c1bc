//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ItemRegistry, LoanCommand, LoanQuery, LoginService, UsersQuery};

/// Dependency bundle for HTTP handlers, one field per driving port.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub items: Arc<dyn ItemRegistry>,
    pub loans: Arc<dyn LoanCommand>,
    pub loans_query: Arc<dyn LoanQuery>,
}

impl HttpState {
    /// Construct state from the port implementations.
    pub fn new(
        login: Arc<dyn LoginService>,
        users: Arc<dyn UsersQuery>,
        items: Arc<dyn ItemRegistry>,
        loans: Arc<dyn LoanCommand>,
        loans_query: Arc<dyn LoanQuery>,
    ) -> Self {
        Self {
            login,
            users,
            items,
            loans,
            loans_query,
        }
    }
}

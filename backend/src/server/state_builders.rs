//! Builders assembling domain services over the configured adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::Clock;

use crate::domain::{ItemRegistryService, LoanLedgerService};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    DieselItemRepository, DieselLoanStore, DieselLoginService, DieselUsersQuery,
};

use super::ServerConfig;

/// Build the shared HTTP state from the configured pool and catalog.
///
/// The loan ledger implements both the command and query ports, so one
/// instance backs both state fields.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let pool = config.db_pool.clone();

    let login = Arc::new(DieselLoginService::new(pool.clone()));
    let users = Arc::new(DieselUsersQuery::new(pool.clone()));
    let items = Arc::new(DieselItemRepository::new(pool.clone()));
    let loans = Arc::new(DieselLoanStore::new(pool));

    let clock: Arc<dyn Clock> = Arc::new(mockable::DefaultClock);
    let registry = Arc::new(ItemRegistryService::new(
        items.clone(),
        config.catalog.clone(),
        clock.clone(),
    ));
    let ledger = Arc::new(LoanLedgerService::new(
        loans,
        items,
        clock,
        config.return_policy,
    ));

    web::Data::new(HttpState::new(
        login,
        users,
        registry,
        ledger.clone(),
        ledger,
    ))
}

//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`ItemRegistry`, `LoanCommand`, `LoanQuery`, `UsersQuery`,
//! `LoginService`) are implemented by domain services and consumed by
//! inbound adapters; driven ports (`ItemRepository`, `LoanStore`,
//! `CatalogLookup`) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod catalog_lookup;
mod item_registry;
mod item_repository;
mod loan_command;
mod loan_query;
mod loan_store;
mod login_service;
mod users_query;

#[cfg(test)]
pub use catalog_lookup::MockCatalogLookup;
pub use catalog_lookup::{CatalogEntry, CatalogLookup, CatalogLookupError, NoopCatalogLookup};
#[cfg(test)]
pub use item_registry::MockItemRegistry;
pub use item_registry::{
    ItemRegistry, ItemSummary, ListItemsRequest, RegisterItemRequest, RemoveItemRequest,
};
#[cfg(test)]
pub use item_repository::MockItemRepository;
pub use item_repository::{ItemRepository, ItemRepositoryError, ItemWithOwner, RemovalOutcome};
#[cfg(test)]
pub use loan_command::MockLoanCommand;
pub use loan_command::{
    DirectLendRequest, LoanCommand, RequestBorrowRequest, ReturnLoanRequest, ReturnTarget,
};
#[cfg(test)]
pub use loan_query::MockLoanQuery;
pub use loan_query::{LoanQuery, LoanSummary};
#[cfg(test)]
pub use loan_store::MockLoanStore;
pub use loan_store::{LoanStore, LoanStoreError, LoanWithContext};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FixtureLoginService, LoginService};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::{FixtureUsersQuery, UsersQuery};

//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven ports backed by PostgreSQL via
//! `diesel-async` with `bb8` connection pooling.
//!
//! Principles:
//!
//! - **Thin adapters**: implementations only translate between Diesel rows
//!   and domain types; the lifecycle rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leak to the domain layer.
//! - **Atomic transitions**: the loan store runs each paired loan/item
//!   mutation in one transaction with an optimistic availability check.

mod diesel_item_repository;
mod diesel_loan_store;
mod diesel_login_service;
mod diesel_users_query;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_item_repository::DieselItemRepository;
pub use diesel_loan_store::DieselLoanStore;
pub use diesel_login_service::DieselLoginService;
pub use diesel_users_query::DieselUsersQuery;
pub use pool::{DbPool, PoolConfig, PoolError};

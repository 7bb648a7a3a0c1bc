//! Domain core: entities, the loan-lifecycle state machine, and ports.
//!
//! Purpose: hold every rule of the lending system in framework-free types
//! and services. Inbound adapters call the driving ports; outbound adapters
//! implement the driven ports; nothing in this module knows about HTTP or
//! SQL.

pub mod auth;
pub mod authorization;
pub mod due_date;
pub mod error;
pub mod item;
pub mod loan;
pub mod ports;
pub mod user;

mod item_registry_service;
mod loan_ledger_service;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::authorization::{ActorRule, Parties, ReturnPolicy, Transition, authorize, rule_for};
pub use self::due_date::{DUE_SOON_THRESHOLD_DAYS, DueStatus, classify, days_remaining};
pub use self::error::{Error, ErrorCode};
pub use self::item::{
    Availability, DEFAULT_PLATFORM, Item, ItemId, ItemMetadata, ItemValidationError, Title,
};
pub use self::item_registry_service::ItemRegistryService;
pub use self::loan::{
    DURATION_MAX_DAYS, DURATION_MIN_DAYS, Loan, LoanDuration, LoanId, LoanStatus,
    LoanValidationError,
};
pub use self::loan_ledger_service::LoanLedgerService;
pub use self::user::{DisplayName, User, UserId, UserValidationError};

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;

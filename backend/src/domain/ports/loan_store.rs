//! Driven port for loan persistence and the atomic lifecycle transitions.
//!
//! The two mutating operations each touch the loan and the item in one
//! atomic step. Adapters implement them as a single transaction with an
//! optimistic availability-flip precondition, so a reader can never observe
//! an item marked loaned without a matching active loan, or the reverse.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::item::ItemId;
use crate::domain::loan::{Loan, LoanId};
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by loan store adapters.
    pub enum LoanStoreError {
        /// Store connection could not be established.
        Connection => "loan store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "loan store query failed: {message}",
        /// The item was not in the availability state the transition
        /// requires; the caller lost a race and must report a conflict.
        StaleState => "item availability changed underneath the transition: {message}",
        /// A mutation may have partially applied and its completion cannot
        /// be confirmed; the caller must reconcile rather than retry.
        Indeterminate => "loan store mutation outcome unknown: {message}",
    }
}

/// A loan joined with the context read paths need: the item's title and
/// owner plus both parties' display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanWithContext {
    /// The loan record.
    pub loan: Loan,
    /// Title of the item on loan.
    pub item_title: String,
    /// Owner of the item on loan.
    pub owner: UserId,
    /// Owner display name.
    pub owner_name: String,
    /// Borrower display name.
    pub borrower_name: String,
}

/// Port for loan records and the paired item-state transitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Atomically create an active loan and flip its item to loaned.
    ///
    /// Fails with [`LoanStoreError::StaleState`] when the item is not
    /// available at execution time, which is how two concurrent borrows on
    /// the same item are reduced to one winner.
    async fn open_loan(&self, loan: &Loan) -> Result<(), LoanStoreError>;

    /// Atomically mark an active loan returned and flip its item back to
    /// available, stamping `returned_at`.
    ///
    /// Fails with [`LoanStoreError::StaleState`] when the loan is no longer
    /// active at execution time.
    async fn close_loan(
        &self,
        loan_id: &LoanId,
        returned_at: DateTime<Utc>,
    ) -> Result<(), LoanStoreError>;

    /// Find the active loan referencing an item, if any.
    async fn find_active_by_item(
        &self,
        item_id: &ItemId,
    ) -> Result<Option<Loan>, LoanStoreError>;

    /// Find a loan by id regardless of status.
    async fn find_by_id(&self, loan_id: &LoanId) -> Result<Option<Loan>, LoanStoreError>;

    /// Loans where `user` is the borrower, newest first, joined with item
    /// and party context.
    async fn list_borrowed_by(
        &self,
        user: &UserId,
    ) -> Result<Vec<LoanWithContext>, LoanStoreError>;

    /// Loans against items owned by `user`, newest first, active and
    /// returned alike; callers partition by status.
    async fn list_lent_by(&self, user: &UserId) -> Result<Vec<LoanWithContext>, LoanStoreError>;
}

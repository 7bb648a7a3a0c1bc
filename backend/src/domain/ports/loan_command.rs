//! Driving port for loan-lifecycle commands.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::item::ItemId;
use crate::domain::loan::{Loan, LoanId};
use crate::domain::user::UserId;

/// Request payload for a borrower-initiated borrow.
#[derive(Debug, Clone)]
pub struct RequestBorrowRequest {
    /// The authenticated user asking to borrow.
    pub borrower: UserId,
    /// The item to borrow.
    pub item_id: ItemId,
}

/// Request payload for an owner-initiated lend.
#[derive(Debug, Clone)]
pub struct DirectLendRequest {
    /// The authenticated user lending the item; must be the owner.
    pub actor: UserId,
    /// The item to lend.
    pub item_id: ItemId,
    /// The user receiving the item.
    pub borrower: UserId,
    /// Loan duration in whole days; policy range 1 to 365.
    pub days: i64,
}

/// Reference naming the active loan a return targets.
///
/// Item-keyed and loan-keyed returns are two addressing modes of one
/// transition: they resolve to the same effect and authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnTarget {
    /// Close the active loan on this item.
    Item(ItemId),
    /// Close this loan.
    Loan(LoanId),
}

/// Request payload for returning an item.
#[derive(Debug, Clone)]
pub struct ReturnLoanRequest {
    /// The authenticated user confirming the return.
    pub actor: UserId,
    /// Which active loan to close.
    pub target: ReturnTarget,
}

/// State-machine commands owned by the loan ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanCommand: Send + Sync {
    /// Open an open-ended loan on an available item.
    async fn request_borrow(&self, request: RequestBorrowRequest) -> Result<Loan, Error>;

    /// Open a due-dated loan chosen by the owner.
    async fn direct_lend(&self, request: DirectLendRequest) -> Result<Loan, Error>;

    /// Close an active loan and release the item.
    async fn return_loan(&self, request: ReturnLoanRequest) -> Result<(), Error>;
}

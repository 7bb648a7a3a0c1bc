//! Driving port for loan read models.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::due_date::DueStatus;
use crate::domain::error::Error;
use crate::domain::item::ItemId;
use crate::domain::loan::{LoanId, LoanStatus};
use crate::domain::user::UserId;

/// One loan row as presented to callers, joined and due-date classified.
///
/// `counterparty` is the other party from the caller's perspective: the
/// owner on a borrowed listing, the borrower on a lent listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanSummary {
    /// Stable loan identifier.
    pub id: LoanId,
    /// The item on loan.
    pub item_id: ItemId,
    /// Title of the item on loan.
    pub item_title: String,
    /// The other party's identifier.
    pub counterparty: UserId,
    /// The other party's display name.
    pub counterparty_name: String,
    /// Lifecycle status.
    pub status: LoanStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional due timestamp.
    pub due_at: Option<DateTime<Utc>>,
    /// Return timestamp, present once returned.
    pub returned_at: Option<DateTime<Utc>>,
    /// Ceiling of whole days until due; `None` for open-ended loans.
    pub days_remaining: Option<i64>,
    /// Due-date classification used by warning surfaces.
    pub due_status: DueStatus,
}

/// Read models owned by the loan ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanQuery: Send + Sync {
    /// Loans the user is currently or was previously borrowing.
    async fn borrowed_by(&self, user: &UserId) -> Result<Vec<LoanSummary>, Error>;

    /// Loans against the user's items, active and returned alike.
    async fn lent_by(&self, user: &UserId) -> Result<Vec<LoanSummary>, Error>;
}

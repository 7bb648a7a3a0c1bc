//! Loan ledger domain service.
//!
//! Single owner of the loan-lifecycle state machine. Every transition runs
//! the authorization rule table first, then delegates the paired loan/item
//! mutation to the loan store's atomic operations. Losing an availability
//! race inside the store surfaces to callers as a conflict on open and as
//! not-found on close.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use crate::domain::authorization::{Parties, ReturnPolicy, Transition, authorize};
use crate::domain::due_date::{classify, days_remaining};
use crate::domain::error::Error;
use crate::domain::item::{Item, ItemId};
use crate::domain::loan::{Loan, LoanDuration, LoanValidationError};
use crate::domain::ports::{
    DirectLendRequest, ItemRepository, ItemRepositoryError, LoanCommand, LoanQuery, LoanStore,
    LoanStoreError, LoanSummary, LoanWithContext, RequestBorrowRequest, ReturnLoanRequest,
    ReturnTarget,
};
use crate::domain::user::UserId;

fn map_item_repository_error(error: ItemRepositoryError) -> Error {
    match error {
        ItemRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("item repository unavailable: {message}"))
        }
        ItemRepositoryError::Query { message } => {
            Error::internal(format!("item repository error: {message}"))
        }
    }
}

/// Map the store errors whose meaning does not depend on the transition.
///
/// [`LoanStoreError::StaleState`] is deliberately absent; each call site
/// translates it into the status its transition promises.
fn map_store_error(error: LoanStoreError) -> Error {
    match error {
        LoanStoreError::Connection { message } => {
            Error::service_unavailable(format!("loan store unavailable: {message}"))
        }
        LoanStoreError::Query { message } => {
            Error::internal(format!("loan store error: {message}"))
        }
        LoanStoreError::StaleState { message } => {
            Error::conflict(format!("item state changed: {message}"))
        }
        LoanStoreError::Indeterminate { message } => Error::indeterminate(format!(
            "the transition may not have completed; check the loan before retrying: {message}"
        )),
    }
}

fn item_not_found(request_item: impl std::fmt::Display) -> Error {
    Error::not_found(format!("item {request_item} not found"))
}

/// Which side of a loan listing the caller sits on.
#[derive(Debug, Clone, Copy)]
enum Perspective {
    Borrowed,
    Lent,
}

/// Loan ledger service implementing [`LoanCommand`] and [`LoanQuery`].
#[derive(Clone)]
pub struct LoanLedgerService<S, R> {
    loans: Arc<S>,
    items: Arc<R>,
    clock: Arc<dyn Clock>,
    return_policy: ReturnPolicy,
}

impl<S, R> LoanLedgerService<S, R> {
    /// Create a new ledger over a loan store and item repository.
    pub fn new(
        loans: Arc<S>,
        items: Arc<R>,
        clock: Arc<dyn Clock>,
        return_policy: ReturnPolicy,
    ) -> Self {
        Self {
            loans,
            items,
            clock,
            return_policy,
        }
    }
}

impl<S, R> LoanLedgerService<S, R>
where
    S: LoanStore,
    R: ItemRepository,
{
    async fn find_item(&self, item_id: &ItemId) -> Result<Item, Error> {
        self.items
            .find_by_id(item_id)
            .await
            .map_err(map_item_repository_error)?
            .ok_or_else(|| item_not_found(item_id))
    }

    /// Resolve a return target to its loan, rejecting non-active loans.
    ///
    /// Both addressing modes land here so their behaviour cannot drift: a
    /// returned loan is indistinguishable from a missing one.
    async fn resolve_active_loan(&self, target: ReturnTarget) -> Result<Loan, Error> {
        let loan = match target {
            ReturnTarget::Item(item_id) => self
                .loans
                .find_active_by_item(&item_id)
                .await
                .map_err(map_store_error)?
                .ok_or_else(|| {
                    Error::not_found(format!("no active loan for item {item_id}"))
                })?,
            ReturnTarget::Loan(loan_id) => self
                .loans
                .find_by_id(&loan_id)
                .await
                .map_err(map_store_error)?
                .ok_or_else(|| Error::not_found(format!("loan {loan_id} not found")))?,
        };
        if !loan.is_active() {
            return Err(Error::not_found(format!(
                "loan {} is not active",
                loan.id()
            )));
        }
        Ok(loan)
    }

    fn summarize(&self, row: LoanWithContext, perspective: Perspective) -> LoanSummary {
        let now = self.clock.utc();
        let LoanWithContext {
            loan,
            item_title,
            owner,
            owner_name,
            borrower_name,
        } = row;
        let (counterparty, counterparty_name) = match perspective {
            Perspective::Borrowed => (owner, owner_name),
            Perspective::Lent => (*loan.borrower(), borrower_name),
        };
        LoanSummary {
            id: *loan.id(),
            item_id: *loan.item_id(),
            item_title,
            counterparty,
            counterparty_name,
            status: loan.status(),
            created_at: loan.created_at(),
            due_at: loan.due_at(),
            returned_at: loan.returned_at(),
            days_remaining: days_remaining(loan.due_at(), now),
            due_status: classify(loan.due_at(), now),
        }
    }
}

#[async_trait]
impl<S, R> LoanCommand for LoanLedgerService<S, R>
where
    S: LoanStore,
    R: ItemRepository,
{
    async fn request_borrow(&self, request: RequestBorrowRequest) -> Result<Loan, Error> {
        let item = self.find_item(&request.item_id).await?;
        authorize(
            Transition::RequestBorrow,
            self.return_policy,
            Parties {
                actor: &request.borrower,
                owner: item.owner(),
                borrower: None,
            },
        )?;
        if !item.is_available() {
            return Err(Error::conflict("item is already on loan"));
        }

        let loan = Loan::open_request(request.item_id, request.borrower, self.clock.utc());
        match self.loans.open_loan(&loan).await {
            Ok(()) => Ok(loan),
            Err(LoanStoreError::StaleState { .. }) => {
                Err(Error::conflict("item is already on loan"))
            }
            Err(err) => Err(map_store_error(err)),
        }
    }

    async fn direct_lend(&self, request: DirectLendRequest) -> Result<Loan, Error> {
        let duration = LoanDuration::from_days(request.days).map_err(|err| match err {
            LoanValidationError::DurationOutOfRange { min, max } => {
                Error::invalid_request(err.to_string())
                    .with_details(json!({ "days": request.days, "min": min, "max": max }))
            }
            other => Error::invalid_request(other.to_string()),
        })?;
        if request.borrower == request.actor {
            return Err(Error::invalid_request("you cannot lend an item to yourself"));
        }

        let item = self.find_item(&request.item_id).await?;
        authorize(
            Transition::DirectLend,
            self.return_policy,
            Parties {
                actor: &request.actor,
                owner: item.owner(),
                borrower: None,
            },
        )?;
        if !item.is_available() {
            return Err(Error::conflict("item is already on loan"));
        }

        let loan = Loan::open_lend(
            request.item_id,
            request.borrower,
            duration,
            self.clock.utc(),
        );
        match self.loans.open_loan(&loan).await {
            Ok(()) => Ok(loan),
            Err(LoanStoreError::StaleState { .. }) => {
                Err(Error::conflict("item is already on loan"))
            }
            Err(err) => Err(map_store_error(err)),
        }
    }

    async fn return_loan(&self, request: ReturnLoanRequest) -> Result<(), Error> {
        let loan = self.resolve_active_loan(request.target).await?;
        let item = self.find_item(loan.item_id()).await?;
        authorize(
            Transition::Return,
            self.return_policy,
            Parties {
                actor: &request.actor,
                owner: item.owner(),
                borrower: Some(loan.borrower()),
            },
        )?;

        match self.loans.close_loan(loan.id(), self.clock.utc()).await {
            Ok(()) => Ok(()),
            // The loan stopped being active between resolution and close; a
            // second return of the same loan reads as not-found.
            Err(LoanStoreError::StaleState { .. }) => Err(Error::not_found(format!(
                "loan {} is not active",
                loan.id()
            ))),
            Err(err) => Err(map_store_error(err)),
        }
    }
}

#[async_trait]
impl<S, R> LoanQuery for LoanLedgerService<S, R>
where
    S: LoanStore,
    R: ItemRepository,
{
    async fn borrowed_by(&self, user: &UserId) -> Result<Vec<LoanSummary>, Error> {
        let rows = self
            .loans
            .list_borrowed_by(user)
            .await
            .map_err(map_store_error)?;
        Ok(rows
            .into_iter()
            .map(|row| self.summarize(row, Perspective::Borrowed))
            .collect())
    }

    async fn lent_by(&self, user: &UserId) -> Result<Vec<LoanSummary>, Error> {
        let rows = self
            .loans
            .list_lent_by(user)
            .await
            .map_err(map_store_error)?;
        Ok(rows
            .into_iter()
            .map(|row| self.summarize(row, Perspective::Lent))
            .collect())
    }
}

#[cfg(test)]
#[path = "loan_ledger_service_tests.rs"]
mod tests;

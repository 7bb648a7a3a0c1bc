//! Diesel-backed implementation of the loan store port.
//!
//! The two mutating transitions run inside a single transaction with an
//! optimistic precondition on the current state: opening a loan flips the
//! item row from `available` to `loaned` and treats zero updated rows as a
//! lost race; closing a loan flips the loan row from `active` to `returned`
//! the same way. The partial unique index on active loans backstops the
//! open path against anything the availability flip misses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{LoanStore, LoanStoreError, LoanWithContext};
use crate::domain::{ItemId, Loan, LoanId, UserId};

use super::error_mapping::{is_connection_loss, map_diesel_error, map_pool_error};
use super::models::{
    AVAILABILITY_AVAILABLE, AVAILABILITY_LOANED, ItemRow, LOAN_STATUS_ACTIVE, LOAN_STATUS_RETURNED,
    LoanRow, NewLoanRow, RowConversionError,
};
use super::pool::DbPool;
use super::schema::{items, loans, users};

/// PostgreSQL loan store.
#[derive(Clone)]
pub struct DieselLoanStore {
    pool: DbPool,
}

/// Error carried through a lifecycle transaction.
///
/// `Stale` rolls the transaction back without touching either row; the
/// caller translates it into the port's `StaleState`.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Stale,
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Diesel(err)
    }
}

/// Translate a transaction error into a port error.
///
/// `commit_pending` is set once every statement in the closure has
/// succeeded, so a connection loss after that point means the COMMIT
/// acknowledgement was lost and the outcome is unknown.
fn map_tx_error(err: TxError, commit_pending: bool, stale_message: &str) -> LoanStoreError {
    match err {
        TxError::Stale => LoanStoreError::stale_state(stale_message),
        TxError::Diesel(err) if commit_pending && is_connection_loss(&err) => {
            debug!(error = %err, "connection lost while committing a loan transition");
            LoanStoreError::indeterminate(err)
        }
        TxError::Diesel(err) => {
            map_diesel_error(&err, LoanStoreError::connection, LoanStoreError::query)
        }
    }
}

fn map_conversion_error(err: RowConversionError) -> LoanStoreError {
    LoanStoreError::query(err)
}

impl DieselLoanStore {
    /// Create a loan store backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check out a connection, retrying the checkout once.
    ///
    /// Checkout happens before any statement is issued, so the retry can
    /// never duplicate a side effect.
    async fn checkout(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, LoanStoreError> {
        match self.pool.get().await {
            Ok(conn) => Ok(conn),
            Err(first) => {
                debug!(error = %first, "pool checkout failed; retrying once");
                self.pool
                    .get()
                    .await
                    .map_err(|err| map_pool_error(&err, LoanStoreError::connection))
            }
        }
    }

    async fn find_loan_row(
        &self,
        predicate: impl FnOnce(
            loans::table,
        ) -> loans::BoxedQuery<'static, diesel::pg::Pg>,
    ) -> Result<Option<Loan>, LoanStoreError> {
        let mut conn = self.checkout().await?;

        let row = predicate(loans::table)
            .select(LoanRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                map_diesel_error(&err, LoanStoreError::connection, LoanStoreError::query)
            })?;

        row.map(LoanRow::into_loan)
            .transpose()
            .map_err(map_conversion_error)
    }

    /// Resolve display names for the users referenced by a page of loans
    /// and assemble the context rows.
    async fn assemble_context(
        conn: &mut AsyncPgConnection,
        rows: Vec<(LoanRow, ItemRow)>,
    ) -> Result<Vec<LoanWithContext>, LoanStoreError> {
        let mut user_ids: Vec<Uuid> = rows
            .iter()
            .flat_map(|(loan, item)| [loan.borrower_id, item.owner_id])
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let names: HashMap<Uuid, String> = users::table
            .filter(users::id.eq_any(&user_ids))
            .select((users::id, users::display_name))
            .load::<(Uuid, String)>(conn)
            .await
            .map_err(|err| {
                map_diesel_error(&err, LoanStoreError::connection, LoanStoreError::query)
            })?
            .into_iter()
            .collect();

        let display_name = |id: Uuid| -> Result<String, LoanStoreError> {
            names.get(&id).cloned().ok_or_else(|| {
                LoanStoreError::query(format!("user {id} referenced by a loan does not exist"))
            })
        };

        rows.into_iter()
            .map(|(loan_row, item_row)| {
                Ok(LoanWithContext {
                    owner_name: display_name(item_row.owner_id)?,
                    borrower_name: display_name(loan_row.borrower_id)?,
                    item_title: item_row.title,
                    owner: UserId::from_uuid(item_row.owner_id),
                    loan: loan_row.into_loan().map_err(map_conversion_error)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl LoanStore for DieselLoanStore {
    async fn open_loan(&self, loan: &Loan) -> Result<(), LoanStoreError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let row = NewLoanRow::from_loan(loan);
        let item_target = *loan.item_id().as_uuid();
        // Declared before the connection so it outlives the borrow the
        // transaction closure holds on it.
        let commit_pending = AtomicBool::new(false);

        let mut conn = self.checkout().await?;

        let result = conn
            .transaction::<(), TxError, _>(|conn| {
                let commit_pending = &commit_pending;
                async move {
                    let flipped = diesel::update(
                        items::table
                            .find(item_target)
                            .filter(items::availability.eq(AVAILABILITY_AVAILABLE)),
                    )
                    .set(items::availability.eq(AVAILABILITY_LOANED))
                    .execute(conn)
                    .await?;

                    if flipped == 0 {
                        return Err(TxError::Stale);
                    }

                    diesel::insert_into(loans::table)
                        .values(&row)
                        .execute(conn)
                        .await
                        .map_err(|err| match err {
                            // Backstop: the partial unique index on active
                            // loans also reads as a lost race.
                            diesel::result::Error::DatabaseError(
                                diesel::result::DatabaseErrorKind::UniqueViolation,
                                _,
                            ) => TxError::Stale,
                            other => TxError::Diesel(other),
                        })?;

                    commit_pending.store(true, Ordering::SeqCst);
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        result.map_err(|err| {
            // UFCS: with `RunQueryDsl` in scope a plain `.load(..)` call
            // resolves to the query trait, not the atomic.
            map_tx_error(
                err,
                AtomicBool::load(&commit_pending, Ordering::SeqCst),
                "item is not available",
            )
        })
    }

    async fn close_loan(
        &self,
        loan_id: &LoanId,
        returned_at: DateTime<Utc>,
    ) -> Result<(), LoanStoreError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let loan_target = *loan_id.as_uuid();
        let commit_pending = AtomicBool::new(false);

        let mut conn = self.checkout().await?;

        let result = conn
            .transaction::<(), TxError, _>(|conn| {
                let commit_pending = &commit_pending;
                async move {
                    let item_target: Option<Uuid> = diesel::update(
                        loans::table
                            .find(loan_target)
                            .filter(loans::status.eq(LOAN_STATUS_ACTIVE)),
                    )
                    .set((
                        loans::status.eq(LOAN_STATUS_RETURNED),
                        loans::returned_at.eq(returned_at),
                    ))
                    .returning(loans::item_id)
                    .get_result(conn)
                    .await
                    .optional()?;

                    let Some(item_target) = item_target else {
                        return Err(TxError::Stale);
                    };

                    diesel::update(items::table.find(item_target))
                        .set(items::availability.eq(AVAILABILITY_AVAILABLE))
                        .execute(conn)
                        .await?;

                    commit_pending.store(true, Ordering::SeqCst);
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        result.map_err(|err| {
            map_tx_error(
                err,
                AtomicBool::load(&commit_pending, Ordering::SeqCst),
                "loan is not active",
            )
        })
    }

    async fn find_active_by_item(
        &self,
        item_id: &ItemId,
    ) -> Result<Option<Loan>, LoanStoreError> {
        let target = *item_id.as_uuid();
        self.find_loan_row(move |table| {
            table
                .filter(loans::item_id.eq(target))
                .filter(loans::status.eq(LOAN_STATUS_ACTIVE))
                .into_boxed()
        })
        .await
    }

    async fn find_by_id(&self, loan_id: &LoanId) -> Result<Option<Loan>, LoanStoreError> {
        let target = *loan_id.as_uuid();
        self.find_loan_row(move |table| table.filter(loans::id.eq(target)).into_boxed())
            .await
    }

    async fn list_borrowed_by(
        &self,
        user: &UserId,
    ) -> Result<Vec<LoanWithContext>, LoanStoreError> {
        let mut conn = self.checkout().await?;

        let rows: Vec<(LoanRow, ItemRow)> = loans::table
            .inner_join(items::table)
            .filter(loans::borrower_id.eq(*user.as_uuid()))
            .order(loans::created_at.desc())
            .select((LoanRow::as_select(), ItemRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(&err, LoanStoreError::connection, LoanStoreError::query)
            })?;

        Self::assemble_context(&mut conn, rows).await
    }

    async fn list_lent_by(&self, user: &UserId) -> Result<Vec<LoanWithContext>, LoanStoreError> {
        let mut conn = self.checkout().await?;

        let rows: Vec<(LoanRow, ItemRow)> = loans::table
            .inner_join(items::table)
            .filter(items::owner_id.eq(*user.as_uuid()))
            .order(loans::created_at.desc())
            .select((LoanRow::as_select(), ItemRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(&err, LoanStoreError::connection, LoanStoreError::query)
            })?;

        Self::assemble_context(&mut conn, rows).await
    }
}

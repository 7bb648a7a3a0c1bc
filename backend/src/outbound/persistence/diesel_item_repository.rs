//! Diesel-backed implementation of the item repository port.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ItemRepository, ItemRepositoryError, ItemWithOwner, RemovalOutcome};
use crate::domain::{Item, ItemId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AVAILABILITY_AVAILABLE, ItemRow, NewItemRow, RowConversionError};
use super::pool::DbPool;
use super::schema::{items, users};

/// PostgreSQL item repository.
///
/// Availability flips never happen here; they belong to the loan store's
/// transactions. This adapter inserts, reads, lists, and conditionally
/// deletes.
#[derive(Clone)]
pub struct DieselItemRepository {
    pool: DbPool,
}

impl DieselItemRepository {
    /// Create a repository backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_conversion_error(err: RowConversionError) -> ItemRepositoryError {
    ItemRepositoryError::query(err)
}

#[async_trait]
impl ItemRepository for DieselItemRepository {
    async fn insert(&self, item: &Item) -> Result<(), ItemRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(&err, ItemRepositoryError::connection))?;

        diesel::insert_into(items::table)
            .values(NewItemRow::from_item(item))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(
                    &err,
                    ItemRepositoryError::connection,
                    ItemRepositoryError::query,
                )
            })?;

        Ok(())
    }

    async fn find_by_id(&self, item_id: &ItemId) -> Result<Option<Item>, ItemRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(&err, ItemRepositoryError::connection))?;

        let row = items::table
            .find(item_id.as_uuid())
            .select(ItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                map_diesel_error(
                    &err,
                    ItemRepositoryError::connection,
                    ItemRepositoryError::query,
                )
            })?;

        row.map(ItemRow::into_item)
            .transpose()
            .map_err(map_conversion_error)
    }

    async fn remove_if_available(
        &self,
        item_id: &ItemId,
    ) -> Result<RemovalOutcome, ItemRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(&err, ItemRepositoryError::connection))?;

        let target = *item_id.as_uuid();
        let outcome = conn
            .transaction::<RemovalOutcome, diesel::result::Error, _>(|conn| {
                async move {
                    let deleted = diesel::delete(
                        items::table
                            .find(target)
                            .filter(items::availability.eq(AVAILABILITY_AVAILABLE)),
                    )
                    .execute(conn)
                    .await?;

                    if deleted > 0 {
                        return Ok(RemovalOutcome::Removed);
                    }

                    // Zero rows means either the item is gone or it is
                    // loaned; the follow-up read inside the transaction
                    // tells the two apart.
                    let exists = items::table
                        .find(target)
                        .select(items::id)
                        .first::<uuid::Uuid>(conn)
                        .await
                        .optional()?
                        .is_some();

                    Ok(if exists {
                        RemovalOutcome::ActiveLoan
                    } else {
                        RemovalOutcome::NotFound
                    })
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| {
                map_diesel_error(
                    &err,
                    ItemRepositoryError::connection,
                    ItemRepositoryError::query,
                )
            })?;

        Ok(outcome)
    }

    async fn list(
        &self,
        owner: Option<UserId>,
    ) -> Result<Vec<ItemWithOwner>, ItemRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(&err, ItemRepositoryError::connection))?;

        let mut query = items::table
            .inner_join(users::table)
            .select((ItemRow::as_select(), users::display_name))
            .order(items::created_at.desc())
            .into_boxed();

        if let Some(owner) = owner {
            query = query.filter(items::owner_id.eq(*owner.as_uuid()));
        }

        let rows: Vec<(ItemRow, String)> = query.load(&mut conn).await.map_err(|err| {
            map_diesel_error(
                &err,
                ItemRepositoryError::connection,
                ItemRepositoryError::query,
            )
        })?;

        rows.into_iter()
            .map(|(row, owner_name)| {
                Ok(ItemWithOwner {
                    item: row.into_item().map_err(map_conversion_error)?,
                    owner_name,
                })
            })
            .collect()
    }
}

//! Item registry domain service.
//!
//! Owns item registration, removal, and listing. Availability is read here
//! but only ever mutated by the loan ledger's transitions.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;

use crate::domain::authorization::{Parties, ReturnPolicy, Transition, authorize};
use crate::domain::error::Error;
use crate::domain::item::{Item, ItemMetadata};
use crate::domain::ports::{
    CatalogLookup, ItemRegistry, ItemRepository, ItemRepositoryError, ItemSummary,
    ListItemsRequest, RegisterItemRequest, RemovalOutcome, RemoveItemRequest,
};

fn map_repository_error(error: ItemRepositoryError) -> Error {
    match error {
        ItemRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("item repository unavailable: {message}"))
        }
        ItemRepositoryError::Query { message } => {
            Error::internal(format!("item repository error: {message}"))
        }
    }
}

/// Item registry service implementing the [`ItemRegistry`] driving port.
#[derive(Clone)]
pub struct ItemRegistryService<R> {
    items: Arc<R>,
    catalog: Arc<dyn CatalogLookup>,
    clock: Arc<dyn Clock>,
}

impl<R> ItemRegistryService<R> {
    /// Create a new service over an item repository and catalog lookup.
    pub fn new(items: Arc<R>, catalog: Arc<dyn CatalogLookup>, clock: Arc<dyn Clock>) -> Self {
        Self {
            items,
            catalog,
            clock,
        }
    }
}

impl<R> ItemRegistryService<R>
where
    R: ItemRepository,
{
    /// Fill missing cover art from the catalog; never fails registration.
    async fn prefill_metadata(&self, title: &str, mut metadata: ItemMetadata) -> ItemMetadata {
        if metadata.cover_url.is_some() {
            return metadata;
        }
        match self.catalog.lookup(title).await {
            Ok(Some(entry)) => metadata.cover_url = entry.cover_url,
            Ok(None) => {}
            Err(err) => warn!(error = %err, title, "catalog prefill failed; registering without cover"),
        }
        metadata
    }
}

#[async_trait]
impl<R> ItemRegistry for ItemRegistryService<R>
where
    R: ItemRepository,
{
    async fn register_item(&self, request: RegisterItemRequest) -> Result<Item, Error> {
        let RegisterItemRequest {
            owner,
            title,
            metadata,
        } = request;

        let metadata = self.prefill_metadata(title.as_ref(), metadata).await;
        let item = Item::register(owner, title, metadata, self.clock.utc());
        self.items
            .insert(&item)
            .await
            .map_err(map_repository_error)?;
        Ok(item)
    }

    async fn remove_item(&self, request: RemoveItemRequest) -> Result<(), Error> {
        let item = self
            .items
            .find_by_id(&request.item_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("item {} not found", request.item_id)))?;

        authorize(
            Transition::RemoveItem,
            ReturnPolicy::default(),
            Parties {
                actor: &request.actor,
                owner: item.owner(),
                borrower: None,
            },
        )?;

        match self
            .items
            .remove_if_available(&request.item_id)
            .await
            .map_err(map_repository_error)?
        {
            RemovalOutcome::Removed => Ok(()),
            RemovalOutcome::NotFound => {
                Err(Error::not_found(format!("item {} not found", request.item_id)))
            }
            RemovalOutcome::ActiveLoan => Err(Error::conflict(
                "item is on loan; take it back before removing it",
            )),
        }
    }

    async fn list_items(&self, request: ListItemsRequest) -> Result<Vec<ItemSummary>, Error> {
        let rows = self
            .items
            .list(request.owner)
            .await
            .map_err(map_repository_error)?;
        Ok(rows.into_iter().map(ItemSummary::from).collect())
    }
}

#[cfg(test)]
#[path = "item_registry_service_tests.rs"]
mod tests;

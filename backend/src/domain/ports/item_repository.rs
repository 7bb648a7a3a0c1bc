//! Driven port for item persistence.

use async_trait::async_trait;

use crate::domain::item::{Item, ItemId};
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by item repository adapters.
    pub enum ItemRepositoryError {
        /// Repository connection could not be established.
        Connection => "item repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "item repository query failed: {message}",
    }
}

/// Outcome of a conditional item removal.
///
/// Removal is conditional so a borrow racing a delete cannot strand an
/// active loan pointing at a missing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The item was deleted.
    Removed,
    /// No item with that id exists.
    NotFound,
    /// An active loan references the item; nothing was deleted.
    ActiveLoan,
}

/// An item joined with its owner's display name for list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemWithOwner {
    /// The item record.
    pub item: Item,
    /// Resolved owner display name.
    pub owner_name: String,
}

/// Port for writing and reading item records.
///
/// Availability flips are deliberately absent here: they happen only inside
/// the loan store's atomic transitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist a newly registered item.
    async fn insert(&self, item: &Item) -> Result<(), ItemRepositoryError>;

    /// Find an item by id.
    async fn find_by_id(&self, item_id: &ItemId) -> Result<Option<Item>, ItemRepositoryError>;

    /// Delete an item only while no active loan references it.
    async fn remove_if_available(
        &self,
        item_id: &ItemId,
    ) -> Result<RemovalOutcome, ItemRepositoryError>;

    /// List items joined with owner display names, optionally filtered to
    /// one owner (evaluated store-side, not by the caller). The filter is
    /// taken by value; `UserId` is a `Copy` UUID wrapper.
    async fn list(
        &self,
        owner: Option<UserId>,
    ) -> Result<Vec<ItemWithOwner>, ItemRepositoryError>;
}

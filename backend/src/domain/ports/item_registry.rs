//! Driving port for the item registry use-cases.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::Error;
use crate::domain::item::{Availability, Item, ItemId, ItemMetadata, Title};
use crate::domain::user::UserId;

use super::item_repository::ItemWithOwner;

/// Request payload for registering an item.
#[derive(Debug, Clone)]
pub struct RegisterItemRequest {
    /// The owner registering the item.
    pub owner: UserId,
    /// Validated item title.
    pub title: Title,
    /// Descriptive metadata; cover art may be prefilled by the catalog.
    pub metadata: ItemMetadata,
}

/// Request payload for removing an item.
#[derive(Debug, Clone)]
pub struct RemoveItemRequest {
    /// The authenticated user attempting the removal.
    pub actor: UserId,
    /// The item to remove.
    pub item_id: ItemId,
}

/// Request payload for listing items.
#[derive(Debug, Clone, Default)]
pub struct ListItemsRequest {
    /// Restrict the listing to one owner, evaluated store-side.
    pub owner: Option<UserId>,
}

/// One item row as presented to callers, owner name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSummary {
    /// Stable item identifier.
    pub id: ItemId,
    /// Owning user.
    pub owner: UserId,
    /// Resolved owner display name.
    pub owner_name: String,
    /// Item title.
    pub title: String,
    /// Platform the cartridge runs on.
    pub platform: String,
    /// Cover image URL, when known.
    pub cover_url: Option<String>,
    /// Current availability state.
    pub availability: Availability,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<ItemWithOwner> for ItemSummary {
    fn from(value: ItemWithOwner) -> Self {
        let ItemWithOwner { item, owner_name } = value;
        Self {
            id: *item.id(),
            owner: *item.owner(),
            owner_name,
            platform: item.metadata().platform_or_default().to_owned(),
            cover_url: item.metadata().cover_url.clone(),
            title: item.title().to_string(),
            availability: item.availability(),
            created_at: item.created_at(),
        }
    }
}

/// Use-cases owned by the item registry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRegistry: Send + Sync {
    /// Register an item; it starts available.
    async fn register_item(&self, request: RegisterItemRequest) -> Result<Item, Error>;

    /// Remove an item. Fails with `not_found`, `forbidden` (actor is not
    /// the owner), or `conflict` (an active loan exists).
    async fn remove_item(&self, request: RemoveItemRequest) -> Result<(), Error>;

    /// List items with resolved owner names; read-only.
    async fn list_items(&self, request: ListItemsRequest) -> Result<Vec<ItemSummary>, Error>;
}

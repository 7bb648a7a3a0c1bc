//! Tests for the item registry service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::*;
use crate::domain::error::ErrorCode;
use crate::domain::item::{Availability, DEFAULT_PLATFORM, ItemId, Title};
use crate::domain::ports::{
    CatalogEntry, CatalogLookupError, ItemWithOwner, MockCatalogLookup, MockItemRepository,
};
use crate::domain::user::UserId;

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        fixture_timestamp()
    }
}

fn title(raw: &str) -> Title {
    Title::new(raw).expect("valid title")
}

fn service(
    items: MockItemRepository,
    catalog: MockCatalogLookup,
) -> ItemRegistryService<MockItemRepository> {
    ItemRegistryService::new(Arc::new(items), Arc::new(catalog), Arc::new(FixtureClock))
}

#[tokio::test]
async fn register_prefills_cover_from_catalog() {
    let mut catalog = MockCatalogLookup::new();
    catalog.expect_lookup().times(1).return_once(|_| {
        Ok(Some(CatalogEntry {
            title: "Hollow Knight".to_owned(),
            cover_url: Some("https://covers.test/hollow-knight.jpg".to_owned()),
        }))
    });

    let mut items = MockItemRepository::new();
    items.expect_insert().times(1).return_once(|_| Ok(()));

    let item = service(items, catalog)
        .register_item(RegisterItemRequest {
            owner: UserId::random(),
            title: title("Hollow Knight"),
            metadata: ItemMetadata::default(),
        })
        .await
        .expect("registration succeeds");

    assert!(item.is_available());
    assert_eq!(item.created_at(), fixture_timestamp());
    assert_eq!(
        item.metadata().cover_url.as_deref(),
        Some("https://covers.test/hollow-knight.jpg")
    );
}

#[tokio::test]
async fn register_keeps_caller_supplied_cover_without_lookup() {
    let mut catalog = MockCatalogLookup::new();
    catalog.expect_lookup().times(0);

    let mut items = MockItemRepository::new();
    items.expect_insert().times(1).return_once(|_| Ok(()));

    let item = service(items, catalog)
        .register_item(RegisterItemRequest {
            owner: UserId::random(),
            title: title("Celeste"),
            metadata: ItemMetadata {
                platform: None,
                cover_url: Some("https://covers.test/celeste.jpg".to_owned()),
            },
        })
        .await
        .expect("registration succeeds");

    assert_eq!(
        item.metadata().cover_url.as_deref(),
        Some("https://covers.test/celeste.jpg")
    );
}

#[tokio::test]
async fn register_survives_catalog_failure() {
    let mut catalog = MockCatalogLookup::new();
    catalog
        .expect_lookup()
        .times(1)
        .return_once(|_| Err(CatalogLookupError::transport("connection refused")));

    let mut items = MockItemRepository::new();
    items.expect_insert().times(1).return_once(|_| Ok(()));

    let item = service(items, catalog)
        .register_item(RegisterItemRequest {
            owner: UserId::random(),
            title: title("Stardew Valley"),
            metadata: ItemMetadata::default(),
        })
        .await
        .expect("registration must not depend on the catalog");

    assert!(item.metadata().cover_url.is_none());
}

#[tokio::test]
async fn remove_rejects_non_owner() {
    let owner = UserId::random();
    let item = Item::register(owner, title("Metroid Dread"), ItemMetadata::default(), fixture_timestamp());
    let item_id = *item.id();

    let mut items = MockItemRepository::new();
    items
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(item)));
    items.expect_remove_if_available().times(0);

    let error = service(items, MockCatalogLookup::new())
        .remove_item(RemoveItemRequest {
            actor: UserId::random(),
            item_id,
        })
        .await
        .expect_err("non-owner removal must fail");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn remove_returns_not_found_for_unknown_item() {
    let mut items = MockItemRepository::new();
    items.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let error = service(items, MockCatalogLookup::new())
        .remove_item(RemoveItemRequest {
            actor: UserId::random(),
            item_id: ItemId::random(),
        })
        .await
        .expect_err("unknown item must fail");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn remove_conflicts_while_item_is_on_loan() {
    let owner = UserId::random();
    let item = Item::register(owner, title("Pikmin 4"), ItemMetadata::default(), fixture_timestamp());
    let item_id = *item.id();

    let mut items = MockItemRepository::new();
    items
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(item)));
    items
        .expect_remove_if_available()
        .times(1)
        .return_once(|_| Ok(RemovalOutcome::ActiveLoan));

    let error = service(items, MockCatalogLookup::new())
        .remove_item(RemoveItemRequest {
            actor: owner,
            item_id,
        })
        .await
        .expect_err("loaned item must not be removable");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn list_maps_rows_to_summaries() {
    let owner = UserId::random();
    let item = Item::register(owner, title("Hades"), ItemMetadata::default(), fixture_timestamp());
    let item_id = *item.id();

    let mut items = MockItemRepository::new();
    items.expect_list().times(1).return_once(move |_| {
        Ok(vec![ItemWithOwner {
            item,
            owner_name: "Robin".to_owned(),
        }])
    });

    let summaries = service(items, MockCatalogLookup::new())
        .list_items(ListItemsRequest { owner: None })
        .await
        .expect("listing succeeds");

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, item_id);
    assert_eq!(summaries[0].owner_name, "Robin");
    assert_eq!(summaries[0].availability, Availability::Available);
    assert_eq!(summaries[0].platform, DEFAULT_PLATFORM);
}

#[tokio::test]
async fn list_maps_connection_failure_to_service_unavailable() {
    let mut items = MockItemRepository::new();
    items
        .expect_list()
        .times(1)
        .return_once(|_| Err(ItemRepositoryError::connection("pool exhausted")));

    let error = service(items, MockCatalogLookup::new())
        .list_items(ListItemsRequest { owner: None })
        .await
        .expect_err("connection failure surfaces");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

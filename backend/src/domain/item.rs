//! Lendable item entities.
//!
//! An item has exactly one owner and one availability state. Availability is
//! fully determined by the existence of an active loan referencing the item;
//! it is flipped only inside the loan ledger's atomic transitions, never
//! independently.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;

/// Validation errors returned by the item constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemValidationError {
    /// Title was empty once trimmed.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeded the storage limit.
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

/// Stable item identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`ItemId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum allowed length for an item title.
pub const TITLE_MAX: usize = 120;

/// Validated item title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Title(String);

impl Title {
    /// Validate and construct a [`Title`].
    pub fn new(title: impl Into<String>) -> Result<Self, ItemValidationError> {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ItemValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(ItemValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Title> for String {
    fn from(value: Title) -> Self {
        value.0
    }
}

impl TryFrom<String> for Title {
    type Error = ItemValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Availability state of an item.
///
/// `Loaned` holds exactly while one active loan references the item; there is
/// no terminal state, items cycle between the two indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// No active loan; the item may be borrowed or lent.
    Available,
    /// Exactly one active loan references the item.
    Loaned,
}

/// Descriptive metadata attached to an item at registration time.
///
/// The catalog lookup collaborator may prefill `cover_url`; its absence or
/// failure never blocks registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    /// Platform the cartridge runs on.
    pub platform: Option<String>,
    /// Cover image URL.
    pub cover_url: Option<String>,
}

/// Default platform applied when registration omits one.
pub const DEFAULT_PLATFORM: &str = "Nintendo Switch";

impl ItemMetadata {
    /// Return the platform, falling back to [`DEFAULT_PLATFORM`].
    pub fn platform_or_default(&self) -> &str {
        self.platform.as_deref().unwrap_or(DEFAULT_PLATFORM)
    }
}

/// A lendable unit with one owner and one availability state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    id: ItemId,
    owner: UserId,
    title: Title,
    metadata: ItemMetadata,
    availability: Availability,
    created_at: DateTime<Utc>,
}

impl Item {
    /// Register a new item for `owner`; items start available.
    pub fn register(
        owner: UserId,
        title: Title,
        metadata: ItemMetadata,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ItemId::random(),
            owner,
            title,
            metadata,
            availability: Availability::Available,
            created_at,
        }
    }

    /// Reconstruct an item from stored fields.
    pub const fn from_parts(
        id: ItemId,
        owner: UserId,
        title: Title,
        metadata: ItemMetadata,
        availability: Availability,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            title,
            metadata,
            availability,
            created_at,
        }
    }

    /// Stable item identifier.
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    /// The owning user.
    pub const fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Item title.
    pub const fn title(&self) -> &Title {
        &self.title
    }

    /// Descriptive metadata.
    pub const fn metadata(&self) -> &ItemMetadata {
        &self.metadata
    }

    /// Current availability state.
    pub const fn availability(&self) -> Availability {
        self.availability
    }

    /// Registration timestamp.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the item can enter a new loan.
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn title_rejects_blank(#[case] raw: &str) {
        let err = Title::new(raw).expect_err("blank titles must fail");
        assert_eq!(err, ItemValidationError::EmptyTitle);
    }

    #[test]
    fn title_rejects_over_long_input() {
        let err = Title::new("x".repeat(TITLE_MAX + 1)).expect_err("over-long titles must fail");
        assert!(matches!(err, ItemValidationError::TitleTooLong { .. }));
    }

    #[test]
    fn registered_items_start_available() {
        let item = Item::register(
            UserId::random(),
            Title::new("Tears of the Kingdom").expect("valid title"),
            ItemMetadata::default(),
            Utc::now(),
        );
        assert!(item.is_available());
        assert_eq!(item.metadata().platform_or_default(), DEFAULT_PLATFORM);
    }

    #[test]
    fn availability_serialises_snake_case() {
        let raw = serde_json::to_value(Availability::Loaned).expect("serialise availability");
        assert_eq!(raw, serde_json::json!("loaned"));
    }
}

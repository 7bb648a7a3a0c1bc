//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer, never exposed to the
//! domain. Availability and loan status are stored as text columns; the
//! conversion helpers reject unknown values instead of guessing.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Availability, Item, ItemId, ItemMetadata, Loan, LoanId, LoanStatus, Title, User, UserId,
};

use super::schema::{items, loans, users};

pub(crate) const AVAILABILITY_AVAILABLE: &str = "available";
pub(crate) const AVAILABILITY_LOANED: &str = "loaned";
pub(crate) const LOAN_STATUS_ACTIVE: &str = "active";
pub(crate) const LOAN_STATUS_RETURNED: &str = "returned";

/// Conversion failure from a stored row to a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stored value for {column}: {value}")]
pub(crate) struct RowConversionError {
    pub column: &'static str,
    pub value: String,
}

impl RowConversionError {
    fn new(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

pub(crate) fn availability_to_str(availability: Availability) -> &'static str {
    match availability {
        Availability::Available => AVAILABILITY_AVAILABLE,
        Availability::Loaned => AVAILABILITY_LOANED,
    }
}

pub(crate) fn availability_from_str(raw: &str) -> Result<Availability, RowConversionError> {
    match raw {
        AVAILABILITY_AVAILABLE => Ok(Availability::Available),
        AVAILABILITY_LOANED => Ok(Availability::Loaned),
        other => Err(RowConversionError::new("availability", other)),
    }
}

pub(crate) fn loan_status_to_str(status: LoanStatus) -> &'static str {
    match status {
        LoanStatus::Active => LOAN_STATUS_ACTIVE,
        LoanStatus::Returned => LOAN_STATUS_RETURNED,
    }
}

pub(crate) fn loan_status_from_str(raw: &str) -> Result<LoanStatus, RowConversionError> {
    match raw {
        LOAN_STATUS_ACTIVE => Ok(LoanStatus::Active),
        LOAN_STATUS_RETURNED => Ok(LoanStatus::Returned),
        other => Err(RowConversionError::new("status", other)),
    }
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    #[expect(dead_code, reason = "selected with the row; lookups filter on the column instead")]
    pub username: String,
    pub display_name: String,
    pub password_digest: String,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, RowConversionError> {
        let display_name = self
            .display_name
            .clone()
            .try_into()
            .map_err(|_| RowConversionError::new("display_name", self.display_name))?;
        Ok(User::new(UserId::from_uuid(self.id), display_name))
    }
}

/// Row struct for reading from the items table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub platform: Option<String>,
    pub cover_url: Option<String>,
    pub availability: String,
    pub created_at: DateTime<Utc>,
}

impl ItemRow {
    pub(crate) fn into_item(self) -> Result<Item, RowConversionError> {
        let availability = availability_from_str(&self.availability)?;
        let title = Title::new(self.title.clone())
            .map_err(|_| RowConversionError::new("title", self.title))?;
        Ok(Item::from_parts(
            ItemId::from_uuid(self.id),
            UserId::from_uuid(self.owner_id),
            title,
            ItemMetadata {
                platform: self.platform,
                cover_url: self.cover_url,
            },
            availability,
            self.created_at,
        ))
    }
}

/// Insertable struct for creating new item records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = items)]
pub(crate) struct NewItemRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: &'a str,
    pub platform: Option<&'a str>,
    pub cover_url: Option<&'a str>,
    pub availability: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewItemRow<'a> {
    pub(crate) fn from_item(item: &'a Item) -> Self {
        Self {
            id: *item.id().as_uuid(),
            owner_id: *item.owner().as_uuid(),
            title: item.title().as_ref(),
            platform: item.metadata().platform.as_deref(),
            cover_url: item.metadata().cover_url.as_deref(),
            availability: availability_to_str(item.availability()),
            created_at: item.created_at(),
        }
    }
}

/// Row struct for reading from the loans table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = loans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoanRow {
    pub id: Uuid,
    pub item_id: Uuid,
    pub borrower_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl LoanRow {
    pub(crate) fn into_loan(self) -> Result<Loan, RowConversionError> {
        let status = loan_status_from_str(&self.status)?;
        Ok(Loan::from_parts(
            LoanId::from_uuid(self.id),
            ItemId::from_uuid(self.item_id),
            UserId::from_uuid(self.borrower_id),
            status,
            self.created_at,
            self.due_at,
            self.returned_at,
        ))
    }
}

/// Insertable struct for creating new loan records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = loans)]
pub(crate) struct NewLoanRow<'a> {
    pub id: Uuid,
    pub item_id: Uuid,
    pub borrower_id: Uuid,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
}

impl NewLoanRow<'_> {
    pub(crate) fn from_loan(loan: &Loan) -> Self {
        Self {
            id: *loan.id().as_uuid(),
            item_id: *loan.item_id().as_uuid(),
            borrower_id: *loan.borrower().as_uuid(),
            status: loan_status_to_str(loan.status()),
            created_at: loan.created_at(),
            due_at: loan.due_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(AVAILABILITY_AVAILABLE, Availability::Available)]
    #[case(AVAILABILITY_LOANED, Availability::Loaned)]
    fn availability_round_trips(#[case] raw: &str, #[case] expected: Availability) {
        assert_eq!(availability_from_str(raw).expect("known value"), expected);
        assert_eq!(availability_to_str(expected), raw);
    }

    #[test]
    fn unknown_availability_is_rejected() {
        let err = availability_from_str("lost").expect_err("unknown value must fail");
        assert_eq!(err.column, "availability");
    }

    #[test]
    fn unknown_loan_status_is_rejected() {
        let err = loan_status_from_str("pending").expect_err("unknown value must fail");
        assert_eq!(err.column, "status");
    }
}

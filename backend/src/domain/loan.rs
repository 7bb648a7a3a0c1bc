//! Loan entities and the per-loan lifecycle.
//!
//! A loan records one borrow/lend transaction. It transitions exactly once
//! from `Active` to `Returned`; the returned state is terminal and immutable.
//! At most one active loan may reference an item at any time; that invariant
//! is enforced by the loan store's atomic transitions and backstopped by a
//! partial unique index in the schema.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::item::ItemId;
use crate::domain::user::UserId;

/// Validation errors returned by the loan constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoanValidationError {
    /// Duration fell outside the lending policy range.
    #[error("loan duration must be between {min} and {max} days")]
    DurationOutOfRange {
        /// Minimum accepted number of days.
        min: i64,
        /// Maximum accepted number of days.
        max: i64,
    },
    /// A loan cannot be returned twice.
    #[error("loan is already returned")]
    AlreadyReturned,
}

/// Stable loan identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(Uuid);

impl LoanId {
    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`LoanId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// The borrower currently holds the item.
    Active,
    /// The item came back; terminal.
    Returned,
}

/// Shortest direct-lend duration accepted by policy.
pub const DURATION_MIN_DAYS: i64 = 1;
/// Longest direct-lend duration accepted by policy.
pub const DURATION_MAX_DAYS: i64 = 365;

/// Validated direct-lend duration in whole days (policy range 1–365).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanDuration(i64);

impl LoanDuration {
    /// Validate and construct a [`LoanDuration`].
    pub fn from_days(days: i64) -> Result<Self, LoanValidationError> {
        if !(DURATION_MIN_DAYS..=DURATION_MAX_DAYS).contains(&days) {
            return Err(LoanValidationError::DurationOutOfRange {
                min: DURATION_MIN_DAYS,
                max: DURATION_MAX_DAYS,
            });
        }
        Ok(Self(days))
    }

    /// Number of days in the duration.
    pub const fn days(&self) -> i64 {
        self.0
    }

    /// Compute the due timestamp for a loan created at `now`.
    pub fn due_at_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(self.0)
    }
}

/// A record of one borrow/lend transaction and its lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    id: LoanId,
    item_id: ItemId,
    borrower: UserId,
    status: LoanStatus,
    created_at: DateTime<Utc>,
    /// Absent for open-ended borrow requests; such loans are never overdue.
    due_at: Option<DateTime<Utc>>,
    returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    /// Open an open-ended loan created by a borrow request.
    pub fn open_request(item_id: ItemId, borrower: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: LoanId::random(),
            item_id,
            borrower,
            status: LoanStatus::Active,
            created_at: now,
            due_at: None,
            returned_at: None,
        }
    }

    /// Open a loan created by a direct lend with a due date.
    pub fn open_lend(
        item_id: ItemId,
        borrower: UserId,
        duration: LoanDuration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LoanId::random(),
            item_id,
            borrower,
            status: LoanStatus::Active,
            created_at: now,
            due_at: Some(duration.due_at_from(now)),
            returned_at: None,
        }
    }

    /// Reconstruct a loan from stored fields.
    pub const fn from_parts(
        id: LoanId,
        item_id: ItemId,
        borrower: UserId,
        status: LoanStatus,
        created_at: DateTime<Utc>,
        due_at: Option<DateTime<Utc>>,
        returned_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            item_id,
            borrower,
            status,
            created_at,
            due_at,
            returned_at,
        }
    }

    /// Transition the loan to `Returned`, stamping the return time.
    ///
    /// The transition happens exactly once; a second call fails with
    /// [`LoanValidationError::AlreadyReturned`].
    pub fn mark_returned(&mut self, returned_at: DateTime<Utc>) -> Result<(), LoanValidationError> {
        if self.status == LoanStatus::Returned {
            return Err(LoanValidationError::AlreadyReturned);
        }
        self.status = LoanStatus::Returned;
        self.returned_at = Some(returned_at);
        Ok(())
    }

    /// Stable loan identifier.
    pub const fn id(&self) -> &LoanId {
        &self.id
    }

    /// The item on loan.
    pub const fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    /// The borrowing user.
    pub const fn borrower(&self) -> &UserId {
        &self.borrower
    }

    /// Lifecycle status.
    pub const fn status(&self) -> LoanStatus {
        self.status
    }

    /// Creation timestamp.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Optional due timestamp; absent for open-ended loans.
    pub const fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Return timestamp, present once the loan is returned.
    pub const fn returned_at(&self) -> Option<DateTime<Utc>> {
        self.returned_at
    }

    /// Whether the borrower still holds the item.
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0)]
    #[case(-3)]
    #[case(366)]
    fn duration_rejects_out_of_range_days(#[case] days: i64) {
        let err = LoanDuration::from_days(days).expect_err("out-of-range days must fail");
        assert!(matches!(err, LoanValidationError::DurationOutOfRange { .. }));
    }

    #[test]
    fn seven_days_from_jan_first_is_jan_eighth() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).single().expect("valid timestamp");
        let due = LoanDuration::from_days(7).expect("valid duration").due_at_from(now);
        let expected = Utc.with_ymd_and_hms(2024, 1, 8, 10, 0, 0).single().expect("valid timestamp");
        assert_eq!(due, expected);
    }

    #[test]
    fn borrow_requests_are_open_ended() {
        let loan = Loan::open_request(ItemId::random(), UserId::random(), Utc::now());
        assert!(loan.is_active());
        assert!(loan.due_at().is_none());
        assert!(loan.returned_at().is_none());
    }

    #[test]
    fn return_transition_happens_exactly_once() {
        let mut loan = Loan::open_request(ItemId::random(), UserId::random(), Utc::now());
        let returned_at = Utc::now();

        loan.mark_returned(returned_at).expect("first return succeeds");
        assert_eq!(loan.status(), LoanStatus::Returned);
        assert_eq!(loan.returned_at(), Some(returned_at));

        let err = loan
            .mark_returned(Utc::now())
            .expect_err("second return must fail");
        assert_eq!(err, LoanValidationError::AlreadyReturned);
    }
}

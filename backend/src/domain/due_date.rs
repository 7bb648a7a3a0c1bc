//! Due-date arithmetic for user-facing warnings.
//!
//! The calculator is pure: it depends only on the loan's due timestamp and a
//! caller-supplied `now`. Overdue state is computed lazily on read paths and
//! never pre-materialised.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

const SECONDS_PER_DAY: i64 = 86_400;

/// Days remaining before 1..=3 classifies as due-soon.
pub const DUE_SOON_THRESHOLD_DAYS: i64 = 3;

/// Whole days remaining until `due_at`, as the ceiling of the span from
/// `now`.
///
/// Returns `None` when the loan is open-ended. The value is `0` exactly when
/// the due instant is `now` or less than a day in the past, matching the
/// "0 days left means warn" policy: a loan is overdue exactly when the
/// result is `<= 0`, never only when it is strictly negative.
pub fn days_remaining(due_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    due_at.map(|due| {
        let span_seconds = (due - now).num_seconds();
        // Ceiling division that also holds for negative spans.
        (span_seconds + SECONDS_PER_DAY - 1).div_euclid(SECONDS_PER_DAY)
    })
}

/// Read-side classification of a loan's temporal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    /// No due date; never flagged overdue.
    OpenEnded,
    /// More than [`DUE_SOON_THRESHOLD_DAYS`] days remain.
    OnTime,
    /// Between one and [`DUE_SOON_THRESHOLD_DAYS`] days remain.
    DueSoon,
    /// Zero or fewer days remain; due-today counts as overdue.
    Overdue,
}

/// Classify a loan's due date relative to `now`.
///
/// Every surface that displays remaining time uses this single function so
/// list views and warning banners can never disagree.
pub fn classify(due_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DueStatus {
    match days_remaining(due_at, now) {
        None => DueStatus::OpenEnded,
        Some(days) if days <= 0 => DueStatus::Overdue,
        Some(days) if days <= DUE_SOON_THRESHOLD_DAYS => DueStatus::DueSoon,
        Some(_) => DueStatus::OnTime,
    }
}

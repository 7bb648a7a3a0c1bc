//! Shared Diesel and pool error mapping for persistence adapters.
//!
//! Each adapter's port error defines its own variants; these helpers map the
//! underlying failures through ctor closures so the translation stays in one
//! place.

use tracing::debug;

use super::pool::PoolError;

/// Map a pool error into a port error using the given connection-error ctor.
///
/// Checkout and build failures both read as connection problems to callers;
/// the distinction only matters for logs.
pub(crate) fn map_pool_error<E>(err: &PoolError, connection: impl Fn(String) -> E) -> E {
    debug!(error = %err, "database pool error");
    connection(err.to_string())
}

/// Map a Diesel error into a port error using the given ctors.
///
/// `diesel::result::Error::NotFound` maps through `query` rather than a
/// dedicated variant; adapters that care about absence use `.optional()`
/// before this helper sees the error.
pub(crate) fn map_diesel_error<E>(
    err: &diesel::result::Error,
    connection: impl Fn(String) -> E,
    query: impl Fn(String) -> E,
) -> E {
    debug!(error = %err, "diesel query error");
    match err {
        diesel::result::Error::NotFound => query("record not found".to_owned()),
        other if is_connection_loss(other) => connection(other.to_string()),
        other => query(other.to_string()),
    }
}

/// Whether a Diesel error indicates the connection itself failed, leaving
/// the outcome of an already-issued statement unknown.
pub(crate) fn is_connection_loss(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::ClosedConnection,
            _,
        ) | diesel::result::Error::BrokenTransactionManager
    )
}

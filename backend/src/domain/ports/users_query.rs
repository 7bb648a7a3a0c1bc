//! Driving port for user listings and resolution.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::user::{User, UserId};

/// Read access to the user directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Every user except the caller, for lend-target selection.
    async fn list_other_users(&self, current: &UserId) -> Result<Vec<User>, Error>;

    /// Resolve a user id to its record.
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, Error>;
}

/// Fixture returning an empty directory, for tests without persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUsersQuery;

#[async_trait]
impl UsersQuery for FixtureUsersQuery {
    async fn list_other_users(&self, _current: &UserId) -> Result<Vec<User>, Error> {
        Ok(Vec::new())
    }

    async fn find_user(&self, _id: &UserId) -> Result<Option<User>, Error> {
        Ok(None)
    }
}

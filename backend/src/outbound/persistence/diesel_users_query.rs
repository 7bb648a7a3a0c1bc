//! Diesel-backed implementation of the users query port.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::UsersQuery;
use crate::domain::{Error, User, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::UserRow;
use super::pool::DbPool;
use super::schema::users;

/// PostgreSQL user directory.
#[derive(Clone)]
pub struct DieselUsersQuery {
    pool: DbPool,
}

impl DieselUsersQuery {
    /// Create a users query backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn connection_error(message: String) -> Error {
    Error::service_unavailable(message)
}

fn query_error(message: String) -> Error {
    Error::internal(message)
}

#[async_trait]
impl UsersQuery for DieselUsersQuery {
    async fn list_other_users(&self, current: &UserId) -> Result<Vec<User>, Error> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(&err, connection_error))?;

        let rows: Vec<UserRow> = users::table
            .filter(users::id.ne(*current.as_uuid()))
            .order(users::display_name.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, connection_error, query_error))?;

        rows.into_iter()
            .map(|row| row.into_user().map_err(|err| Error::internal(err.to_string())))
            .collect()
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, Error> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(&err, connection_error))?;

        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, connection_error, query_error))?;

        row.map(|row| row.into_user().map_err(|err| Error::internal(err.to_string())))
            .transpose()
    }
}

//! Diesel-backed implementation of the login port.
//!
//! Passwords are verified against a hex-encoded SHA-256 digest stored in the
//! users table. This is a development-grade stand-in for a real credential
//! scheme; swap the digest function before exposing the service publicly.
//! Unknown usernames and digest mismatches produce the same error so the
//! login endpoint cannot be used to enumerate accounts.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::ports::LoginService;
use crate::domain::{Error, LoginCredentials, User};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::UserRow;
use super::pool::DbPool;
use super::schema::users;

/// PostgreSQL credential verifier.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    /// Create a login service backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Hex-encoded SHA-256 digest of a password, the storage format of the
/// `password_digest` column.
pub(crate) fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

fn connection_error(message: String) -> Error {
    Error::service_unavailable(message)
}

fn query_error(message: String) -> Error {
    Error::internal(message)
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(&err, connection_error))?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(credentials.username()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, connection_error, query_error))?;

        let Some(row) = row else {
            debug!(username = credentials.username(), "login for unknown user");
            return Err(invalid_credentials());
        };

        if password_digest(credentials.password()) != row.password_digest {
            debug!(username = credentials.username(), "login digest mismatch");
            return Err(invalid_credentials());
        }

        row.into_user()
            .map_err(|err| Error::internal(err.to_string()))
    }
}

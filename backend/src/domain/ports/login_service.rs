//! Driving port for the authentication collaborator.
//!
//! Credential storage and issuance live outside the core; the core only
//! needs a verified user identity back from whatever collaborator fronts
//! this port.

use async_trait::async_trait;

use crate::domain::auth::LoginCredentials;
use crate::domain::error::Error;
use crate::domain::user::User;

/// Verify credentials and return the authenticated user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Authenticate, failing with `unauthorized` on a credential mismatch.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Fixture that rejects every credential pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, _credentials: &LoginCredentials) -> Result<User, Error> {
        Err(Error::unauthorized("invalid credentials"))
    }
}

//! Authenticated-user binding between the session cookie and the domain.
//!
//! The lending handlers never touch the cookie machinery: they either
//! stamp a [`UserId`] into the session at login or demand one back before
//! acting. Anything unreadable in the cookie (including a tampered id)
//! counts as not logged in.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// The session as the lending handlers see it: a slot for one user id.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Stamp the authenticated user's id into the session cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The authenticated user id, or `401 Unauthorized` when the session
    /// carries none (or carries something that does not parse as one).
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        match self.0.get::<UserId>(USER_ID_KEY) {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(Error::unauthorized("login required")),
            Err(error) => {
                tracing::warn!("unreadable user id in session cookie: {error}");
                Err(Error::unauthorized("login required"))
            }
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

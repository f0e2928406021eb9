mod firebase;
mod inmemory;

use chrono::{DateTime, Utc};
pub use firebase::FirebaseIdentityProvider;
pub use inmemory::InMemoryIdentityProvider;
use medication_reminder_domain::OwnerId;
use thiserror::Error;
use tokio::sync::watch;

/// The authenticated user of this application instance
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub owner_id: OwnerId,
    pub email: String,
    pub(crate) id_token: String,
    pub(crate) refresh_token: Option<String>,
    pub(crate) expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub(crate) fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid credentials. Error message: `{0}`")]
    InvalidCredentials(String),
    #[error("The email: {0} is already registered")]
    EmailTaken(String),
    #[error("No user is signed in")]
    Unauthenticated,
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

/// Third party service that authenticates users.
///
/// Mutating operations broadcast the new `Session` (or `None` when signed out)
/// to everyone who subscribed.
#[async_trait::async_trait]
pub trait IIdentityProvider: Send + Sync {
    fn current_session(&self) -> Option<Session>;
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
    /// A valid bearer token for the current `Session`, refreshed if needed
    async fn id_token(&self) -> Result<String, IdentityError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError>;
    async fn sign_out(&self);
    /// Deletes the account of the current `Session` and signs out
    async fn delete_account(&self) -> Result<(), IdentityError>;

    fn current_owner(&self) -> Option<OwnerId> {
        self.current_session().map(|session| session.owner_id)
    }
}

/// Holds the current `Session` and notifies subscribers about changes
pub(crate) struct AuthState {
    sender: watch::Sender<Option<Session>>,
}

impl AuthState {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn current(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    pub fn set(&self, session: Option<Session>) {
        self.sender.send_replace(session);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }
}

use super::{AuthState, IIdentityProvider, IdentityError, Session};
use medication_reminder_domain::OwnerId;
use medication_reminder_utils::create_random_id;
use std::{collections::HashMap, sync::Mutex};
use tokio::sync::watch;

struct Account {
    password: String,
    owner_id: OwnerId,
}

/// Identity provider keeping its accounts in memory. Used for tests and
/// when no identity service has been configured.
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    state: AuthState,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            state: AuthState::new(),
        }
    }

    fn start_session(&self, email: &str, owner_id: OwnerId) -> Session {
        let session = Session {
            owner_id,
            email: email.to_string(),
            id_token: create_random_id(32),
            refresh_token: None,
            expires_at: None,
        };
        self.state.set(Some(session.clone()));
        session
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IIdentityProvider for InMemoryIdentityProvider {
    fn current_session(&self) -> Option<Session> {
        self.state.current()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    async fn id_token(&self) -> Result<String, IdentityError> {
        self.state
            .current()
            .map(|session| session.id_token)
            .ok_or(IdentityError::Unauthenticated)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let owner_id = {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                return Err(IdentityError::EmailTaken(email.to_string()));
            }
            let owner_id = OwnerId::new(create_random_id(28));
            accounts.insert(
                email.to_string(),
                Account {
                    password: password.to_string(),
                    owner_id: owner_id.clone(),
                },
            );
            owner_id
        };
        Ok(self.start_session(email, owner_id))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let owner_id = {
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(email) {
                Some(account) if account.password == password => account.owner_id.clone(),
                _ => {
                    return Err(IdentityError::InvalidCredentials(
                        "Wrong email or password".into(),
                    ))
                }
            }
        };
        Ok(self.start_session(email, owner_id))
    }

    async fn sign_out(&self) {
        self.state.set(None);
    }

    async fn delete_account(&self) -> Result<(), IdentityError> {
        let session = self.state.current().ok_or(IdentityError::Unauthenticated)?;
        self.accounts.lock().unwrap().remove(&session.email);
        self.state.set(None);
        Ok(())
    }
}

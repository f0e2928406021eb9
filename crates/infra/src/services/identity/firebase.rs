use super::{AuthState, IIdentityProvider, IdentityError, Session};
use crate::system::ISys;
use chrono::Duration;
use medication_reminder_domain::OwnerId;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

// https://firebase.google.com/docs/reference/rest/auth

const IDENTITY_TOOLKIT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1/token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    id_token: String,
    email: String,
    refresh_token: String,
    expires_in: String,
    local_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAccountRequest<'a> {
    id_token: &'a str,
}

// The secure token api actually returns snake case response
#[derive(Debug, Deserialize)]
struct RefreshTokenResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity provider backed by Firebase Authentication (email + password)
pub struct FirebaseIdentityProvider {
    client: Client,
    api_key: String,
    state: AuthState,
    sys: Arc<dyn ISys>,
}

impl FirebaseIdentityProvider {
    pub fn new(api_key: String, sys: Arc<dyn ISys>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            state: AuthState::new(),
            sys,
        }
    }

    fn expires_at(&self, expires_in: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        // Refresh a minute early so that tokens do not expire mid request
        expires_in
            .parse::<i64>()
            .ok()
            .map(|secs| self.sys.now() + Duration::seconds(secs - 60))
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &impl Serialize,
    ) -> Result<T, IdentityError> {
        let res = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(
                    "[Network Error] Firebase Auth API POST error. Error message: {:?}",
                    e
                );
                anyhow::Error::new(e)
            })?;

        if res.status().is_success() {
            return res.json::<T>().await.map_err(|e| {
                error!(
                    "[Unexpected Response] Firebase Auth API POST error. Error message: {:?}",
                    e
                );
                IdentityError::Provider(anyhow::Error::new(e))
            });
        }

        let status = res.status();
        let message = res
            .json::<ErrorResponse>()
            .await
            .map(|e| e.error.message)
            .unwrap_or_else(|_| status.to_string());
        Err(error_from_message(message))
    }

    async fn password_flow(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let res: PasswordResponse = self
            .post(
                &format!("{}/{}", IDENTITY_TOOLKIT_BASE_URL, endpoint),
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        let session = Session {
            owner_id: OwnerId::new(res.local_id),
            email: res.email,
            expires_at: self.expires_at(&res.expires_in),
            id_token: res.id_token,
            refresh_token: Some(res.refresh_token),
        };
        info!("User {} signed in", session.owner_id);
        self.state.set(Some(session.clone()));
        Ok(session)
    }

    async fn refresh(&self, session: Session) -> Result<Session, IdentityError> {
        let refresh_token = session
            .refresh_token
            .clone()
            .ok_or(IdentityError::Unauthenticated)?;
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        let res = self
            .client
            .post(SECURE_TOKEN_ENDPOINT)
            .query(&[("key", self.api_key.as_str())])
            .form(&params)
            .send()
            .await
            .map_err(anyhow::Error::new)?;

        if !res.status().is_success() {
            // The refresh token is revoked or the user is deleted
            error!(
                "Unable to refresh the session of user {}. Status: {}",
                session.owner_id,
                res.status()
            );
            self.state.set(None);
            return Err(IdentityError::Unauthenticated);
        }

        let res = res
            .json::<RefreshTokenResponse>()
            .await
            .map_err(anyhow::Error::new)?;
        let refreshed = Session {
            owner_id: OwnerId::new(res.user_id),
            email: session.email,
            expires_at: self.expires_at(&res.expires_in),
            id_token: res.id_token,
            refresh_token: Some(res.refresh_token),
        };
        self.state.set(Some(refreshed.clone()));
        Ok(refreshed)
    }
}

fn error_from_message(message: String) -> IdentityError {
    // Messages can have details appended, e.g. "WEAK_PASSWORD : Password should be ..."
    let code = message.split(' ').next().unwrap_or_default();
    match code {
        "EMAIL_EXISTS" => IdentityError::EmailTaken(message),
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED"
        | "INVALID_EMAIL" | "WEAK_PASSWORD" | "MISSING_PASSWORD" => {
            IdentityError::InvalidCredentials(message)
        }
        "INVALID_ID_TOKEN" | "USER_NOT_FOUND" | "TOKEN_EXPIRED" => IdentityError::Unauthenticated,
        _ => IdentityError::Provider(anyhow::anyhow!("Firebase Auth error: {}", message)),
    }
}

#[async_trait::async_trait]
impl IIdentityProvider for FirebaseIdentityProvider {
    fn current_session(&self) -> Option<Session> {
        self.state.current()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    async fn id_token(&self) -> Result<String, IdentityError> {
        let session = self.state.current().ok_or(IdentityError::Unauthenticated)?;
        if session.is_expired(self.sys.now()) {
            return self.refresh(session).await.map(|s| s.id_token);
        }
        Ok(session.id_token)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        self.password_flow("accounts:signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        self.password_flow("accounts:signInWithPassword", email, password)
            .await
    }

    async fn sign_out(&self) {
        self.state.set(None);
    }

    async fn delete_account(&self) -> Result<(), IdentityError> {
        let id_token = self.id_token().await?;
        let _: serde_json::Value = self
            .post(
                &format!("{}/accounts:delete", IDENTITY_TOOLKIT_BASE_URL),
                &DeleteAccountRequest {
                    id_token: &id_token,
                },
            )
            .await?;
        self.state.set(None);
        Ok(())
    }
}

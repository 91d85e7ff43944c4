//! Firebase email/password sign-in over the Identity Toolkit REST API.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::error::{AuthError, Result};
use super::{AuthProvider, Session, User};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Signs users in with Firebase Authentication and keeps the [`Session`]
/// up to date.
#[derive(Debug, Clone)]
pub struct FirebaseAuth {
    client: Client,
    api_key: String,
    identity_url: String,
    token_url: String,
    session: Session,
}

impl FirebaseAuth {
    /// Create a client for the project owning `api_key`.
    pub fn new(api_key: impl Into<String>, session: Session) -> Result<Self> {
        Self::with_endpoints(api_key, session, IDENTITY_TOOLKIT_URL, SECURE_TOKEN_URL)
    }

    /// Create a client against custom endpoints, such as the auth emulator.
    pub fn with_endpoints(
        api_key: impl Into<String>,
        session: Session,
        identity_url: &str,
        token_url: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            identity_url: identity_url.trim_end_matches('/').to_string(),
            token_url: token_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Sign in with email and password.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        debug!("Signing in");

        let url = format!(
            "{}/accounts:signInWithPassword?key={}",
            self.identity_url, self.api_key
        );
        let response = self
            .client
            .post(&url)
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let body: SignInResponse = parse(response).await?;
        let user = User {
            uid: body.local_id,
            email: body.email,
            display_name: body.display_name,
            id_token: body.id_token,
            refresh_token: body.refresh_token,
        };

        self.session.set_user(user.clone());
        info!("Signed in");
        Ok(user)
    }

    /// Exchange the current refresh token for a new ID token.
    ///
    /// On a rejected refresh token the session is signed out.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<User> {
        let current = self.session.current_user().ok_or(AuthError::NotSignedIn)?;

        let url = format!("{}/token?key={}", self.token_url, self.api_key);
        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", current.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let body: RefreshResponse = match parse(response).await {
            Ok(body) => body,
            Err(e @ AuthError::InvalidCredentials(_)) => {
                warn!(error = %e, "Refresh token rejected, signing out");
                self.session.sign_out();
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let user = User {
            uid: body.user_id,
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            ..current
        };
        self.session.set_user(user.clone());
        debug!("ID token refreshed");
        Ok(user)
    }
}

impl AuthProvider for FirebaseAuth {
    fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }
}

/// Parse a success body, or turn the service's error envelope into an error.
async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| AuthError::InvalidResponse(format!("failed to parse response: {}", e)));
    }

    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) => Err(AuthError::from_identity_code(&envelope.error.message)),
        Err(_) => Err(AuthError::InvalidResponse(format!("HTTP {}: {}", status, text))),
    }
}

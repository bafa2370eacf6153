//! Authentication context shared by every view.
//!
//! # Design
//! - [`SessionStore`] is the only writer of the token; views read it through
//!   [`Session`] and never touch the credential store.
//! - Auth failures are recorded in [`Session::last_error`] instead of being
//!   returned, so a failed login leaves the prior token in place.

use std::fmt;

use radview_api_models::{LoginRequest, SignupRequest, TokenResponse};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::credentials::CredentialStore;
use crate::error::ApiError;

/// Opaque bearer credential. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Snapshot of the authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<BearerToken>,
    last_error: Option<String>,
}

impl Session {
    /// Session holding `token` with no error.
    #[must_use]
    pub const fn authenticated(token: BearerToken) -> Self {
        Self {
            token: Some(token),
            last_error: None,
        }
    }

    /// `true` exactly when a token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Current bearer token.
    #[must_use]
    pub const fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    /// Message from the most recent failed login or signup.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[derive(Clone, Copy)]
enum AuthFlow {
    Login,
    Signup,
}

impl AuthFlow {
    const fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }

    const fn rejected(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Signup => "Signup failed",
        }
    }

    const fn errored(self) -> &'static str {
        match self {
            Self::Login => "Login error occurred",
            Self::Signup => "Signup error occurred",
        }
    }

    fn failure_message(self, err: &ApiError) -> String {
        match err {
            ApiError::Status { message, .. } => message
                .clone()
                .unwrap_or_else(|| self.rejected().to_string()),
            other => format!("{}: {}", self.errored(), other.detailed()),
        }
    }
}

/// Owner of the session and its persisted credential.
#[derive(Debug)]
pub struct SessionStore<S> {
    credentials: S,
    session: Session,
}

impl<S: CredentialStore> SessionStore<S> {
    /// Rebuild the session from the persisted credential without any network call.
    ///
    /// A credential store that cannot be read is treated as empty.
    #[must_use]
    pub fn restore(credentials: S) -> Self {
        let token = match credentials.load() {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "stored credential could not be read; starting logged out");
                None
            }
        };
        let session = Session {
            token: token.map(BearerToken::new),
            last_error: None,
        };
        info!(authenticated = session.is_authenticated(), "session restored");
        Self {
            credentials,
            session,
        }
    }

    /// Current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Current bearer token.
    #[must_use]
    pub const fn token(&self) -> Option<&BearerToken> {
        self.session.token()
    }

    /// Backing credential store.
    #[must_use]
    pub const fn credentials(&self) -> &S {
        &self.credentials
    }

    /// Exchange credentials for a token via `POST /login`.
    ///
    /// Failures never propagate; they leave the token unchanged and set
    /// [`Session::last_error`].
    pub async fn login(&mut self, api: &ApiClient, email: &str, password: &str) {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let outcome = api.login(&request).await;
        self.complete(AuthFlow::Login, outcome);
    }

    /// Register and receive a token via `POST /signup`.
    ///
    /// Same failure contract as [`SessionStore::login`].
    pub async fn signup(&mut self, api: &ApiClient, username: &str, password: &str) {
        let request = SignupRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let outcome = api.signup(&request).await;
        self.complete(AuthFlow::Signup, outcome);
    }

    /// Drop the token and the persisted credential. Safe to call repeatedly.
    pub fn logout(&mut self) {
        if let Err(err) = self.credentials.clear() {
            warn!(error = %err, "failed to remove stored credential");
        }
        let was_authenticated = self.session.is_authenticated();
        self.session = Session::default();
        if was_authenticated {
            info!("logged out");
        }
    }

    fn complete(&mut self, flow: AuthFlow, outcome: Result<TokenResponse, ApiError>) {
        match outcome {
            Ok(response) if !response.token.trim().is_empty() => {
                if let Err(err) = self.credentials.save(&response.token) {
                    warn!(flow = flow.name(), error = %err, "failed to persist credential");
                }
                self.session = Session::authenticated(BearerToken::new(response.token));
                info!(flow = flow.name(), "authenticated");
            }
            Ok(_) => {
                warn!(flow = flow.name(), "response carried an empty token");
                self.session.last_error = Some(flow.rejected().to_string());
            }
            Err(err) => {
                warn!(flow = flow.name(), error = %err.detailed(), "authentication failed");
                self.session.last_error = Some(flow.failure_message(&err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use httpmock::prelude::*;
    use reqwest::Client;
    use serde_json::json;
    use url::Url;

    fn client_for(server: &MockServer) -> ApiClient {
        let base: Url = format!("{}/", server.base_url()).parse().expect("base url");
        ApiClient::with_client(Client::new(), base.clone(), base)
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = BearerToken::new("secret-value");
        assert!(!format!("{token:?}").contains("secret-value"));
    }

    #[test]
    fn restore_uses_persisted_token() {
        let store = SessionStore::restore(MemoryCredentialStore::with_token("saved"));
        assert!(store.session().is_authenticated());
        assert_eq!(store.token().map(BearerToken::expose), Some("saved"));

        let empty = SessionStore::restore(MemoryCredentialStore::default());
        assert!(!empty.session().is_authenticated());
        assert_eq!(empty.session().last_error(), None);
    }

    #[tokio::test]
    async fn login_success_sets_and_persists_token() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/login")
                .json_body(json!({"email": "a@b.io", "password": "pw"}));
            then.status(200).json_body(json!({"token": "fresh"}));
        });

        let credentials = MemoryCredentialStore::default();
        let mut store = SessionStore::restore(credentials.clone());
        store.login(&client_for(&server), "a@b.io", "pw").await;

        mock.assert();
        assert!(store.session().is_authenticated());
        assert_eq!(store.session().last_error(), None);
        assert_eq!(credentials.stored().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn rejected_login_keeps_prior_token_and_reports_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/login");
            then.status(401).json_body(json!({"message": "Invalid credentials"}));
        });

        let credentials = MemoryCredentialStore::with_token("old");
        let mut store = SessionStore::restore(credentials.clone());
        store.login(&client_for(&server), "a@b.io", "bad").await;

        assert_eq!(store.token().map(BearerToken::expose), Some("old"));
        assert_eq!(store.session().last_error(), Some("Invalid credentials"));
        assert_eq!(credentials.stored().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn rejected_signup_without_message_uses_fallback() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/signup");
            then.status(409);
        });

        let mut store = SessionStore::restore(MemoryCredentialStore::default());
        store.signup(&client_for(&server), "dr-ames", "pw").await;

        assert!(!store.session().is_authenticated());
        assert_eq!(store.session().last_error(), Some("Signup failed"));
    }

    #[tokio::test]
    async fn malformed_login_response_is_an_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/login");
            then.status(200).json_body(json!({"unexpected": true}));
        });

        let mut store = SessionStore::restore(MemoryCredentialStore::default());
        store.login(&client_for(&server), "a@b.io", "pw").await;

        assert!(!store.session().is_authenticated());
        let message = store.session().last_error().expect("error recorded");
        assert!(message.starts_with("Login error occurred"));
    }

    #[test]
    fn logout_is_idempotent() {
        let credentials = MemoryCredentialStore::with_token("tok");
        let mut store = SessionStore::restore(credentials.clone());

        store.logout();
        assert!(!store.session().is_authenticated());
        assert_eq!(credentials.stored(), None);

        store.logout();
        assert_eq!(store.session(), &Session::default());
    }
}

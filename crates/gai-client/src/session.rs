use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use gai_core::config::Config;
use gai_core::ApiResponse;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::reply::Reply;
use crate::tokens::{CredentialPair, TokenStore};

const LOGIN_PATH: &str = "/api/auth/login/";
const REFRESH_PATH: &str = "/api/auth/refresh/";
const ME_PATH: &str = "/api/auth/me/";
const STATS_PATH: &str = "/api/dashboard/stats/";

/// Fields tried, in order, for a human-readable error on a failed call.
const ERROR_FIELDS: &[&str] = &["detail", "message"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Refreshing,
    Expired,
}

/// Operator profile returned by the back-end.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub department: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub last_login: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

#[derive(Debug)]
struct Inner {
    state: SessionState,
    credentials: Option<CredentialPair>,
}

// ---------------------------------------------------------------------------
// SessionManager
// ---------------------------------------------------------------------------

/// Owns the operator's token pair and wraps every back-end call.
///
/// `execute` is the only place that retries: on a 401 it refreshes the
/// access token at most once and re-issues the call at most once. If the
/// refresh fails the session is expired, both tokens are discarded and the
/// original failure is returned.
pub struct SessionManager {
    http: reqwest::Client,
    base_url: String,
    tokens: Option<TokenStore>,
    inner: Mutex<Inner>,
    /// Serializes refreshes so parallel 401s trigger a single refresh call.
    refresh_lock: tokio::sync::Mutex<()>,
}

impl SessionManager {
    /// `tokens` of `None` keeps the session in memory only.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Option<TokenStore>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            inner: Mutex::new(Inner {
                state: SessionState::Anonymous,
                credentials: None,
            }),
            refresh_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let tokens = config.backend.token_dir.as_deref().map(TokenStore::new);
        Self::new(&config.backend.url, config.request_timeout(), tokens)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub fn credentials(&self) -> Option<CredentialPair> {
        self.lock().credentials.clone()
    }

    fn access_token(&self) -> Option<String> {
        self.lock().credentials.as_ref().map(|c| c.access.clone())
    }

    fn has_refresh_token(&self) -> bool {
        self.lock().credentials.is_some()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Pick up tokens persisted by an earlier session.
    pub fn restore(&self) -> SessionState {
        let Some(pair) = self.tokens.as_ref().and_then(TokenStore::load) else {
            return self.state();
        };
        let mut inner = self.lock();
        inner.credentials = Some(pair);
        inner.state = SessionState::Authenticated;
        inner.state
    }

    // -----------------------------------------------------------------------
    // Login / logout
    // -----------------------------------------------------------------------

    /// Exchange credentials for a token pair.
    ///
    /// Sent without a bearer token and outside the refresh path: a 401 here
    /// means bad credentials, not a stale session.
    pub async fn login(&self, email: &str, password: &str) -> ApiResponse<LoginResponse> {
        match self.try_login(email, password).await {
            Ok(login) => {
                let pair = CredentialPair {
                    access: login.access.clone(),
                    refresh: login.refresh.clone(),
                };
                self.persist(|store| store.save(&pair));
                {
                    let mut inner = self.lock();
                    inner.credentials = Some(pair);
                    inner.state = SessionState::Authenticated;
                }
                tracing::info!(email = %email, "operator logged in");
                ApiResponse::ok(login)
            }
            Err(e) => {
                tracing::warn!(email = %email, error = %e, "login failed");
                ApiResponse::failure(e.to_string())
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let reply = self
            .send(&Method::POST, &self.url(LOGIN_PATH), Some(&body), None)
            .await?;
        if !reply.status.is_success() {
            return Err(reply.into_peer_error(ERROR_FIELDS, None));
        }
        Ok(serde_json::from_value(reply.json)?)
    }

    /// Discard both tokens immediately. No server call.
    pub fn logout(&self) {
        self.discard(SessionState::Anonymous);
        tracing::info!("operator logged out");
    }

    fn discard(&self, state: SessionState) {
        {
            let mut inner = self.lock();
            inner.credentials = None;
            inner.state = state;
        }
        self.persist(TokenStore::clear);
    }

    fn persist(&self, op: impl FnOnce(&TokenStore) -> gai_core::Result<()>) {
        if let Some(store) = &self.tokens {
            if let Err(e) = op(store) {
                tracing::warn!(error = %e, "failed to update stored tokens");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Authenticated calls
    // -----------------------------------------------------------------------

    /// Issue an authenticated call against the back-end.
    pub async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
    ) -> ApiResponse {
        match self.try_execute(&method, endpoint, body).await {
            Ok(data) => ApiResponse::ok(data),
            Err(e) => {
                tracing::warn!(%method, endpoint, error = %e, "back-end call failed");
                ApiResponse::failure(e.to_string())
            }
        }
    }

    async fn try_execute(
        &self,
        method: &Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.url(endpoint);
        let used = self.access_token();
        let reply = self.send(method, &url, body, used.as_deref()).await?;

        let reply = if reply.status == StatusCode::UNAUTHORIZED
            && self.has_refresh_token()
            && self.refresh_after(used.as_deref()).await
        {
            let current = self.access_token();
            self.send(method, &url, body, current.as_deref()).await?
        } else {
            reply
        };

        if !reply.status.is_success() {
            return Err(reply.into_peer_error(ERROR_FIELDS, None));
        }
        Ok(reply.into_data())
    }

    /// Make sure the access token is newer than `stale`, refreshing if needed.
    /// Returns `false` when the session could not be recovered.
    async fn refresh_after(&self, stale: Option<&str>) -> bool {
        let _guard = self.refresh_lock.lock().await;

        let refresh = {
            let mut inner = self.lock();
            let Some(creds) = inner.credentials.as_ref() else {
                return false;
            };
            if inner.state == SessionState::Authenticated && Some(creds.access.as_str()) != stale {
                // Another call refreshed while this one waited.
                return true;
            }
            let refresh = creds.refresh.clone();
            inner.state = SessionState::Refreshing;
            refresh
        };

        match self.request_refresh(&refresh).await {
            Ok(access) => {
                self.persist(|store| store.save_access(&access));
                let mut inner = self.lock();
                if let Some(creds) = inner.credentials.as_mut() {
                    creds.access = access;
                }
                inner.state = SessionState::Authenticated;
                tracing::debug!("access token refreshed");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed; session expired");
                self.discard(SessionState::Expired);
                false
            }
        }
    }

    async fn request_refresh(&self, refresh: &str) -> Result<String, ClientError> {
        let body = serde_json::json!({ "refresh": refresh });
        let reply = self
            .send(&Method::POST, &self.url(REFRESH_PATH), Some(&body), None)
            .await?;
        if !reply.status.is_success() {
            return Err(reply.into_peer_error(ERROR_FIELDS, None));
        }
        let parsed: RefreshResponse = serde_json::from_value(reply.json)
            .map_err(|_| ClientError::UnexpectedResponse("refresh response has no access token".into()))?;
        Ok(parsed.access)
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        body: Option<&serde_json::Value>,
        bearer: Option<&str>,
    ) -> Result<Reply, ClientError> {
        let mut req = self.http.request(method.clone(), url);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(ClientError::Transport)?;
        Reply::read(resp).await
    }

    // -----------------------------------------------------------------------
    // Conveniences
    // -----------------------------------------------------------------------

    pub async fn get(&self, endpoint: &str) -> ApiResponse {
        self.execute(Method::GET, endpoint, None).await
    }

    pub async fn post(&self, endpoint: &str, body: &serde_json::Value) -> ApiResponse {
        self.execute(Method::POST, endpoint, Some(body)).await
    }

    pub async fn patch(&self, endpoint: &str, body: &serde_json::Value) -> ApiResponse {
        self.execute(Method::PATCH, endpoint, Some(body)).await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResponse {
        self.execute(Method::DELETE, endpoint, None).await
    }

    /// Profile of the logged-in operator.
    pub async fn current_user(&self) -> ApiResponse<User> {
        let result = self.get(ME_PATH).await;
        if !result.success {
            return ApiResponse::failure(result.error.unwrap_or_default());
        }
        match serde_json::from_value(result.data.unwrap_or_default()) {
            Ok(user) => ApiResponse::ok(user),
            Err(e) => ApiResponse::failure(format!("unexpected profile payload: {e}")),
        }
    }

    /// The back-end counts as reachable when it answers at all with 2xx or 401.
    pub async fn check_backend(&self) -> ApiResponse {
        let used = self.access_token();
        match self
            .send(&Method::GET, &self.url(STATS_PATH), None, used.as_deref())
            .await
        {
            Ok(reply) if reply.status.is_success() || reply.status == StatusCode::UNAUTHORIZED => {
                ApiResponse::ok_message("Backend is reachable")
            }
            Ok(_) => ApiResponse::failure("Backend connection failed"),
            Err(_) => ApiResponse::failure("Backend is not reachable"),
        }
    }
}

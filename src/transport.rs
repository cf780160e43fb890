//! HTTP transport module
//!
//! This module provides the session-scoped REST client used by every
//! messaging component:
//! - Bearer credential and request id attached to every call
//! - Bounded per-request timeout
//! - Structured errors for non-2xx responses, with the server's message
//! - Distinguished handling of 401 (session expiry)

use crate::models::{Conversation, Message, SendMessageRequest, User};
use crate::session::Session;
use crate::settings::Settings;
use crate::{Error, Result};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Callback invoked when the server rejects the session (HTTP 401)
pub type AuthExpiredHandler = Arc<dyn Fn() + Send + Sync>;

/// Error payload returned by the backend on non-2xx responses
#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TeachersResponse {
    #[serde(default)]
    teachers: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct ConversationsResponse {
    #[serde(default)]
    conversations: Vec<Conversation>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    messages: Vec<Message>,
}

/// `POST /api/messages/send` answers with either shape
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SendResponse {
    Envelope { message: Message },
    Bare(Message),
}

impl SendResponse {
    fn into_message(self) -> Message {
        match self {
            SendResponse::Envelope { message } => message,
            SendResponse::Bare(message) => message,
        }
    }
}

/// Session-scoped REST client
///
/// Built on login from the [`Session`] and [`Settings`], dropped on logout.
/// Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    /// Underlying HTTP client (carries the timeout)
    http: reqwest::Client,
    /// Backend base URL
    base_url: Arc<Url>,
    /// Bearer credential
    token: Arc<String>,
    /// Request timeout, for error reporting
    timeout: Duration,
    /// Session-expiry callback
    auth_expired_handler: Arc<Mutex<Option<AuthExpiredHandler>>>,
}

impl ApiClient {
    /// Create a client for the given bearer token
    pub fn new(settings: &Settings, token: impl Into<String>) -> Result<Self> {
        settings.validate()?;
        let base_url = settings.base_url()?;
        let timeout = settings.request_timeout();

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        info!("API client ready for {} (timeout {:?})", base_url, timeout);

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            token: Arc::new(token.into()),
            timeout,
            auth_expired_handler: Arc::new(Mutex::new(None)),
        })
    }

    /// Create a client for a logged-in session
    pub fn for_session(settings: &Settings, session: &Session) -> Result<Self> {
        Self::new(settings, session.token())
    }

    /// Set the callback invoked when a request comes back 401
    ///
    /// The authentication layer uses this to clear the session and send the
    /// user back to login; the messaging core only aborts the operation.
    pub async fn set_auth_expired_handler<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut guard = self.auth_expired_handler.lock().await;
        *guard = Some(Arc::new(handler));
    }

    /// Backend base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments (each segment is encoded)
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = (*self.base_url).clone();
        url.path_segments_mut()
            .map_err(|_| Error::Settings(format!("Base URL {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET /api/teachers`
    ///
    /// Records without a role are teachers by construction of the endpoint.
    pub async fn list_teachers(&self) -> Result<Vec<User>> {
        let url = self.endpoint(&["api", "teachers"])?;
        let response: TeachersResponse = self.get_json(url, "list teachers").await?;

        Ok(response
            .teachers
            .into_iter()
            .map(|mut user| {
                user.role = crate::models::Role::Teacher;
                user
            })
            .collect())
    }

    /// `GET /api/admin/all?limit=<limit>`
    pub async fn list_all_users(&self, limit: u32) -> Result<Vec<User>> {
        let mut url = self.endpoint(&["api", "admin", "all"])?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        let response: UsersResponse = self.get_json(url, "list users").await?;
        Ok(response.users)
    }

    /// `GET /api/messages/conversations`
    pub async fn fetch_conversations(&self) -> Result<Vec<Conversation>> {
        let url = self.endpoint(&["api", "messages", "conversations"])?;
        let response: ConversationsResponse = self.get_json(url, "fetch conversations").await?;
        Ok(response.conversations)
    }

    /// `GET /api/messages/conversation/{other_user_id}`
    pub async fn fetch_history(&self, other_user_id: &str) -> Result<Vec<Message>> {
        let url = self.endpoint(&["api", "messages", "conversation", other_user_id])?;
        let response: MessagesResponse = self.get_json(url, "fetch history").await?;
        Ok(response.messages)
    }

    /// `POST /api/messages/send`
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<Message> {
        let url = self.endpoint(&["api", "messages", "send"])?;
        let response: SendResponse = self
            .execute(self.http.post(url).json(request), "send message")
            .await?;
        Ok(response.into_message())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        self.execute(self.http.get(url), what).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let request_id = Uuid::new_v4();
        debug!("{} (request {})", what, request_id);

        let response = request
            .bearer_auth(self.token.as_str())
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await
            .map_err(|e| {
                let detail = if e.is_timeout() {
                    format!("{} timed out after {:?}", what, self.timeout)
                } else if e.is_connect() {
                    format!("{} could not reach the server: {}", what, e)
                } else {
                    format!("{} failed: {}", what, e)
                };
                warn!("Request {} failed: {}", request_id, detail);
                Error::transport(detail)
            })?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("{} rejected with 401 (request {}), session expired", what, request_id);
            let handler = self.auth_expired_handler.lock().await.clone();
            if let Some(handler) = handler {
                handler();
            }
            return Err(Error::AuthExpired);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let payload: ErrorPayload = serde_json::from_str(&body).unwrap_or_default();
            let server_message = payload.message.or(payload.error);

            warn!(
                "{} failed with status {} (request {}): {}",
                what,
                status,
                request_id,
                server_message.as_deref().unwrap_or("no message")
            );

            return Err(Error::Transport {
                status: Some(status.as_u16()),
                server_message,
                detail: format!("{} failed with status {}", what, status),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            error!("Failed to read body of request {}: {}", request_id, e);
            Error::transport(format!("{} response could not be read: {}", what, e))
        })?;

        let decoded = serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to decode body of request {}: {}", request_id, e);
            Error::Transport {
                status: Some(status.as_u16()),
                server_message: None,
                detail: format!("{} returned an unreadable response: {}", what, e),
            }
        })?;
        debug!("{} completed with status {} (request {})", what, status, request_id);
        Ok(decoded)
    }
}

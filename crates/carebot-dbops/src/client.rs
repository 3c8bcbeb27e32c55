//! The pooled HTTP client.

use crate::error::DbOpsError;
use carebot_core::BackendConfig;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Fail fast on unreachable backends.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Overall per-request deadline, connect time included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the DBOps REST backend.
///
/// Holds one connection pool for the process lifetime. All methods return the
/// parsed JSON body; a non-2xx response becomes [`DbOpsError::Backend`] with
/// the status and body attached. Calls are never retried here.
pub struct DbOpsClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    closed: AtomicBool,
}

impl DbOpsClient {
    /// Create a client for the given base URL and optional bearer token.
    ///
    /// A missing token does not fail construction: requests go out without an
    /// Authorization header and the backend rejects them with its auth error.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, DbOpsError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        if token.is_none() {
            tracing::warn!("no backend token configured; authenticated calls will be rejected");
        }

        Ok(Self {
            http,
            base_url,
            token,
            closed: AtomicBool::new(false),
        })
    }

    /// Create a client from configuration, resolving the token indirection.
    pub fn from_config(config: &BackendConfig) -> Result<Self, DbOpsError> {
        Self::new(config.base_url.clone(), config.resolve_token())
    }

    /// `GET {base_url}{path}` with optional query parameters.
    pub async fn get(
        &self,
        path: &str,
        params: Option<&[(&str, &str)]>,
    ) -> Result<Value, DbOpsError> {
        self.ensure_open()?;
        let mut request = self.http.get(self.url(path));
        if let Some(params) = params {
            request = request.query(params);
        }
        self.execute(request).await
    }

    /// `POST {base_url}{path}` with a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, DbOpsError> {
        self.ensure_open()?;
        self.execute(self.http.post(self.url(path)).json(body)).await
    }

    /// `PUT {base_url}{path}` with a JSON body.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, DbOpsError> {
        self.ensure_open()?;
        self.execute(self.http.put(self.url(path)).json(body)).await
    }

    /// `PATCH {base_url}{path}` with a JSON body.
    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, DbOpsError> {
        self.ensure_open()?;
        self.execute(self.http.patch(self.url(path)).json(body)).await
    }

    /// Shut the client down. Idempotent; subsequent calls fail with
    /// [`DbOpsError::Closed`]. The pool itself is released on drop.
    pub fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::info!("dbops client shut down");
        }
    }

    /// Whether `shutdown` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), DbOpsError> {
        if self.is_closed() {
            return Err(DbOpsError::Closed);
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value, DbOpsError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DbOpsError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        // Some write endpoints answer 2xx with an empty body.
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(DbOpsError::Decode)
    }
}

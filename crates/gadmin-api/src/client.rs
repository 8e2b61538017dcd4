use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use gadmin_auth::{CredentialSource, PermissionSource};
use reqwest::Method;
use serde_json::{Value, json};

use crate::envelope::{self, Denial};
use crate::error::{ApiError, Suppressed};
use crate::notice::{
    DEFAULT_FORBIDDEN_MSG, DEFAULT_UNAUTHORIZED_MSG, NoticeGate, Notifier, REAUTH_PROMPT,
};

/// Paths under this prefix require the bearer credential.
pub const AUTHENTICATED_PREFIX: &str = "/admin/api/";

pub const USER_PERMISSIONS_PATH: &str = "/admin/api/user/permissions";
pub const LOGOUT_PATH: &str = "/admin/api/logout";

/// HTTP client for the admin backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
    notifier: Arc<dyn Notifier>,
    forbidden_gate: NoticeGate,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialSource>,
        notifier: Arc<dyn Notifier>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            notifier,
            forbidden_gate: NoticeGate::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and unwrap the response envelope.
    ///
    /// 401 and 403 outcomes are reported to the notifier here and come back
    /// as [`ApiError::Suppressed`]; every other failure is returned as is.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method.clone(), &url);
        if path.starts_with(AUTHENTICATED_PREFIX) {
            if let Some(token) = self.credentials.current() {
                req = req.bearer_auth(token);
            }
        }
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        tracing::debug!(%method, path, "api request");
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;

        envelope::unwrap_response(status, &text).map_err(|err| self.handle_failure(err))
    }

    fn handle_failure(&self, err: ApiError) -> ApiError {
        match envelope::classify(&err) {
            Some(Denial::Unauthorized(msg)) => {
                let msg = if msg.is_empty() {
                    DEFAULT_UNAUTHORIZED_MSG.to_string()
                } else {
                    msg
                };
                self.notifier.reauth_required(&format!("{msg}{REAUTH_PROMPT}"));
                ApiError::Suppressed(Suppressed::Unauthorized { msg })
            }
            Some(Denial::Forbidden(msg)) => {
                let msg = if msg.is_empty() {
                    DEFAULT_FORBIDDEN_MSG.to_string()
                } else {
                    msg
                };
                let notified = self.forbidden_gate.admit(Instant::now());
                if notified {
                    self.notifier.forbidden(&msg);
                } else {
                    tracing::debug!("forbidden notice suppressed by rate limit");
                }
                ApiError::Suppressed(Suppressed::Forbidden { msg, notified })
            }
            None => err,
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, &[], None).await
    }

    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// Invalidate the current token on the backend.
    pub async fn logout(&self) -> Result<Value, ApiError> {
        self.post(LOGOUT_PATH, &json!({})).await
    }

    /// Grants of the signed-in user.
    pub async fn user_permissions(&self) -> Result<Value, ApiError> {
        self.get(USER_PERMISSIONS_PATH).await
    }
}

#[async_trait]
impl PermissionSource for ApiClient {
    async fn fetch_permissions(&self) -> anyhow::Result<Value> {
        Ok(self.user_permissions().await?)
    }
}

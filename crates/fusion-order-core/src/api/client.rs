//! Request dispatcher for the order-management REST API.
//!
//! `ApiClient` sends every call through one path: attach the bearer token
//! if there is one, unwrap the response envelope, and turn every kind of
//! failure into an [`ApiError`]. A 401 additionally clears the stored
//! credential and publishes an [`AuthEvent`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::auth::{AuthEvent, CredentialStore};
use crate::config::{Config, DEFAULT_LOGIN_PATH, DEFAULT_REQUEST_TIMEOUT_SECS};

use super::envelope::{self, Payload};
use super::ApiError;

/// Auth events buffered for slow subscribers
const AUTH_EVENT_CAPACITY: usize = 16;

/// API client for the order service.
/// Clone is cheap - the reqwest pool, credential store and event channel are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    login_path: String,
    credentials: Arc<dyn CredentialStore>,
    auth_events: broadcast::Sender<AuthEvent>,
}

impl ApiClient {
    /// Create a client for `base_url` with the default timeout and login path
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        Self::build(
            base_url.into(),
            DEFAULT_LOGIN_PATH.to_string(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            credentials,
        )
    }

    /// Create a client from the loaded configuration
    pub fn from_config(
        config: &Config,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        Self::build(
            config.api_base_url.clone(),
            config.login_path.clone(),
            Duration::from_secs(config.request_timeout_secs),
            credentials,
        )
    }

    fn build(
        base_url: String,
        login_path: String,
        timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let (auth_events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            login_path,
            credentials,
            auth_events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Receive an event every time a call loses the session
    pub fn subscribe_auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_events.subscribe()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        let token = match self.credentials.get() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read credential, sending request unauthenticated");
                None
            }
        };
        if let Some(token) = token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidRequest(format!("bad bearer token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Clear the credential and tell subscribers the session is gone
    fn handle_auth_lost(&self, error: &ApiError) {
        warn!(error = %error, "Session rejected by server, clearing credential");
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "Failed to clear credential");
        }
        // No subscribers is fine
        let _ = self.auth_events.send(AuthEvent::SessionExpired {
            message: error.message(),
            login_path: self.login_path.clone(),
        });
    }

    async fn dispatch<T, Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.auth_headers()?);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(method = %method, url = %url, "Sending request");
        let response = request.send().await.map_err(|e| {
            warn!(
                method = %method,
                url = %url,
                error = %e,
                "Request failed before a response arrived"
            );
            ApiError::Network(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let failure = envelope::failure_from_response(status, &text);
            debug!(
                method = %method,
                url = %url,
                status = %status,
                error = %failure.error,
                "Request rejected"
            );
            if failure.auth_lost {
                self.handle_auth_lost(&failure.error);
            }
            return Err(failure.error);
        }

        let data = Payload::classify(envelope::parse_body(&text)).into_data()?;
        serde_json::from_value(data).map_err(|e| {
            ApiError::Decode(format!("unexpected payload from {} {}: {}", method, path, e))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.dispatch(Method::GET, path, None::<&()>, None::<&()>).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.dispatch(Method::GET, path, Some(query), None::<&()>).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.dispatch(Method::POST, path, None::<&()>, Some(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.dispatch(Method::PUT, path, None::<&()>, Some(body)).await
    }

    /// PUT with query parameters and no body
    pub async fn put_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.dispatch(Method::PUT, path, Some(query), None::<&()>).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.dispatch(Method::DELETE, path, None::<&()>, None::<&()>).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

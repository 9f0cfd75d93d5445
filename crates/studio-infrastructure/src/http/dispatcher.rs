//! Authenticated request dispatch
//!
//! Attaches the stored access token to a request and turns a 401 into a
//! cleared token store plus `ClientError::SessionExpired`. Any other status
//! is handed back untouched for the caller to interpret. Expiry is only
//! discovered from the response; the token is not checked before sending.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};

use studio_core::error::ClientError;
use studio_core::repositories::KeyValueStore;
use studio_core::services::{SessionEvent, SessionEvents, TokenStore};

use super::response::network_failure;

/// Optional parts of an authenticated request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub body: Option<Value>,
    /// Applied after the defaults, so these win on conflict.
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn json(body: Value) -> Self {
        Self {
            body: Some(body),
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

pub struct Dispatcher<S: KeyValueStore + ?Sized> {
    http: Client,
    tokens: Arc<TokenStore<S>>,
    events: SessionEvents,
}

impl<S: KeyValueStore + ?Sized> Dispatcher<S> {
    pub fn new(http: Client, tokens: Arc<TokenStore<S>>, events: SessionEvents) -> Self {
        Self { http, tokens, events }
    }

    pub async fn send(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        let token = self.tokens.get().await?.ok_or(ClientError::NoSession)?;

        let bearer = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            warn!("Stored access token cannot be sent as a header; treating as no session");
            ClientError::NoSession
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, bearer);
        headers.extend(options.headers);

        let mut request = self.http.request(method.clone(), url).headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        debug!("Dispatching {} {}", method, url);
        let response = request.send().await.map_err(|e| {
            error!("Request {} {} failed: {}", method, url, e);
            network_failure(e)
        })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Session rejected by backend on {} {}; clearing tokens", method, url);
            if let Err(e) = self.tokens.clear().await {
                error!("Failed to clear tokens after rejection: {}", e);
            }
            self.events.publish(SessionEvent::Expired);
            return Err(ClientError::SessionExpired);
        }

        Ok(response)
    }
}

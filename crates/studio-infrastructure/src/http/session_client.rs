// ============================================================================
// Studio Infrastructure - Session Client
// File: crates/studio-infrastructure/src/http/session_client.rs
// ============================================================================
//! Session client: login/register plus the account, order and tariff
//! operations of the design studio backend.
//!
//! Login and registration report every failure through `AuthOutcome` and
//! never return an error. The remaining operations return `Result` and fail
//! with `ClientError`. The refresh token is stored but never exchanged.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use studio_core::domain::{
    AuthOutcome, ErrorBody, LoginSuccess, NewOrder, NewUser, Order, Page, ProfileUpdate, Tariff,
    UserProfile,
};
use studio_core::error::ClientError;
use studio_core::repositories::KeyValueStore;
use studio_core::services::{SessionEvent, SessionEvents, TokenStore};
use studio_shared::config::ApiSettings;
use studio_shared::constants::*;
use studio_shared::utils::{join_url, mask_email};

use super::dispatcher::{Dispatcher, RequestOptions};
use super::response::{network_failure, read_json, server_message};

pub struct SessionClient<S: KeyValueStore + ?Sized> {
    http: Client,
    base_url: String,
    tokens: Arc<TokenStore<S>>,
    events: SessionEvents,
    dispatcher: Dispatcher<S>,
}

impl<S: KeyValueStore + ?Sized> SessionClient<S> {
    /// Build a client with its own HTTP connection pool and request timeout.
    pub fn new(settings: &ApiSettings, store: Arc<S>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self::with_http_client(http, &settings.base_url, store))
    }

    pub fn with_http_client(http: Client, base_url: &str, store: Arc<S>) -> Self {
        let tokens = Arc::new(TokenStore::new(store));
        let events = SessionEvents::default();
        let dispatcher = Dispatcher::new(http.clone(), tokens.clone(), events.clone());

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            events,
            dispatcher,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenStore<S> {
        &self.tokens
    }

    /// Session lifecycle notifications, `Expired` in particular.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Send any request with the stored access token attached.
    pub async fn authenticated_request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        self.dispatcher.send(method, url, options).await
    }

    /// Whether a stored, unexpired access token exists. Purely local.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.has_valid_session().await
    }

    /// Guard for protected views; the caller decides where to send the user.
    pub async fn require_auth(&self) -> bool {
        let authenticated = self.is_authenticated().await;
        if !authenticated {
            info!("Protected view requested without a valid session");
        }
        authenticated
    }

    /// Drop the local session. Does not contact the backend.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.tokens.clear().await?;
        self.events.publish(SessionEvent::LoggedOut);
        info!("Logged out");
        Ok(())
    }

    /// Exchange credentials for a token pair and store it. The success value
    /// carries the token endpoint's body as sent.
    pub async fn login(&self, identifier: &str, password: &str) -> AuthOutcome<LoginSuccess> {
        let who = mask_email(identifier);
        info!("Login attempt for: {}", who);

        let payload = json!({ "username": identifier, "password": password });
        let response = match self.http.post(self.url(LOGIN_PATH)).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Login error: {}", e);
                return AuthOutcome::Failure(ErrorBody::network_error());
            }
        };

        if !response.status().is_success() {
            return rejection("Login", response).await;
        }

        let success = match response.json::<Value>().await.map(LoginSuccess::from_body) {
            Ok(Ok(success)) => success,
            Ok(Err(e)) => {
                error!("Login error: token response without a token pair: {}", e);
                return AuthOutcome::Failure(ErrorBody::network_error());
            }
            Err(e) => {
                error!("Login error: unreadable token response: {}", e);
                return AuthOutcome::Failure(ErrorBody::network_error());
            }
        };

        let pair = &success.tokens;
        if let Err(e) = self.tokens.set(&pair.access, &pair.refresh).await {
            error!("Login succeeded but the session could not be stored: {}", e);
            return AuthOutcome::Failure(ErrorBody::with_detail(&e.to_string()));
        }

        self.events.publish(SessionEvent::LoggedIn);
        info!("Login successful for: {}", who);
        AuthOutcome::Success(success)
    }

    /// Create an account. Does not log in; see [`Self::register_and_login`].
    pub async fn register(&self, user: &NewUser) -> AuthOutcome<Value> {
        info!("Registration attempt for: {}", mask_email(&user.email));

        let response = match self.http.post(self.url(REGISTER_PATH)).json(user).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Registration error: {}", e);
                return AuthOutcome::Failure(ErrorBody::network_error());
            }
        };

        if !response.status().is_success() {
            return rejection("Registration", response).await;
        }

        match response.json::<Value>().await {
            Ok(body) => {
                info!("Registration successful for: {}", mask_email(&user.email));
                AuthOutcome::Success(body)
            }
            Err(e) => {
                error!("Registration error: unreadable response: {}", e);
                AuthOutcome::Failure(ErrorBody::network_error())
            }
        }
    }

    /// Register, then log in with the same credentials.
    pub async fn register_and_login(&self, user: &NewUser) -> AuthOutcome<LoginSuccess> {
        if let AuthOutcome::Failure(body) = self.register(user).await {
            return AuthOutcome::Failure(body);
        }
        self.login(&user.email, &user.password).await
    }

    pub async fn get_user_profile(&self) -> Result<UserProfile, ClientError> {
        let response = self.authorized(Method::GET, PROFILE_PATH, None).await?;
        if !response.status().is_success() {
            return Err(ClientError::OperationFailed(PROFILE_FETCH_FAILED.into()));
        }
        read_json(response).await
    }

    pub async fn update_user_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ClientError> {
        let body = encode(update)?;
        let response = self.authorized(Method::PUT, PROFILE_UPDATE_PATH, Some(body)).await?;
        if !response.status().is_success() {
            return Err(failure_with_message(response, PROFILE_UPDATE_FAILED).await);
        }
        read_json(response).await
    }

    pub async fn get_user_orders(&self) -> Result<Page<Order>, ClientError> {
        let response = self.authorized(Method::GET, ORDERS_PATH, None).await?;
        if !response.status().is_success() {
            return Err(ClientError::OperationFailed(ORDERS_FETCH_FAILED.into()));
        }
        read_json(response).await
    }

    pub async fn get_order(&self, id: i64) -> Result<Order, ClientError> {
        let path = format!("{}{}/", ORDERS_PATH, id);
        let response = self.authorized(Method::GET, &path, None).await?;
        if !response.status().is_success() {
            return Err(ClientError::OperationFailed(ORDER_FETCH_FAILED.into()));
        }
        read_json(response).await
    }

    /// Submit an order; the payload is passed through unvalidated and the
    /// created body comes back unmodified.
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ClientError> {
        let body = encode(order)?;
        let response = self.authorized(Method::POST, ORDERS_PATH, Some(body)).await?;
        if !response.status().is_success() {
            return Err(failure_with_message(response, ORDER_CREATE_FAILED).await);
        }
        let created: Order = read_json(response).await?;
        match created.id() {
            Some(id) => info!("Order {} created", id),
            None => info!("Order created"),
        }
        Ok(created)
    }

    /// Public tariff list. Failures are logged, then returned.
    pub async fn get_tariffs(&self) -> Result<Page<Tariff>, ClientError> {
        let result = self.fetch_public(TARIFFS_PATH, TARIFFS_FETCH_FAILED).await;
        if let Err(e) = &result {
            error!("Error fetching tariffs: {}", e);
        }
        result
    }

    pub async fn get_tariff(&self, id: i64) -> Result<Tariff, ClientError> {
        let path = format!("{}{}/", TARIFFS_PATH, id);
        let result = self.fetch_public(&path, TARIFF_FETCH_FAILED).await;
        if let Err(e) = &result {
            error!("Error fetching tariff {}: {}", id, e);
        }
        result
    }

    // --- Helpers ---

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn authorized(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Response, ClientError> {
        let options = RequestOptions {
            body,
            ..RequestOptions::default()
        };
        self.dispatcher.send(method, &self.url(path), options).await
    }

    async fn fetch_public<T: DeserializeOwned>(
        &self,
        path: &str,
        failure: &str,
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(network_failure)?;

        if !response.status().is_success() {
            return Err(ClientError::OperationFailed(failure.to_string()));
        }
        read_json(response).await
    }
}

fn encode<T: Serialize>(payload: &T) -> Result<Value, ClientError> {
    serde_json::to_value(payload)
        .map_err(|e| ClientError::OperationFailed(format!("Could not encode request: {}", e)))
}

async fn failure_with_message(response: Response, fallback: &str) -> ClientError {
    let status = response.status();
    let message = server_message(response)
        .await
        .unwrap_or_else(|| fallback.to_string());
    warn!("Request failed with status {}: {}", status, message);
    ClientError::OperationFailed(message)
}

/// Login/register rejection. The error body is kept verbatim; an unreadable
/// one counts as a network failure.
async fn rejection<T>(operation: &str, response: Response) -> AuthOutcome<T> {
    let status = response.status();
    match response.json::<Value>().await {
        Ok(body) => {
            warn!("{} rejected with status {}", operation, status);
            AuthOutcome::Failure(ErrorBody::new(body))
        }
        Err(e) => {
            error!("{} error: unreadable {} response: {}", operation, status, e);
            AuthOutcome::Failure(ErrorBody::network_error())
        }
    }
}

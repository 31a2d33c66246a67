//! Token-authenticated API client.
//!
//! [`ApiClient`] wraps a [`WebRequester`] and a cached bearer token behind a
//! `Mutex`, implementing the two-endpoint token handshake:
//!
//! - `POST <auth endpoint>` with `{username, password}` → `{token}`
//! - `POST <refresh endpoint>` with `{token}` → `{token}`
//!
//! Token lifecycle:
//! - Unset at construction; acquired lazily by the first resource call.
//! - Replaced wholesale on every successful authenticate/refresh
//!   (last-write-wins).
//! - Cleared when a resource call is classified as 401 Unauthorized — the
//!   error still propagates to the caller unchanged; clearing is
//!   bookkeeping so the *next* call re-authenticates. There is no retry
//!   within the failing call, and no proactive expiry tracking.

use reqwest::header::HeaderMap;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use crate::error::{ResponseError, Result, WebError};
use crate::request::{ApiRequest, WebRequester};

/// The endpoint paths an [`ApiClient`] talks to. The defaults match the
/// common DRF-style token layout; override per deployment with
/// [`ApiClient::with_endpoints`].
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Token acquisition endpoint, accepts `{username, password}`.
    pub auth: String,
    /// Token refresh endpoint, accepts `{token}`.
    pub refresh: String,
    /// Resource collection endpoint; ids or suffixes are appended directly.
    pub resource: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            auth: "/api/api-token-auth/".to_string(),
            refresh: "/api/api-token-refresh/".to_string(),
            resource: "/api/resource/".to_string(),
        }
    }
}

/// A simple client for a token-authenticated JSON API.
///
/// The token lives behind a `Mutex` because authenticate/refresh must
/// mutate it while resource methods only need `&self`. The lock is held
/// only to read or store the token, never across an HTTP round-trip.
#[derive(Debug)]
pub struct ApiClient {
    requester: WebRequester,
    endpoints: Endpoints,
    username: String,
    password: String,
    token: Mutex<Option<String>>,
}

impl ApiClient {
    /// Creates a client for the given base URL and credentials.
    ///
    /// The base URL is normalized by the underlying requester — a bare host
    /// like `"api.example.com"` becomes `"https://api.example.com"`. The
    /// connection context keeps session cookies, and the JSON default
    /// headers are installed.
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let requester = WebRequester::builder(base_url).use_session(true).build()?;
        Ok(Self::with_requester(requester, username, password))
    }

    /// Creates a client on top of a pre-configured requester (custom TLS,
    /// logging, or session settings). The JSON default headers are
    /// installed on the requester.
    pub fn with_requester(mut requester: WebRequester, username: &str, password: &str) -> Self {
        requester.set_default_headers(default_headers());
        ApiClient {
            requester,
            endpoints: Endpoints::default(),
            username: username.to_string(),
            password: password.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Replaces the endpoint paths for deployments that mount the token
    /// or resource routes elsewhere.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Seeds the token cache, bypassing the handshake. Used by tests and
    /// by callers that persist tokens across runs.
    pub fn with_token(self, token: &str) -> Self {
        ApiClient {
            token: Mutex::new(Some(token.to_string())),
            ..self
        }
    }

    /// The requester this client dispatches through.
    pub fn requester(&self) -> &WebRequester {
        &self.requester
    }

    /// The currently cached token, if any. Mostly useful to observe the
    /// lifecycle (e.g. that a 401 cleared it).
    pub async fn token(&self) -> Option<String> {
        self.token.lock().await.clone()
    }

    /// Obtains a token from the authentication endpoint using the stored
    /// credentials, caches it, and returns it.
    ///
    /// A handshake response without a `token` field fails with a protocol
    /// error; the cached token is left untouched in that case.
    pub async fn authenticate(&self) -> Result<String> {
        let body = json!({
            "username": self.username,
            "password": self.password,
        });
        self.obtain_token(&self.endpoints.auth, body).await
    }

    /// Exchanges the cached token for a fresh one at the refresh endpoint.
    ///
    /// Refreshing requires a cached token; call
    /// [`authenticate`](Self::authenticate) first otherwise. Refresh is
    /// never triggered automatically — expiry is only ever discovered
    /// reactively, via a 401 on a resource call.
    pub async fn refresh(&self) -> Result<String> {
        let current = self
            .token()
            .await
            .ok_or_else(|| WebError::Protocol("no cached token to refresh".to_string()))?;
        let body = json!({ "token": current });
        self.obtain_token(&self.endpoints.refresh, body).await
    }

    async fn obtain_token(&self, endpoint: &str, body: Value) -> Result<String> {
        let request = ApiRequest::post(endpoint).json(body);
        let response = self.requester.invoke_and_handle(&request).await?;
        let token = response
            .as_json()
            .and_then(|value| value.get("token"))
            .and_then(Value::as_str)
            .ok_or_else(|| WebError::Protocol("missing token in response".to_string()))?
            .to_string();
        *self.token.lock().await = Some(token.clone());
        Ok(token)
    }

    /// Gets all resources, or a specific one when `resource` names an id
    /// or URL suffix. `query` is appended as URL query parameters.
    ///
    /// Authenticates first if no token is cached, then attaches
    /// `Authorization: Bearer <token>`. When the response is classified as
    /// 401 Unauthorized the cached token is cleared (likely expired) before
    /// the error is re-raised — the caller sees the original error and the
    /// next call re-authenticates.
    pub async fn get_resource(&self, resource: &str, query: &[(&str, &str)]) -> Result<Value> {
        let token = self.bearer_token().await?;
        let endpoint = format!("{}{}", self.endpoints.resource, resource);
        let mut request =
            ApiRequest::get(endpoint).header("Authorization", format!("Bearer {token}"));
        for (key, value) in query {
            request = request.query(*key, *value);
        }

        match self.requester.invoke_and_handle(&request).await {
            Ok(body) => Ok(body.into_value()),
            Err(err) => {
                if matches!(
                    err,
                    WebError::Response(ResponseError::Unauthorized { .. })
                ) {
                    // Likely, the token has expired.
                    *self.token.lock().await = None;
                }
                Err(err)
            }
        }
    }

    /// Like [`get_resource`](Self::get_resource), but reshapes a list
    /// response into a map keyed by each item's `"key"` field, falling back
    /// to `"name"` — a lookup table for callers that need access by
    /// identifier.
    pub async fn get_resource_map(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<Map<String, Value>> {
        let response = self.get_resource(resource, query).await?;
        let items = response
            .as_array()
            .ok_or_else(|| WebError::Protocol("resource response is not a list".to_string()))?;

        let mut map = Map::new();
        for item in items {
            let key = item
                .get("key")
                .and_then(Value::as_str)
                .or_else(|| item.get("name").and_then(Value::as_str))
                .ok_or_else(|| {
                    WebError::Protocol(
                        "resource item has neither \"key\" nor \"name\"".to_string(),
                    )
                })?;
            map.insert(key.to_string(), item.clone());
        }
        Ok(map)
    }

    /// Returns the cached token, authenticating first when none is cached.
    async fn bearer_token(&self) -> Result<String> {
        let cached = self.token().await;
        match cached {
            Some(token) => Ok(token),
            None => self.authenticate().await,
        }
    }
}

/// Default headers for a JSON API client.
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Accept", "application/json".parse().expect("static header"));
    headers.insert(
        "Content-Type",
        "application/json".parse().expect("static header"),
    );
    headers.insert("Cache-Control", "no-cache".parse().expect("static header"));
    headers
}

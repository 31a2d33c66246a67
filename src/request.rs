//! Request dispatch and response classification for JSON web APIs.
//!
//! [`WebRequester`] is the building block for simple API clients: it owns a
//! `reqwest::Client` (the persistent connection context), a normalized base
//! URL, and a set of default headers, and exposes two levels of calling:
//!
//! - [`WebRequester::invoke`] — dispatch only. Joins the base URL and an
//!   endpoint, merges headers, sends, and returns the raw [`Outcome`]
//!   whatever the status code was.
//! - [`WebRequester::invoke_and_handle`] — dispatch plus classification.
//!   Success bodies are JSON-decoded (falling back to text for malformed
//!   payloads); error status codes become the matching
//!   [`ResponseError`](crate::error::ResponseError) variant.
//!
//! Transport failures surface as
//! [`WebError::Transport`](crate::error::WebError::Transport) and are never
//! retried — the caller decides what a failed call means.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{ResponseError, Result, WebError};
use crate::logging::{LogPolicy, RequestLogger};

/// Connect timeout: TCP + TLS handshake only.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout, covering the full round-trip including the
/// response body. Generous enough for slow API endpoints; not meant for
/// bulk downloads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Header used for token and Basic authorization unless overridden.
const AUTHORIZATION_HEADER: &str = "Authorization";

/// A described HTTP request: method, endpoint, and the optional per-call
/// extras.
///
/// The body is a single [`RequestBody`] slot, so a raw body and a JSON body
/// can never both be set — assigning one replaces the other.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
}

/// The request body: either a raw string passed through unchanged, or a
/// JSON value serialized on dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Pre-encoded body sent as-is.
    Raw(String),
    /// Structured body serialized as JSON.
    Json(Value),
}

impl ApiRequest {
    /// Creates a request for an arbitrary HTTP method.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        ApiRequest {
            method,
            endpoint: endpoint.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Creates a GET request.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    /// Creates a POST request.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    /// Creates a PUT request.
    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    /// Creates a DELETE request.
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Adds a per-call header. Per-call headers override default headers
    /// with the same name when the request is dispatched.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a URL query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a JSON body, replacing any previously set body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Sets a raw string body, replacing any previously set body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    /// The HTTP method of this request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The endpoint this request targets, relative to the base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The per-call headers added so far.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The query parameters added so far.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// The request body, if one was set.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}

/// A completed HTTP exchange, returned by [`WebRequester::invoke`] for any
/// status code.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// The response status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The raw response body.
    pub body: Bytes,
}

impl Outcome {
    /// The response body decoded as text (lossy for non-UTF-8 bytes).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A classified response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// No content — always the result for a 204 status.
    Empty,
    /// Successfully decoded JSON.
    Json(Value),
    /// Fallback when the payload was not valid JSON.
    Text(String),
    /// Undecoded content, produced by [`WebRequester::invoke_and_handle_raw`].
    Bytes(Bytes),
}

impl Body {
    /// Whether this body is the empty body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    /// The decoded JSON value, if this body decoded as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The textual form, if this body fell back to text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The raw bytes, if this body was left undecoded.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Body::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Converts into a JSON value: decoded JSON stays as-is, text and bytes
    /// become JSON strings, the empty body becomes `null`.
    pub fn into_value(self) -> Value {
        match self {
            Body::Empty => Value::Null,
            Body::Json(value) => value,
            Body::Text(text) => Value::String(text),
            Body::Bytes(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

/// The classified form of a completed exchange: status, headers, and body
/// together, for callers that need more than the body.
#[derive(Debug, Clone)]
pub struct Handled {
    /// The response status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The classified response body.
    pub body: Body,
}

/// Configures and builds a [`WebRequester`].
#[derive(Debug, Clone)]
pub struct WebRequesterBuilder {
    base_url: String,
    use_session: bool,
    verify_ssl_certs: bool,
    log_policy: LogPolicy,
}

impl WebRequesterBuilder {
    /// Keep cookies across calls on the persistent connection context.
    pub fn use_session(mut self, yes: bool) -> Self {
        self.use_session = yes;
        self
    }

    /// Validate server TLS certificates (on by default). Disabling is the
    /// explicit opt-in for self-signed certificates.
    pub fn verify_ssl_certs(mut self, yes: bool) -> Self {
        self.verify_ssl_certs = yes;
        self
    }

    /// Sets which parts of each exchange get logged.
    pub fn log_policy(mut self, policy: LogPolicy) -> Self {
        self.log_policy = policy;
        self
    }

    /// Builds the requester and its connection context.
    pub fn build(self) -> Result<WebRequester> {
        let (base_url, fqdn) = normalize_base_url(&self.base_url);
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(self.use_session)
            .danger_accept_invalid_certs(!self.verify_ssl_certs)
            .build()?;
        Ok(WebRequester {
            client,
            base_url,
            fqdn,
            default_headers: HeaderMap::new(),
            logger: RequestLogger::new(self.log_policy),
        })
    }
}

/// A general helper for building simple web API clients.
///
/// Owns the base URL, the default header set, and the connection context.
/// The context is released when the requester is dropped; there is no
/// explicit close.
#[derive(Debug)]
pub struct WebRequester {
    client: Client,
    base_url: String,
    fqdn: String,
    default_headers: HeaderMap,
    logger: RequestLogger,
}

impl WebRequester {
    /// Starts building a requester for the given base URL.
    ///
    /// The base URL is normalized: a trailing slash is stripped, and
    /// `https://` is prepended when no scheme is present.
    pub fn builder(base_url: &str) -> WebRequesterBuilder {
        WebRequesterBuilder {
            base_url: base_url.to_string(),
            use_session: false,
            verify_ssl_certs: true,
            log_policy: LogPolicy::default(),
        }
    }

    /// Builds a requester with default settings (no session cookies, TLS
    /// validation on, logging off).
    pub fn new(base_url: &str) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// The normalized base URL every endpoint is joined onto.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The host part of the base URL, without scheme or a leading `www.`.
    pub fn fqdn(&self) -> &str {
        &self.fqdn
    }

    /// Replaces the default headers sent with every request.
    pub fn set_default_headers(&mut self, headers: HeaderMap) {
        self.default_headers = headers;
    }

    /// Inserts (or replaces) a single default header.
    pub fn insert_default_header(&mut self, name: &str, value: &str) -> Result<()> {
        let (name, value) = encode_header(name, value)?;
        self.default_headers.insert(name, value);
        Ok(())
    }

    /// Attaches a token to every subsequent request via the given header
    /// (default `Authorization`). The value is sent verbatim — include the
    /// scheme prefix (e.g. `"Bearer ..."`) if the API expects one.
    pub fn set_token_auth(&mut self, token: &str, header: Option<&str>) -> Result<()> {
        self.insert_default_header(header.unwrap_or(AUTHORIZATION_HEADER), token)
    }

    /// Attaches HTTP Basic credentials to every subsequent request.
    pub fn set_basic_auth(&mut self, username: &str, password: &str) -> Result<()> {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        self.insert_default_header(AUTHORIZATION_HEADER, &format!("Basic {encoded}"))
    }

    /// Dispatches a request and returns the raw outcome for any status.
    ///
    /// The endpoint is joined onto the base URL with exactly one separating
    /// slash regardless of which side supplies it. Default headers are
    /// merged first, then per-call headers override per key.
    ///
    /// Transport failures (DNS, connection refused, timeout) surface as
    /// [`WebError::Transport`] and are not retried.
    pub async fn invoke(&self, request: &ApiRequest) -> Result<Outcome> {
        let url = self.join_url(request.endpoint());
        let headers = self.merge_headers(request)?;
        self.logger
            .request(request.method(), &url, &headers, request.body());

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .headers(headers);
        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        builder = match request.body() {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Raw(text)) => builder.body(text.clone()),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        let outcome = Outcome {
            status,
            headers,
            body,
        };
        self.logger.response(&outcome);
        Ok(outcome)
    }

    /// Dispatches a request and classifies the response.
    ///
    /// Success bodies are JSON-decoded, falling back to text when the
    /// payload is malformed; a 204 status always yields [`Body::Empty`].
    /// Error status codes return the matching [`ResponseError`] variant —
    /// this path never produces a value.
    pub async fn invoke_and_handle(&self, request: &ApiRequest) -> Result<Body> {
        let handled = self.dispatch(request, true).await?;
        Ok(handled.body)
    }

    /// Like [`invoke_and_handle`](Self::invoke_and_handle), but leaves the
    /// success body undecoded (for XML, binary, and other non-JSON
    /// payloads). A 204 status still yields [`Body::Empty`].
    pub async fn invoke_and_handle_raw(&self, request: &ApiRequest) -> Result<Body> {
        let handled = self.dispatch(request, false).await?;
        Ok(handled.body)
    }

    /// Like [`invoke_and_handle`](Self::invoke_and_handle), but returns the
    /// status and headers alongside the classified body.
    pub async fn invoke_and_handle_full(&self, request: &ApiRequest) -> Result<Handled> {
        self.dispatch(request, true).await
    }

    async fn dispatch(&self, request: &ApiRequest, decode: bool) -> Result<Handled> {
        let outcome = self.invoke(request).await?;
        classify(outcome, decode)
    }

    fn join_url(&self, endpoint: &str) -> String {
        // base_url never ends in a slash (normalized at construction), so
        // the endpoint's leading slash decides whether one is inserted.
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    fn merge_headers(&self, request: &ApiRequest) -> Result<HeaderMap> {
        let mut merged = self.default_headers.clone();
        for (name, value) in request.headers() {
            let (name, value) = encode_header(name, value)?;
            merged.insert(name, value);
        }
        Ok(merged)
    }
}

/// Classifies a completed exchange per the response's status code.
fn classify(outcome: Outcome, decode: bool) -> Result<Handled> {
    let Outcome {
        status,
        headers,
        body,
    } = outcome;

    if status.as_u16() < 400 {
        let body = if status == StatusCode::NO_CONTENT {
            Body::Empty
        } else if decode {
            match serde_json::from_slice::<Value>(&body) {
                Ok(value) => Body::Json(value),
                Err(_) => Body::Text(String::from_utf8_lossy(&body).into_owned()),
            }
        } else {
            Body::Bytes(body)
        };
        Ok(Handled {
            status,
            headers,
            body,
        })
    } else {
        let text = String::from_utf8_lossy(&body).into_owned();
        Err(ResponseError::from_status(status, text).into())
    }
}

fn encode_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|err| WebError::Protocol(format!("invalid header name {name:?}: {err}")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|err| WebError::Protocol(format!("invalid value for header {name:?}: {err}")))?;
    Ok((header_name, header_value))
}

/// Strips a trailing slash, prepends `https://` when no scheme is present,
/// and derives the FQDN (host without scheme or a leading `www.`).
fn normalize_base_url(raw: &str) -> (String, String) {
    let trimmed = raw.strip_suffix('/').unwrap_or(raw);
    let (has_scheme, rest) = if let Some(rest) = trimmed.strip_prefix("https://") {
        (true, rest)
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        (true, rest)
    } else {
        (false, trimmed)
    };
    let fqdn = if has_scheme {
        rest.strip_prefix("www.").unwrap_or(rest)
    } else {
        rest
    };
    let base_url = if has_scheme {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    (base_url, fqdn.to_string())
}

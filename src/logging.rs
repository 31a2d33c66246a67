//! Policy-gated request/response logging.
//!
//! The library never chooses a log sink — events are emitted through
//! `tracing` and whoever owns the process installs a subscriber (stderr,
//! file, or nothing). What this module decides is *what* gets emitted:
//! request/response lines are off by default, and headers and bodies are
//! gated separately because they routinely contain credentials and tokens.

use reqwest::header::HeaderMap;
use reqwest::Method;

use crate::request::{Outcome, RequestBody};

/// Which parts of an HTTP exchange get logged.
///
/// All fields default to `false`. Enabling `headers` or `bodies` without
/// `requests` has no effect — they refine the request/response lines, they
/// don't replace them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPolicy {
    /// Log one line per request (method + URL) and per response (status).
    pub requests: bool,
    /// Also log request and response headers. Headers frequently carry
    /// authorization values — leave off unless debugging locally.
    pub headers: bool,
    /// Also log request and response bodies. Same caution as `headers`.
    pub bodies: bool,
}

/// Emits pre-call and post-call log lines according to a [`LogPolicy`].
#[derive(Debug)]
pub(crate) struct RequestLogger {
    policy: LogPolicy,
}

impl RequestLogger {
    pub(crate) fn new(policy: LogPolicy) -> Self {
        RequestLogger { policy }
    }

    /// Pre-call line: method and full URL, plus headers/body per policy.
    pub(crate) fn request(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&RequestBody>,
    ) {
        if !self.policy.requests {
            return;
        }
        tracing::debug!("Invoking {method} {url}");
        if self.policy.headers {
            tracing::debug!("Request headers: {headers:?}");
        }
        if self.policy.bodies {
            match body {
                Some(RequestBody::Raw(text)) => tracing::debug!("Request body: {text}"),
                Some(RequestBody::Json(value)) => tracing::debug!("Request body: {value}"),
                None => {}
            }
        }
    }

    /// Post-call line: status code, plus headers/body per policy.
    pub(crate) fn response(&self, outcome: &Outcome) {
        if !self.policy.requests {
            return;
        }
        tracing::debug!("Response status code: {}", outcome.status.as_u16());
        if self.policy.headers {
            tracing::debug!("Response headers: {:?}", outcome.headers);
        }
        if self.policy.bodies && !outcome.body.is_empty() {
            tracing::debug!("Response body: {}", outcome.text());
        }
    }
}

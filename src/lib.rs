//! Reusable helpers for bootstrapping small automation scripts and simple
//! API clients.
//!
//! The core is a thin HTTP layer — request dispatch, response
//! classification into a per-status-code error taxonomy, and a
//! token-authenticated client with a reactive token lifecycle — plus the
//! small collaborators such scripts need: config loading, file helpers,
//! child-process execution, and PowerShell invocation.
//!
//! # Modules
//!
//! - [`client`] — Token-authenticated API client (`ApiClient`).
//! - [`config`] — TOML script config and base-URL templating.
//! - [`error`] — Typed error hierarchy (`WebError`, `ResponseError`).
//! - [`fileio`] — Plain/Base64/CSV reads, plain writes.
//! - [`logging`] — Policy-gated request/response logging.
//! - [`powershell`] — Cross-platform PowerShell script invocation.
//! - [`process`] — Child-process execution wrapper.
//! - [`request`] — Request dispatcher and response classifier
//!   (`WebRequester`).
//!
//! # Quick Start
//!
//! ```ignore
//! use webreq::client::ApiClient;
//!
//! let client = ApiClient::new("api.example.com", "user", "secret")?;
//! // First call authenticates lazily, then attaches the bearer token.
//! let resources = client.get_resource("", &[]).await?;
//! let by_key = client.get_resource_map("", &[("expand", "full")]).await?;
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod fileio;
pub mod logging;
pub mod powershell;
pub mod process;
pub mod request;

//! Network transport abstraction
//!
//! This module defines the [`NetworkAgent`] trait that the token authority
//! and every endpoint wrapper send requests through, together with the
//! request and response values that cross it. Concrete implementations
//! live in submodules:
//!
//! - [`http::HttpNetworkAgent`] -- reqwest-backed agent that runs each
//!   request on the tokio runtime.
//! - `fake::FakeNetworkAgent` -- in-process fake used in unit tests
//!   (cfg(test) only).
//!
//! # Contract
//!
//! `send` must not block and must invoke its completion exactly once. A
//! response that was received is always delivered as `Ok(RawResponse)`,
//! whatever its status; classifying the status is the job of
//! [`crate::response`]. Only failures to obtain a response at all are
//! reported as [`SdkError::Network`](crate::error::SdkError::Network).

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use reqwest::Method;
use url::Url;

use crate::callback::Callback;
use crate::error::{Result, SdkError};

/// Sends requests to the API and reports raw results.
///
/// Used polymorphically through `Arc<dyn NetworkAgent>`.
pub trait NetworkAgent: Send + Sync + std::fmt::Debug {
    /// Send `request` and invoke `completion` once with the outcome.
    fn send(&self, request: ApiRequest, completion: Callback<RawResponse>);
}

/// A request with an `application/x-www-form-urlencoded` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute request URL
    pub url: Url,
    /// Form fields, sent url-encoded
    pub form: BTreeMap<String, String>,
}

impl ApiRequest {
    /// Builds a `POST` request carrying `form` as its body.
    pub fn post_form(url: Url, form: BTreeMap<String, String>) -> Self {
        Self {
            method: Method::POST,
            url,
            form,
        }
    }

    /// Returns the url-encoded body.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Custom`] if the form cannot be encoded.
    pub fn encoded_form(&self) -> Result<String> {
        serde_urlencoded::to_string(&self.form)
            .map_err(|e| SdkError::Custom(format!("failed to encode form body: {e}")))
    }
}

/// The raw outcome of a request that reached the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lowercased
    pub headers: HashMap<String, String>,
    /// Response body; `None` when the server sent nothing
    pub body: Option<Bytes>,
}

impl RawResponse {
    /// Creates a response with a status and an optional body.
    pub fn new(status: u16, body: Option<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// Creates a response whose body is the serialized `value`.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, Some(Bytes::from(value.to_string())))
    }

    /// Returns `true` for statuses in `200..=299`.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> Option<Cow<'_, str>> {
        self.body.as_deref().map(String::from_utf8_lossy)
    }

    /// Returns the body length in bytes (0 when absent).
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Bytes::len)
    }
}

pub mod http;

#[cfg(test)]
pub mod fake;

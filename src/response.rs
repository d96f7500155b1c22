//! Response decoding pipeline
//!
//! Each function here wraps a typed continuation and returns an adapter
//! continuation that can be handed straight to a
//! [`NetworkAgent`](crate::transport::NetworkAgent). The adapter checks
//! that the status is in `200..=299`, decodes the body, and forwards one
//! `Result<T>` to the wrapped continuation.
//!
//! Adapters hold no state between calls. The same raw result always gets
//! the same classification. A non-2xx status is always a failure, even
//! when its body would decode.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::callback::{Callback, CompletionLatch};
use crate::dispatch::Dispatcher;
use crate::error::{DecodeError, Result, SdkError};
use crate::transport::RawResponse;

/// One-item collection envelope returned by some endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryContainer<T> {
    /// Collection entries
    pub entries: Vec<T>,
}

/// Decodes a successful body into `T`.
///
/// Transport failures are forwarded unchanged. A missing body gives
/// [`SdkError::EmptyBody`]. A body that does not match `T` gives
/// [`SdkError::Decode`], with the offending key and path when they are
/// known.
pub fn decode_model<T>(completion: Callback<T>) -> Callback<RawResponse>
where
    T: DeserializeOwned + Send + 'static,
{
    Box::new(move |result| {
        completion(result.and_then(ensure_success).and_then(|r| decode_body(&r)));
    })
}

/// Maps any successful response to `()`, ignoring the body.
pub fn decode_void(completion: Callback<()>) -> Callback<RawResponse> {
    Box::new(move |result| {
        completion(result.and_then(ensure_success).map(|_| ()));
    })
}

/// Decodes an `{"entries": [T]}` envelope and yields its first entry.
///
/// An empty `entries` array is a type mismatch tagged `"entries"`, not an
/// empty-body error.
pub fn unwrap_singleton<T>(completion: Callback<T>) -> Callback<RawResponse>
where
    T: DeserializeOwned + Send + 'static,
{
    Box::new(move |result| {
        let entry = result
            .and_then(ensure_success)
            .and_then(|r| decode_body::<EntryContainer<T>>(&r))
            .and_then(|container| {
                container
                    .entries
                    .into_iter()
                    .next()
                    .ok_or_else(|| DecodeError::type_mismatch("entries").into())
            });
        completion(entry);
    })
}

/// Decodes token-endpoint style responses with extra tolerance and logging.
///
/// A body that is a JSON object is decoded directly. A body that is a JSON
/// string holding an encoded object (a pre-serialized payload) is
/// unwrapped first. When neither works, a path-tracking decode runs. It
/// produces the error reported to the caller. Every path completes
/// through a [`CompletionLatch`], so `completion` runs exactly once, on
/// `dispatcher`.
pub fn decode_with_diagnostics<T>(
    completion: Callback<T>,
    dispatcher: Arc<dyn Dispatcher>,
) -> Callback<RawResponse>
where
    T: DeserializeOwned + Send + 'static,
{
    let latch = CompletionLatch::new(completion, dispatcher);
    Box::new(move |result| {
        let response = match result.and_then(ensure_success) {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "request failed before decoding");
                latch.complete(Err(err));
                return;
            }
        };

        tracing::debug!(
            status = response.status,
            body_len = response.body_len(),
            "decoding response"
        );

        if let Some(value) = decode_structured::<T>(&response) {
            latch.complete(Ok(value));
        }

        if !latch.is_completed() {
            let fallback = match encoded_payload(&response) {
                Some(inner) => decode_slice::<T>(inner.as_bytes()),
                None => decode_body::<T>(&response),
            };
            if let Err(ref err) = fallback {
                tracing::debug!(error = %err, "response did not match expected shape");
                tracing::trace!(body = ?response.body_text(), "undecodable response body");
            }
            latch.complete(fallback);
        }
    })
}

/// Fails with [`SdkError::HttpStatus`] unless the status is 2xx.
///
/// # Errors
///
/// Returns [`SdkError::HttpStatus`] carrying the status code and the raw
/// body for any status outside `200..=299`.
pub fn ensure_success(response: RawResponse) -> Result<RawResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(SdkError::HttpStatus {
            status: response.status,
            body: response.body_text().map(|b| b.into_owned()),
        })
    }
}

/// Path-tracking decode of the response body.
fn decode_body<T: DeserializeOwned>(response: &RawResponse) -> Result<T> {
    match response.body.as_deref() {
        Some(body) if !body.is_empty() => decode_slice(body),
        _ => Err(SdkError::EmptyBody),
    }
}

/// Decodes exactly one JSON document; trailing bytes are malformed.
fn decode_slice<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let mut de = serde_json::Deserializer::from_slice(body);
    let value = serde_path_to_error::deserialize(&mut de)
        .map_err(|e| SdkError::Decode(DecodeError::from_path_error(e)))?;
    de.end()
        .map_err(|e| SdkError::Decode(DecodeError::from_json_error(&e)))?;
    Ok(value)
}

/// Returns the inner document of a body that is a JSON string holding an
/// encoded object.
fn encoded_payload(response: &RawResponse) -> Option<String> {
    let body = response.body.as_deref()?;
    match serde_json::from_slice::<serde_json::Value>(body).ok()? {
        serde_json::Value::String(encoded)
            if serde_json::from_str::<serde_json::Value>(&encoded)
                .map(|v| v.is_object())
                .unwrap_or(false) =>
        {
            Some(encoded)
        }
        _ => None,
    }
}

/// Lenient decode that accepts an object or a string-encoded object.
fn decode_structured<T: DeserializeOwned>(response: &RawResponse) -> Option<T> {
    let value = match encoded_payload(response) {
        Some(inner) => serde_json::from_str::<serde_json::Value>(&inner).ok()?,
        None => serde_json::from_slice::<serde_json::Value>(response.body.as_deref()?).ok()?,
    };
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

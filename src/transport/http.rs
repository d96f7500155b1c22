//! reqwest-backed network agent
//!
//! [`HttpNetworkAgent`] posts url-encoded form bodies with a shared
//! [`reqwest::Client`] and reports the raw outcome through the completion.
//! Each request runs as its own task on the tokio runtime captured at
//! construction, so [`send`](NetworkAgent::send) returns immediately.
//!
//! No retries are attempted here or anywhere else in the crate. Retry
//! policy belongs to an outer caller.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tokio::runtime::Handle;

use crate::callback::Callback;
use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use crate::transport::{ApiRequest, NetworkAgent, RawResponse};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Network agent that performs real HTTP requests.
///
/// # Examples
///
/// ```no_run
/// use boxauth::config::SdkConfig;
/// use boxauth::transport::http::HttpNetworkAgent;
///
/// # #[tokio::main]
/// # async fn main() -> boxauth::error::Result<()> {
/// let config = SdkConfig::new("client-id", "client-secret");
/// let agent = HttpNetworkAgent::new(&config)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpNetworkAgent {
    http_client: Arc<reqwest::Client>,
    runtime: Handle,
}

impl HttpNetworkAgent {
    /// Creates an agent using the timeout from `config`.
    ///
    /// Must be called from within a tokio runtime; requests are spawned on
    /// that runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`] when there is no current tokio runtime
    /// and [`SdkError::Custom`] if the HTTP client cannot be built.
    pub fn new(config: &SdkConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("boxauth/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SdkError::Custom(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(Arc::new(http_client))
    }

    /// Creates an agent around an existing client.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`] when there is no current tokio runtime.
    pub fn with_client(http_client: Arc<reqwest::Client>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            SdkError::Config(format!("HttpNetworkAgent requires a tokio runtime: {e}"))
        })?;
        Ok(Self {
            http_client,
            runtime,
        })
    }

    async fn execute(http_client: &reqwest::Client, request: ApiRequest) -> Result<RawResponse> {
        let body = request.encoded_form()?;
        let resp = http_client
            .request(request.method.clone(), request.url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| network_error(&request, &e))?;

        let status = resp.status().as_u16();
        let headers: HashMap<String, String> = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| network_error(&request, &e))?;
        let body = (!bytes.is_empty()).then_some(bytes);

        tracing::debug!(
            url = %request.url,
            status,
            body_len = body.as_ref().map_or(0, |b| b.len()),
            "received response"
        );

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

impl NetworkAgent for HttpNetworkAgent {
    fn send(&self, request: ApiRequest, completion: Callback<RawResponse>) {
        let http_client = Arc::clone(&self.http_client);
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        self.runtime.spawn(async move {
            let result = Self::execute(&http_client, request).await;
            completion(result);
        });
    }
}

fn network_error(request: &ApiRequest, err: &reqwest::Error) -> SdkError {
    let cause = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    tracing::warn!(url = %request.url, error = %err, "{cause}");
    SdkError::Network(format!("{cause}: {err}"))
}

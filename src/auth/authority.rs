//! Token authority: grant exchange, refresh, revoke and downscope
//!
//! [`TokenAuthority`] builds authorization-server requests, sends them
//! through the [`NetworkAgent`] and decodes the replies with
//! [`crate::response`]. It holds references to its collaborators but no
//! mutable state. Each call builds its own request and its own completion
//! latch, so concurrent calls are independent.
//!
//! # Completion discipline
//!
//! Every operation invokes its continuation exactly once, through the
//! authority's [`Dispatcher`]. Transport failures arrive as
//! [`SdkError::Network`](crate::error::SdkError::Network). Non-2xx replies
//! arrive as [`SdkError::HttpStatus`](crate::error::SdkError::HttpStatus).
//! Nothing is retried.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::auth::grant::{DownscopeRequest, Grant, Revocation, REVOKE_ENDPOINT, TOKEN_ENDPOINT};
use crate::auth::scope::ScopeSet;
use crate::auth::token::Token;
use crate::callback::{Callback, CompletionLatch};
use crate::config::SdkConfig;
use crate::dispatch::Dispatcher;
use crate::response;
use crate::transport::{ApiRequest, NetworkAgent};

/// Continuation receiving a [`Token`].
pub type TokenCallback = Callback<Token>;

/// Issues token requests against the authorization server.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use boxauth::auth::TokenAuthority;
/// use boxauth::callback::await_completion;
/// use boxauth::config::SdkConfig;
/// use boxauth::dispatch::InlineDispatcher;
/// use boxauth::transport::http::HttpNetworkAgent;
///
/// # #[tokio::main]
/// # async fn main() -> boxauth::error::Result<()> {
/// let config = Arc::new(SdkConfig::new("client-id", "client-secret"));
/// let network = Arc::new(HttpNetworkAgent::new(&config)?);
/// let authority = TokenAuthority::new(network, config, Arc::new(InlineDispatcher));
///
/// let token = await_completion(|done| authority.refresh("refresh-token", done)).await?;
/// println!("expires in {}s", token.expires_in);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenAuthority {
    network: Arc<dyn NetworkAgent>,
    config: Arc<SdkConfig>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl TokenAuthority {
    /// Creates an authority over the given collaborators.
    ///
    /// # Arguments
    ///
    /// * `network` - Transport used for every request.
    /// * `config` - Client credentials and API host.
    /// * `dispatcher` - Context on which continuations are invoked.
    pub fn new(
        network: Arc<dyn NetworkAgent>,
        config: Arc<SdkConfig>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            network,
            config,
            dispatcher,
        }
    }

    /// Returns the configuration this authority was built with.
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Exchanges an authorization code for a token.
    pub fn exchange_authorization_code(&self, code: &str, completion: TokenCallback) {
        self.request_token(
            Grant::AuthorizationCode {
                code: code.to_string(),
            },
            completion,
        );
    }

    /// Exchanges a refresh token for a new token.
    ///
    /// The server usually invalidates `refresh_token` once it is used.
    /// Concurrent refreshes race at the server; nothing here serializes
    /// them.
    pub fn refresh(&self, refresh_token: &str, completion: TokenCallback) {
        self.request_token(
            Grant::RefreshToken {
                refresh_token: refresh_token.to_string(),
            },
            completion,
        );
    }

    /// Revokes an access or refresh token.
    ///
    /// Any 2xx reply counts as success whatever its body, so revoking a
    /// token that was already revoked also succeeds.
    pub fn revoke(&self, token: &str, completion: Callback<()>) {
        let latch = CompletionLatch::new(completion, Arc::clone(&self.dispatcher));

        let url = match self.config.endpoint(REVOKE_ENDPOINT) {
            Ok(url) => url,
            Err(err) => {
                latch.complete(Err(err));
                return;
            }
        };
        let form = Revocation {
            token: token.to_string(),
        }
        .form(&self.config);

        tracing::debug!(url = %url, "revoking token");
        self.network.send(
            ApiRequest::post_form(url, form),
            response::decode_void(latch.into_callback()),
        );
    }

    /// Exchanges a fully-scoped token for one limited to `scopes`.
    ///
    /// `resource` and `shared_link` are sent only when provided.
    ///
    /// # Arguments
    ///
    /// * `parent_token` - Fully-scoped access token.
    /// * `scopes` - Scopes to apply to the new token.
    /// * `resource` - Full API URL of the item the token is for.
    /// * `shared_link` - Shared link to bind the token to.
    /// * `completion` - Receives the downscoped token or an error.
    pub fn downscope(
        &self,
        parent_token: &str,
        scopes: &ScopeSet,
        resource: Option<&str>,
        shared_link: Option<&str>,
        completion: TokenCallback,
    ) {
        self.request_token(
            Grant::TokenExchange(DownscopeRequest {
                subject_token: parent_token.to_string(),
                scopes: scopes.clone(),
                resource: resource.map(str::to_string),
                shared_link: shared_link.map(str::to_string),
            }),
            completion,
        );
    }

    /// Sends `grant` to the token endpoint and decodes the reply.
    pub(crate) fn request_token(&self, grant: Grant, completion: TokenCallback) {
        let form = grant.form(&self.config);
        self.post_token_form(grant.grant_type(), form, completion);
    }

    fn post_token_form(
        &self,
        grant_type: &str,
        form: BTreeMap<String, String>,
        completion: TokenCallback,
    ) {
        let url = match self.config.endpoint(TOKEN_ENDPOINT) {
            Ok(url) => url,
            Err(err) => {
                CompletionLatch::new(completion, Arc::clone(&self.dispatcher)).complete(Err(err));
                return;
            }
        };

        tracing::debug!(grant_type, url = %url, "requesting token");
        self.network.send(
            ApiRequest::post_form(url, form),
            response::decode_with_diagnostics(completion, Arc::clone(&self.dispatcher)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::grant::ConnectionIdentity;
    use crate::auth::scope::TokenScope;
    use crate::dispatch::{InlineDispatcher, MainQueue};
    use crate::error::{Result, SdkError};
    use crate::transport::fake::FakeNetworkAgent;
    use crate::transport::RawResponse;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn token_body() -> serde_json::Value {
        json!({
            "access_token": "T9cE5asGnuyYCCqIZFoWjFHvNbvVqHjl",
            "refresh_token": "J7rxTiWOHMoSC1isKZKBZWizoRXjkQzig5C6jFgCVJ9bUnsUfGMinKBDLZWP9BgR",
            "expires_in": 3600,
            "token_type": "bearer"
        })
    }

    fn authority(network: Arc<FakeNetworkAgent>) -> TokenAuthority {
        TokenAuthority::new(
            network,
            Arc::new(SdkConfig::new("client-id", "client-secret")),
            Arc::new(InlineDispatcher),
        )
    }

    /// Captures every result delivered to a continuation.
    fn capture<T: Send + 'static>() -> (Callback<T>, Arc<Mutex<Vec<Result<T>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: Callback<T> = Box::new(move |r: Result<T>| sink.lock().unwrap().push(r));
        (callback, seen)
    }

    #[test]
    fn test_refresh_round_trips_token_fields() {
        let network = Arc::new(FakeNetworkAgent::new().reply_json(200, token_body()));
        let (callback, seen) = capture();

        authority(Arc::clone(&network)).refresh("old-refresh", callback);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let token = seen[0].as_ref().unwrap();
        assert_eq!(token.access_token, "T9cE5asGnuyYCCqIZFoWjFHvNbvVqHjl");
        assert_eq!(
            token.refresh_token.as_deref(),
            Some("J7rxTiWOHMoSC1isKZKBZWizoRXjkQzig5C6jFgCVJ9bUnsUfGMinKBDLZWP9BgR")
        );
        assert_eq!(token.expires_in, 3600);
        assert_eq!(token.token_type, "bearer");

        let request = network.only_request();
        assert_eq!(request.url.as_str(), "https://api.box.com/oauth2/token");
        assert_eq!(request.form["grant_type"], "refresh_token");
        assert_eq!(request.form["refresh_token"], "old-refresh");
        assert_eq!(request.form["client_id"], "client-id");
        assert_eq!(request.form["client_secret"], "client-secret");
    }

    #[test]
    fn test_exchange_authorization_code_sends_code() {
        let network = Arc::new(FakeNetworkAgent::new().reply_json(200, token_body()));
        let (callback, seen) = capture();

        authority(Arc::clone(&network)).exchange_authorization_code("auth-code", callback);

        assert!(seen.lock().unwrap()[0].is_ok());
        let request = network.only_request();
        assert_eq!(request.form["grant_type"], "authorization_code");
        assert_eq!(request.form["code"], "auth-code");
    }

    #[test]
    fn test_revoke_success_ignores_body() {
        let network = Arc::new(
            FakeNetworkAgent::new().reply(Ok(RawResponse::new(200, Some("not json".into())))),
        );
        let (callback, seen) = capture();

        authority(Arc::clone(&network)).revoke("access", callback);

        assert_eq!(*seen.lock().unwrap(), vec![Ok(())]);
        let request = network.only_request();
        assert_eq!(request.url.as_str(), "https://api.box.com/oauth2/revoke");
        assert_eq!(request.form["token"], "access");
        assert!(!request.form.contains_key("grant_type"));
    }

    #[test]
    fn test_downscope_omits_absent_optionals() {
        let network = Arc::new(FakeNetworkAgent::new().reply_json(200, token_body()));
        let (callback, _seen) = capture();
        let scopes: ScopeSet = [TokenScope::ItemPreview, TokenScope::ItemUpload]
            .into_iter()
            .collect();

        authority(Arc::clone(&network)).downscope("parent", &scopes, None, Some("abc"), callback);

        let request = network.only_request();
        assert_eq!(request.form["box_shared_link"], "abc");
        assert!(!request.form.contains_key("resource"));
        assert!(!request.form.contains_key("client_secret"));
        assert_eq!(request.form["subject_token"], "parent");
    }

    /// Runs every token operation once against `network`.
    ///
    /// Returns the token results (exchange, refresh, downscope, client
    /// credentials) followed by the revoke result.
    fn run_every_operation(network: Arc<FakeNetworkAgent>) -> (Vec<Result<Token>>, Result<()>) {
        let authority = authority(network);
        let scopes: ScopeSet = [TokenScope::ItemPreview].into_iter().collect();
        let (exchange, seen_exchange) = capture::<Token>();
        let (refresh, seen_refresh) = capture::<Token>();
        let (downscope, seen_downscope) = capture::<Token>();
        let (ccg, seen_ccg) = capture::<Token>();
        let (revoke, seen_revoke) = capture::<()>();

        authority.exchange_authorization_code("c", exchange);
        authority.refresh("r", refresh);
        authority.downscope("p", &scopes, Some("res"), Some("link"), downscope);
        authority.client_credentials_token(&ConnectionIdentity::User("7".to_string()), ccg);
        authority.revoke("t", revoke);

        let single = |seen: Arc<Mutex<Vec<Result<Token>>>>| {
            let mut seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 1, "continuation must run exactly once");
            seen.remove(0)
        };
        let tokens = vec![
            single(seen_exchange),
            single(seen_refresh),
            single(seen_downscope),
            single(seen_ccg),
        ];
        let mut revoked = seen_revoke.lock().unwrap();
        assert_eq!(revoked.len(), 1, "continuation must run exactly once");
        (tokens, revoked.remove(0))
    }

    #[test]
    fn test_transport_failure_is_forwarded_for_every_operation() {
        let mut network = FakeNetworkAgent::new();
        for _ in 0..5 {
            network = network.reply(Err(SdkError::Network("request timed out".to_string())));
        }

        let (tokens, revoked) = run_every_operation(Arc::new(network));

        for result in tokens {
            assert_eq!(result, Err(SdkError::Network("request timed out".to_string())));
        }
        assert_eq!(revoked, Err(SdkError::Network("request timed out".to_string())));
    }

    #[test]
    fn test_http_status_failures_carry_status() {
        for status in [401_u16, 403, 500] {
            let mut network = FakeNetworkAgent::new();
            for _ in 0..5 {
                network = network.reply_json(status, json!({"error": "invalid_grant"}));
            }

            let (tokens, revoked) = run_every_operation(Arc::new(network));

            for result in tokens {
                match result {
                    Err(SdkError::HttpStatus { status: got, body }) => {
                        assert_eq!(got, status);
                        assert!(body.unwrap_or_default().contains("invalid_grant"));
                    }
                    other => panic!("unexpected result for {status}: {other:?}"),
                }
            }
            assert_eq!(revoked.unwrap_err().status(), Some(status));
        }
    }

    #[test]
    fn test_decode_failure_is_reported() {
        let network = Arc::new(
            FakeNetworkAgent::new().reply_json(200, json!({"access_token": "a", "token_type": "bearer"})),
        );
        let (callback, seen) = capture();

        authority(network).refresh("r", callback);

        let seen = seen.lock().unwrap();
        match &seen[0] {
            Err(SdkError::Decode(decode)) => assert_eq!(decode.key.as_deref(), Some("expires_in")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_base_url_completes_with_config_error() {
        let network = Arc::new(FakeNetworkAgent::new());
        let authority = TokenAuthority::new(
            Arc::clone(&network) as Arc<dyn NetworkAgent>,
            Arc::new(SdkConfig::new("id", "secret").with_api_base_url("::nope")),
            Arc::new(InlineDispatcher),
        );
        let (callback, seen) = capture::<Token>();

        authority.refresh("r", callback);

        assert!(matches!(seen.lock().unwrap()[0], Err(SdkError::Config(_))));
        assert!(network.sent().is_empty());
    }

    #[test]
    fn test_background_completion_lands_on_main_queue_once() {
        let network = Arc::new(FakeNetworkAgent::background().reply_json(200, token_body()));
        let (dispatcher, mut queue) = MainQueue::new();
        let authority = TokenAuthority::new(
            network,
            Arc::new(SdkConfig::new("id", "secret")),
            Arc::new(dispatcher),
        );
        let hits = Arc::new(AtomicUsize::new(0));
        let thread = Arc::new(Mutex::new(None));
        let (counter, slot) = (Arc::clone(&hits), Arc::clone(&thread));

        authority.refresh(
            "r",
            Box::new(move |r| {
                assert!(r.is_ok());
                *slot.lock().unwrap() = Some(std::thread::current().id());
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while hits.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            queue.run_pending();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        queue.run_pending();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(*thread.lock().unwrap(), Some(std::thread::current().id()));
    }

    #[test]
    fn test_refresh_has_no_hidden_state() {
        let network = Arc::new(
            FakeNetworkAgent::new()
                .reply_json(200, token_body())
                .reply_json(200, token_body()),
        );
        let authority = authority(Arc::clone(&network));
        let (first, seen_first) = capture();
        let (second, seen_second) = capture();

        authority.refresh("same", first);
        authority.refresh("same", second);

        assert_eq!(*seen_first.lock().unwrap(), *seen_second.lock().unwrap());
        let sent = network.sent();
        assert_eq!(sent[0], sent[1]);
    }
}

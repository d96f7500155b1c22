//! Authorization URL construction
//!
//! The authorization-code flow starts in the user's browser. These helpers
//! build the URL to send the user to and the `state` nonce that protects
//! the redirect. Exchanging the returned code is
//! [`TokenAuthority::exchange_authorization_code`](crate::auth::TokenAuthority::exchange_authorization_code).

use base64::Engine as _;
use url::Url;

use crate::config::SdkConfig;
use crate::error::{Result, SdkError};

/// Builds the browser URL that starts the authorization-code flow.
///
/// `redirect_uri` is included only when the configuration carries a
/// callback URL; otherwise the server uses the one registered for the
/// application.
///
/// # Errors
///
/// Returns [`SdkError::Config`] if `oauth2_authorize_url` is not a valid
/// URL.
///
/// # Examples
///
/// ```
/// use boxauth::auth::authorization_url;
/// use boxauth::config::SdkConfig;
///
/// let config = SdkConfig::new("my-client", "secret");
/// let url = authorization_url(&config, "xyz").unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://account.box.com/api/oauth2/authorize?response_type=code&client_id=my-client&state=xyz"
/// );
/// ```
pub fn authorization_url(config: &SdkConfig, state: &str) -> Result<Url> {
    let mut url = Url::parse(&config.oauth2_authorize_url)
        .map_err(|e| SdkError::Config(format!("oauth2_authorize_url is not a valid URL: {e}")))?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("response_type", "code");
        query.append_pair("client_id", &config.client_id);
        if let Some(ref redirect_uri) = config.callback_url {
            query.append_pair("redirect_uri", redirect_uri);
        }
        query.append_pair("state", state);
    }

    Ok(url)
}

/// Generates a random `state` nonce.
///
/// 16 random bytes encoded as base64url without padding.
pub fn generate_state() -> String {
    use rand::RngCore as _;
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

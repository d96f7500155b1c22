//! Grant requests and their wire parameters
//!
//! Each grant variant owns exactly the inputs its parameter set needs, so
//! a request can't be built with a field missing. [`Grant::form`] renders
//! the `application/x-www-form-urlencoded` fields for `oauth2/token`.
//! [`Revocation::form`] does the same for `oauth2/revoke`.

use std::collections::BTreeMap;

use crate::auth::scope::{scope_string, ScopeSet};
use crate::config::SdkConfig;

/// Path of the token endpoint, relative to the API base URL.
pub const TOKEN_ENDPOINT: &str = "oauth2/token";

/// Path of the revocation endpoint, relative to the API base URL.
pub const REVOKE_ENDPOINT: &str = "oauth2/revoke";

/// `grant_type` for token exchange (downscoping).
pub const TOKEN_EXCHANGE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";

/// `subject_token_type` sent with token exchange.
pub const ACCESS_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:access_token";

/// Identity a client-credentials token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionIdentity {
    /// A managed or app user, by user id
    User(String),
    /// The application's service account, by enterprise id
    Enterprise(String),
}

impl ConnectionIdentity {
    /// Value of `box_subject_type`.
    pub fn subject_type(&self) -> &'static str {
        match self {
            ConnectionIdentity::User(_) => "user",
            ConnectionIdentity::Enterprise(_) => "enterprise",
        }
    }

    /// Value of `box_subject_id`.
    pub fn subject_id(&self) -> &str {
        match self {
            ConnectionIdentity::User(id) | ConnectionIdentity::Enterprise(id) => id,
        }
    }
}

/// Inputs of a token-exchange (downscope) grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownscopeRequest {
    /// Fully-scoped parent access token
    pub subject_token: String,
    /// Scopes the new token is limited to
    pub scopes: ScopeSet,
    /// Full API URL of the item the token is bound to
    pub resource: Option<String>,
    /// Shared link the token is bound to
    pub shared_link: Option<String>,
}

/// A token-issuing request to `oauth2/token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    /// Exchange an authorization code
    AuthorizationCode {
        /// Code returned to the redirect URI
        code: String,
    },
    /// Exchange a refresh token
    RefreshToken {
        /// Current refresh token
        refresh_token: String,
    },
    /// Client-credentials grant for a user or enterprise
    ClientCredentials {
        /// Subject of the issued token
        identity: ConnectionIdentity,
    },
    /// Token exchange producing a downscoped token
    TokenExchange(DownscopeRequest),
}

impl Grant {
    /// Value of `grant_type`.
    pub fn grant_type(&self) -> &'static str {
        match self {
            Grant::AuthorizationCode { .. } => "authorization_code",
            Grant::RefreshToken { .. } => "refresh_token",
            Grant::ClientCredentials { .. } => "client_credentials",
            Grant::TokenExchange(_) => TOKEN_EXCHANGE_GRANT_TYPE,
        }
    }

    /// Renders the form fields for this grant.
    ///
    /// Client-authenticated grants always carry `client_id` and
    /// `client_secret`. Token exchange is authenticated by its subject
    /// token. It sends `resource` and `box_shared_link` only when they are
    /// present.
    pub fn form(&self, config: &SdkConfig) -> BTreeMap<String, String> {
        let mut form = BTreeMap::new();
        form.insert("grant_type".to_string(), self.grant_type().to_string());

        match self {
            Grant::AuthorizationCode { code } => {
                insert_client_credentials(&mut form, config);
                form.insert("code".to_string(), code.clone());
            }
            Grant::RefreshToken { refresh_token } => {
                insert_client_credentials(&mut form, config);
                form.insert("refresh_token".to_string(), refresh_token.clone());
            }
            Grant::ClientCredentials { identity } => {
                insert_client_credentials(&mut form, config);
                form.insert("box_subject_id".to_string(), identity.subject_id().to_string());
                form.insert(
                    "box_subject_type".to_string(),
                    identity.subject_type().to_string(),
                );
            }
            Grant::TokenExchange(request) => {
                form.insert("subject_token".to_string(), request.subject_token.clone());
                form.insert(
                    "subject_token_type".to_string(),
                    ACCESS_TOKEN_TYPE.to_string(),
                );
                form.insert("scope".to_string(), scope_string(&request.scopes));
                if let Some(ref resource) = request.resource {
                    form.insert("resource".to_string(), resource.clone());
                }
                if let Some(ref shared_link) = request.shared_link {
                    form.insert("box_shared_link".to_string(), shared_link.clone());
                }
            }
        }

        form
    }
}

/// A request to `oauth2/revoke`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revocation {
    /// Access or refresh token to invalidate
    pub token: String,
}

impl Revocation {
    /// Renders the form fields for the revocation.
    pub fn form(&self, config: &SdkConfig) -> BTreeMap<String, String> {
        let mut form = BTreeMap::new();
        insert_client_credentials(&mut form, config);
        form.insert("token".to_string(), self.token.clone());
        form
    }
}

fn insert_client_credentials(form: &mut BTreeMap<String, String>, config: &SdkConfig) {
    form.insert("client_id".to_string(), config.client_id.clone());
    form.insert("client_secret".to_string(), config.client_secret.clone());
}

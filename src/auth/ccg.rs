//! Client-credentials grant
//!
//! Server-side applications obtain tokens for their service account (an
//! enterprise) or for a specific user without a browser round trip.
//! [`ClientCredentialsAuthority`] pins one [`ConnectionIdentity`] to a
//! [`TokenAuthority`] and reuses it for every request.

use crate::auth::authority::{TokenAuthority, TokenCallback};
use crate::auth::grant::{ConnectionIdentity, Grant};

/// Builds the client-credentials grant for `identity`.
pub fn client_credentials_grant(identity: &ConnectionIdentity) -> Grant {
    Grant::ClientCredentials {
        identity: identity.clone(),
    }
}

impl TokenAuthority {
    /// Requests a client-credentials token for `identity`.
    ///
    /// The reply is decoded like any other token grant and usually carries
    /// no refresh token; request a new token when it expires.
    pub fn client_credentials_token(&self, identity: &ConnectionIdentity, completion: TokenCallback) {
        tracing::debug!(
            subject_type = identity.subject_type(),
            "requesting client credentials token"
        );
        self.request_token(client_credentials_grant(identity), completion);
    }
}

/// A [`TokenAuthority`] bound to one client-credentials identity.
#[derive(Debug, Clone)]
pub struct ClientCredentialsAuthority {
    authority: TokenAuthority,
    identity: ConnectionIdentity,
}

impl ClientCredentialsAuthority {
    /// Binds `identity` to `authority`.
    pub fn new(authority: TokenAuthority, identity: ConnectionIdentity) -> Self {
        Self {
            authority,
            identity,
        }
    }

    /// Requests a fresh token for the bound identity.
    pub fn token(&self, completion: TokenCallback) {
        self.authority
            .client_credentials_token(&self.identity, completion);
    }

    /// The underlying authority, for refresh, revoke and downscope.
    pub fn authority(&self) -> &TokenAuthority {
        &self.authority
    }

    /// The identity tokens are issued for.
    pub fn identity(&self) -> &ConnectionIdentity {
        &self.identity
    }
}

//! OAuth2 token lifecycle
//!
//! - [`token`] -- the [`Token`] returned by every grant.
//! - [`scope`] -- [`TokenScope`] capabilities for downscoping.
//! - [`grant`] -- grant variants and their wire parameters.
//! - [`authority`] -- [`TokenAuthority`], which sends grants and decodes
//!   replies.
//! - [`ccg`] -- client-credentials grants for users and enterprises.
//! - [`authorize`] -- browser authorization URL and `state` nonce.

pub mod authority;
pub mod authorize;
pub mod ccg;
pub mod grant;
pub mod scope;
pub mod token;

pub use authority::{TokenAuthority, TokenCallback};
pub use authorize::{authorization_url, generate_state};
pub use ccg::{client_credentials_grant, ClientCredentialsAuthority};
pub use grant::{ConnectionIdentity, DownscopeRequest, Grant, Revocation};
pub use scope::{scope_string, ScopeSet, TokenScope};
pub use token::Token;

//! boxauth - Box OAuth2 token lifecycle library
//!
//! This library obtains, refreshes, revokes and downscopes access tokens
//! for the Box content API. Every operation is continuation-based: it
//! takes a [`Callback`](callback::Callback) that receives exactly one
//! `Result`, delivered on the caller's chosen
//! [`Dispatcher`](dispatch::Dispatcher).
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: Token model, scopes, grants and the token authority
//! - `transport`: Network agent abstraction and the reqwest implementation
//! - `response`: Response decoders that classify raw replies
//! - `callback`: Continuations, the complete-once latch and the async bridge
//! - `dispatch`: Execution contexts for continuations
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use boxauth::{await_completion, InlineDispatcher, SdkConfig, TokenAuthority};
//! use boxauth::transport::http::HttpNetworkAgent;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SdkConfig::load("boxauth.yaml")?;
//!     config.validate()?;
//!
//!     let config = Arc::new(config);
//!     let network = Arc::new(HttpNetworkAgent::new(&config)?);
//!     let authority = TokenAuthority::new(network, config, Arc::new(InlineDispatcher));
//!
//!     let token = await_completion(|done| authority.exchange_authorization_code("code", done)).await?;
//!     println!("{}", token.access_token);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod callback;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod response;
pub mod transport;

// Re-export commonly used types
pub use auth::{
    ClientCredentialsAuthority, ConnectionIdentity, ScopeSet, Token, TokenAuthority, TokenScope,
};
pub use callback::{await_completion, Callback, CompletionLatch};
pub use config::SdkConfig;
pub use dispatch::{Dispatcher, InlineDispatcher, MainQueue, MainQueueDispatcher};
pub use error::{DecodeError, DecodeErrorKind, Result, SdkError};
pub use transport::{ApiRequest, NetworkAgent, RawResponse};

/*!
Command handlers for the CLI

Each handler drives one [`TokenAuthority`] operation and renders its
outcome for the terminal. Continuations are delivered through a
[`MainQueue`] drained on the main task, so every result is observed on
the same context that issued the request.
*/

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::auth::{self, ScopeSet, Token, TokenAuthority};
use crate::callback::await_completion;
use crate::cli::{connection_identity, Commands};
use crate::config::SdkConfig;
use crate::dispatch::MainQueue;
use crate::transport::http::HttpNetworkAgent;

/// Executes `command` and prints its output to stdout.
///
/// # Errors
///
/// Returns an error if the transport cannot be built or the operation
/// fails.
pub async fn run(command: Commands, config: SdkConfig) -> Result<()> {
    if let Commands::AuthorizeUrl { state } = command {
        let output = authorize::render(&config, state)?;
        println!("{output}");
        return Ok(());
    }

    let config = Arc::new(config);
    let network = Arc::new(
        HttpNetworkAgent::new(&config).context("Failed to initialize HTTP transport")?,
    );
    let (dispatcher, queue) = MainQueue::new();
    let authority = TokenAuthority::new(network, Arc::clone(&config), Arc::new(dispatcher));

    let work = async move {
        let outcome = execute(&authority, command).await;
        // Releases the last dispatcher so the queue can finish.
        drop(authority);
        outcome
    };
    let ((), output) = tokio::join!(queue.run(), work);

    println!("{}", output?);
    Ok(())
}

async fn execute(authority: &TokenAuthority, command: Commands) -> Result<String> {
    match command {
        Commands::Exchange { code } => {
            tracing::info!("Exchanging authorization code");
            let token = await_completion(|done| authority.exchange_authorization_code(&code, done))
                .await
                .context("Authorization code exchange failed")?;
            render_token(&token)
        }
        Commands::Refresh { refresh_token } => {
            tracing::info!("Refreshing token");
            let token = await_completion(|done| authority.refresh(&refresh_token, done))
                .await
                .context("Token refresh failed")?;
            render_token(&token)
        }
        Commands::Revoke { token } => {
            tracing::info!("Revoking token");
            await_completion(|done| authority.revoke(&token, done))
                .await
                .context("Token revocation failed")?;
            Ok("Token revoked".to_string())
        }
        Commands::Downscope {
            token,
            scopes,
            resource,
            shared_link,
        } => {
            let scopes: ScopeSet = scopes.into_iter().collect();
            tracing::info!(
                scopes = %auth::scope_string(&scopes),
                "Downscoping token"
            );
            let token = await_completion(|done| {
                authority.downscope(
                    &token,
                    &scopes,
                    resource.as_deref(),
                    shared_link.as_deref(),
                    done,
                )
            })
            .await
            .context("Token downscope failed")?;
            render_token(&token)
        }
        Commands::ClientCredentials {
            user_id,
            enterprise_id,
        } => {
            let identity = connection_identity(user_id, enterprise_id)
                .context("Either --user-id or --enterprise-id is required")?;
            let ccg = auth::ClientCredentialsAuthority::new(authority.clone(), identity);
            tracing::info!(
                subject_type = ccg.identity().subject_type(),
                "Requesting client credentials token"
            );
            let token = await_completion(|done| ccg.token(done))
                .await
                .context("Client credentials grant failed")?;
            render_token(&token)
        }
        Commands::AuthorizeUrl { state } => authorize::render(authority.config(), state),
    }
}

fn render_token(token: &Token) -> Result<String> {
    serde_json::to_string_pretty(token).context("Failed to serialize token")
}

pub mod authorize {
    //! Authorization URL command.
    //!
    //! Purely local: builds the URL from configuration and never touches
    //! the network.

    use anyhow::{Context, Result};

    use crate::auth::{authorization_url, generate_state};
    use crate::config::SdkConfig;

    /// Renders the authorization URL, and the state when it was generated.
    pub fn render(config: &SdkConfig, state: Option<String>) -> Result<String> {
        let generated = state.is_none();
        let state = state.unwrap_or_else(generate_state);
        let url = authorization_url(config, &state).context("Failed to build authorization URL")?;

        if generated {
            Ok(format!("{url}\nstate: {state}"))
        } else {
            Ok(url.to_string())
        }
    }
}

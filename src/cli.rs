//! Command-line interface definition for boxauth
//!
//! This module defines the CLI structure using clap's derive API. Each
//! subcommand maps onto one token operation.

use clap::{ArgGroup, Parser, Subcommand};

use crate::auth::{ConnectionIdentity, TokenScope};

/// boxauth - Box OAuth2 token tool
///
/// Exchange, refresh, revoke and downscope Box API tokens from the
/// command line.
#[derive(Parser, Debug, Clone)]
#[command(name = "boxauth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "boxauth.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for boxauth
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Exchange an authorization code for a token
    Exchange {
        /// Authorization code returned to the redirect URI
        #[arg(long)]
        code: String,
    },

    /// Exchange a refresh token for a new token
    Refresh {
        /// Current refresh token
        #[arg(long)]
        refresh_token: String,
    },

    /// Revoke an access or refresh token
    Revoke {
        /// Token to revoke
        #[arg(long)]
        token: String,
    },

    /// Exchange a token for a downscoped one
    Downscope {
        /// Fully-scoped parent access token
        #[arg(long)]
        token: String,

        /// Scope to grant (repeatable, or comma separated)
        #[arg(long = "scope", required = true, value_delimiter = ',')]
        scopes: Vec<TokenScope>,

        /// Full API URL of the item to restrict the token to
        #[arg(long)]
        resource: Option<String>,

        /// Shared link to restrict the token to
        #[arg(long)]
        shared_link: Option<String>,
    },

    /// Request a client-credentials token
    #[command(group(
        ArgGroup::new("subject")
            .required(true)
            .args(["user_id", "enterprise_id"])
    ))]
    ClientCredentials {
        /// Issue the token for this user
        #[arg(long)]
        user_id: Option<String>,

        /// Issue the token for this enterprise's service account
        #[arg(long)]
        enterprise_id: Option<String>,
    },

    /// Print the browser URL that starts the authorization-code flow
    AuthorizeUrl {
        /// State nonce to embed (generated when omitted)
        #[arg(long)]
        state: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Resolves the client-credentials subject chosen on the command line.
///
/// Returns `None` when neither id was given; clap's argument group rules
/// that out for parsed input.
pub fn connection_identity(
    user_id: Option<String>,
    enterprise_id: Option<String>,
) -> Option<ConnectionIdentity> {
    match (user_id, enterprise_id) {
        (Some(user), _) => Some(ConnectionIdentity::User(user)),
        (None, Some(enterprise)) => Some(ConnectionIdentity::Enterprise(enterprise)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_exchange() {
        let cli = Cli::try_parse_from(["boxauth", "exchange", "--code", "abc"]).unwrap();
        assert_eq!(cli.config, "boxauth.yaml");
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Exchange { code } if code == "abc"));
    }

    #[test]
    fn test_cli_parse_refresh_with_config() {
        let cli = Cli::try_parse_from([
            "boxauth",
            "--config",
            "other.yaml",
            "-v",
            "refresh",
            "--refresh-token",
            "r1",
        ])
        .unwrap();
        assert_eq!(cli.config, "other.yaml");
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Refresh { refresh_token } if refresh_token == "r1"));
    }

    #[test]
    fn test_cli_parse_downscope_scopes() {
        let cli = Cli::try_parse_from([
            "boxauth",
            "downscope",
            "--token",
            "parent",
            "--scope",
            "item_preview,item_upload",
            "--scope",
            "base_explorer",
            "--shared-link",
            "https://app.box.com/s/abc",
        ])
        .unwrap();
        if let Commands::Downscope {
            token,
            scopes,
            resource,
            shared_link,
        } = cli.command
        {
            assert_eq!(token, "parent");
            assert_eq!(
                scopes,
                vec![
                    TokenScope::ItemPreview,
                    TokenScope::ItemUpload,
                    TokenScope::BaseExplorer
                ]
            );
            assert!(resource.is_none());
            assert_eq!(shared_link.as_deref(), Some("https://app.box.com/s/abc"));
        } else {
            panic!("Expected Downscope command");
        }
    }

    #[test]
    fn test_cli_downscope_rejects_unknown_scope() {
        let result = Cli::try_parse_from([
            "boxauth",
            "downscope",
            "--token",
            "t",
            "--scope",
            "item_everything",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_downscope_requires_scope() {
        assert!(Cli::try_parse_from(["boxauth", "downscope", "--token", "t"]).is_err());
    }

    #[test]
    fn test_cli_client_credentials_requires_one_subject() {
        assert!(Cli::try_parse_from(["boxauth", "client-credentials"]).is_err());
        assert!(Cli::try_parse_from([
            "boxauth",
            "client-credentials",
            "--user-id",
            "1",
            "--enterprise-id",
            "2"
        ])
        .is_err());

        let cli =
            Cli::try_parse_from(["boxauth", "client-credentials", "--enterprise-id", "2"]).unwrap();
        if let Commands::ClientCredentials {
            user_id,
            enterprise_id,
        } = cli.command
        {
            assert_eq!(
                connection_identity(user_id, enterprise_id),
                Some(ConnectionIdentity::Enterprise("2".to_string()))
            );
        } else {
            panic!("Expected ClientCredentials command");
        }
    }

    #[test]
    fn test_cli_parse_authorize_url() {
        let cli = Cli::try_parse_from(["boxauth", "authorize-url", "--state", "s"]).unwrap();
        assert!(matches!(cli.command, Commands::AuthorizeUrl { state } if state.as_deref() == Some("s")));
    }

    #[test]
    fn test_connection_identity_prefers_user() {
        assert_eq!(
            connection_identity(Some("u".to_string()), None),
            Some(ConnectionIdentity::User("u".to_string()))
        );
        assert_eq!(connection_identity(None, None), None);
    }
}

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use wiremock::MockServer;

use boxauth::config::SdkConfig;
use boxauth::dispatch::{Dispatcher, InlineDispatcher};
use boxauth::transport::http::HttpNetworkAgent;
use boxauth::TokenAuthority;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("boxauth.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Configuration pointing the API host at `server`.
#[allow(dead_code)]
pub fn mock_config(server: &MockServer) -> SdkConfig {
    SdkConfig::new("test-client-id", "test-client-secret").with_api_base_url(server.uri())
}

/// Authority over a real HTTP agent that completes inline.
#[allow(dead_code)]
pub fn mock_authority(server: &MockServer) -> TokenAuthority {
    authority_with(mock_config(server), Arc::new(InlineDispatcher))
}

#[allow(dead_code)]
pub fn authority_with(config: SdkConfig, dispatcher: Arc<dyn Dispatcher>) -> TokenAuthority {
    let network = HttpNetworkAgent::new(&config).expect("HTTP agent inside a runtime");
    TokenAuthority::new(Arc::new(network), Arc::new(config), dispatcher)
}

/// A token-endpoint reply body.
#[allow(dead_code)]
pub fn token_body() -> serde_json::Value {
    serde_json::json!({
        "access_token": "T9cE5asGnuyYCCqIZFoWjFHvNbvVqHjl",
        "refresh_token": "J7rxTiWOHMoSC1isKZKBZWizoRXjkQzig5C6jFgCVJ9bUnsUfGMinKBDLZWP9BgR",
        "expires_in": 3600,
        "token_type": "bearer"
    })
}

/// Bodies of every request the mock server received, as text.
#[allow(dead_code)]
pub async fn received_bodies(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}

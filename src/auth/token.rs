//! Token issued by the authorization server

use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

/// Result of a successful grant exchange.
///
/// Immutable once decoded; ownership passes to the caller and nothing in
/// this crate keeps a copy.
///
/// # Examples
///
/// ```
/// use boxauth::auth::Token;
///
/// let token: Token = serde_json::from_str(
///     r#"{"access_token":"T9cE5asGnuyYCCqIZFoWjFHvNbvVqHjl","expires_in":3600,
///         "token_type":"bearer","refresh_token":"J7rxTiWOHMoSC1isKZKBZWizoRXjkQzig5C6jFgCVJ9bUnsUfGMinKBDLZWP9BgR"}"#,
/// ).unwrap();
/// assert_eq!(token.expires_in, 3600);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Bearer credential for API calls
    pub access_token: String,

    /// Credential for obtaining the next token; absent for downscoped and
    /// client-credentials tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Lifetime of the access token in seconds
    ///
    /// Servers may send any JSON number; fractional seconds are truncated.
    #[serde(deserialize_with = "deserialize_seconds")]
    pub expires_in: u64,

    /// Token type, typically `"bearer"`
    pub token_type: String,

    /// Issued token type URN, returned by token exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_token_type: Option<String>,

    /// Resources a downscoped token is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted_to: Option<Vec<serde_json::Value>>,
}

/// Accepts any non-negative JSON number as whole seconds.
fn deserialize_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(seconds) = number.as_u64() {
        return Ok(seconds);
    }
    match number.as_f64() {
        Some(seconds) if seconds.is_finite() && seconds >= 0.0 && seconds <= u64::MAX as f64 => {
            Ok(seconds.trunc() as u64)
        }
        Some(seconds) => Err(D::Error::invalid_value(
            Unexpected::Float(seconds),
            &"a non-negative number of seconds",
        )),
        None => Err(D::Error::custom(format!("invalid expires_in: {number}"))),
    }
}

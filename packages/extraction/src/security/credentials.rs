//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of the provider key.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

use crate::error::{Result, ScrapeError};

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., in an API request).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The LLM provider credential.
#[derive(Clone)]
pub struct ApiCredentials {
    api_key: SecretString,
}

impl ApiCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
        }
    }

    /// Resolve the credential from an explicit token or, failing that, from
    /// [`API_KEY_ENV`] via `lookup`.
    ///
    /// Blank values count as missing.
    pub fn resolve<F>(explicit: Option<String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        explicit
            .filter(|token| !token.trim().is_empty())
            .or_else(|| lookup(API_KEY_ENV).filter(|token| !token.trim().is_empty()))
            .map(Self::new)
            .ok_or_else(|| {
                ScrapeError::Config(format!(
                    "{} not set; add it to .env or pass an API token explicitly",
                    API_KEY_ENV
                ))
            })
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

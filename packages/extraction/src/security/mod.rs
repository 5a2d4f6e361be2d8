//! Credential handling.

pub mod credentials;

pub use credentials::{ApiCredentials, SecretString, API_KEY_ENV};

//! Credential handling.

pub mod credentials;

pub use credentials::{ApiKey, SecretString};

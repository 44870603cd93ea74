//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate so API keys are never accidentally exposed
//! in logs, debug output, or error messages. Log lines that need to
//! identify a key use [`ApiKey::suffix`], which reveals only the last
//! four characters.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., in an API
    /// request header).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
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

/// One extraction-service API key; the unit of quota tracking.
#[derive(Clone)]
pub struct ApiKey {
    id: usize,
    secret: SecretString,
}

impl ApiKey {
    /// Create a new key with a pool-assigned identifier.
    pub fn new(id: usize, secret: impl Into<String>) -> Self {
        Self {
            id,
            secret: SecretString::new(secret),
        }
    }

    /// Stable identifier within the pool (load order).
    pub fn id(&self) -> usize {
        self.id
    }

    /// The secret value, for building the service request.
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Last four characters of the key, safe for log lines.
    pub fn suffix(&self) -> String {
        let exposed = self.secret.expose();
        let tail: String = exposed
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{tail}")
    }
}

impl PartialEq for ApiKey {
    fn eq(&self, other: &Self) -> bool {
        self.secret == other.secret
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("id", &self.id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_not_in_debug() {
        let secret = SecretString::new("AIza-super-secret-key");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("AIza"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn secret_not_in_display() {
        let secret = SecretString::new("AIza-super-secret-key");
        let display = format!("{}", secret);
        assert!(!display.contains("AIza"));
        assert!(display.contains("[REDACTED]"));
    }

    #[test]
    fn expose_works() {
        let secret = SecretString::new("AIza-super-secret-key");
        assert_eq!(secret.expose(), "AIza-super-secret-key");
    }

    #[test]
    fn api_key_debug_redacts() {
        let key = ApiKey::new(0, "AIza-secret-1234");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("AIza"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn api_key_suffix_shows_only_tail() {
        let key = ApiKey::new(0, "AIza-secret-1234");
        assert_eq!(key.suffix(), "...1234");

        let short = ApiKey::new(1, "ab");
        assert_eq!(short.suffix(), "...ab");
    }
}

use std::fmt::{Debug, Formatter};

use geosign_core::{utils::Redact, SigningCredential};

/// Credential for the geodata service.
///
/// An immutable consumer key/secret pair identifying one registered
/// application. Both fields are opaque byte-safe strings; they are
/// percent-encoded on the wire and survive the round-trip unchanged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Consumer key identifying the application.
    pub consumer_key: String,
    /// Shared secret used to key the request signature.
    pub consumer_secret: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    /// The anonymous credential: a distinct variant with empty key and
    /// secret, used for requests that go out unsigned.
    pub fn anonymous() -> Self {
        Self::new("", "")
    }

    /// Check whether this is the anonymous credential.
    pub fn is_anonymous(&self) -> bool {
        self.consumer_key.is_empty() && self.consumer_secret.is_empty()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("consumer_key", &Redact::from(&self.consumer_key))
            .field("consumer_secret", &Redact::from(&self.consumer_secret))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        // An empty consumer key is only acceptable for the anonymous
        // variant; everything else needs an identifier.
        !self.consumer_key.is_empty() || self.is_anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_is_valid_and_distinct() {
        let anon = Credential::anonymous();
        assert!(anon.is_anonymous());
        assert!(anon.is_valid());
        assert_ne!(anon, Credential::new("CONSUMERKEY", "CONSUMERSECRET"));
    }

    #[test]
    fn test_empty_key_with_secret_is_invalid() {
        let cred = Credential::new("", "CONSUMERSECRET");
        assert!(!cred.is_anonymous());
        assert!(!cred.is_valid());
    }

    #[test]
    fn test_debug_redacts_fields() {
        let cred = Credential::new("CONSUMERKEY1", "CONSUMERSECRET");
        let out = format!("{cred:?}");
        assert!(!out.contains("CONSUMERKEY1"));
        assert!(!out.contains("CONSUMERSECRET"));
    }
}

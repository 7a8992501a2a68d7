use async_trait::async_trait;
use geosign_core::{Context, ProvideCredential, Result};

use crate::credential::Credential;

/// StaticCredentialProvider returns a fixed credential supplied
/// programmatically at construction.
#[derive(Debug)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a provider for the given consumer key/secret pair.
    pub fn new(consumer_key: &str, consumer_secret: &str) -> Self {
        Self {
            credential: Credential::new(consumer_key, consumer_secret),
        }
    }

    /// Create a provider that always yields the anonymous credential, for
    /// clients that send unsigned requests.
    pub fn anonymous() -> Self {
        Self {
            credential: Credential::anonymous(),
        }
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticCredentialProvider::new("CONSUMERKEY", "CONSUMERSECRET");
        let cred = provider
            .provide_credential(&Context::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cred.consumer_key, "CONSUMERKEY");
        assert_eq!(cred.consumer_secret, "CONSUMERSECRET");
    }
}

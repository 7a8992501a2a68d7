use async_trait::async_trait;
use geosign_core::{Context, ProvideCredential, Result};

use crate::{constants::*, Credential};

/// EnvCredentialProvider loads the consumer credential from environment
/// variables.
///
/// This provider looks for the following environment variables:
/// - `SIMPLEGEO_CONSUMER_KEY`: the consumer key
/// - `SIMPLEGEO_CONSUMER_SECRET`: the consumer secret
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        match (
            envs.get(SIMPLEGEO_CONSUMER_KEY),
            envs.get(SIMPLEGEO_CONSUMER_SECRET),
        ) {
            (Some(key), Some(secret)) => Ok(Some(Credential::new(key, secret))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosign_core::{OsEnv, StaticEnv};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_env_credential_provider() {
        let envs = HashMap::from([
            (
                SIMPLEGEO_CONSUMER_KEY.to_string(),
                "test_consumer_key".to_string(),
            ),
            (
                SIMPLEGEO_CONSUMER_SECRET.to_string(),
                "test_consumer_secret".to_string(),
            ),
        ]);

        let ctx = Context::new().with_env(StaticEnv { envs });

        let provider = EnvCredentialProvider::new();
        let cred = provider.provide_credential(&ctx).await.unwrap();
        assert!(cred.is_some());
        let cred = cred.unwrap();
        assert_eq!(cred.consumer_key, "test_consumer_key");
        assert_eq!(cred.consumer_secret, "test_consumer_secret");
    }

    #[tokio::test]
    async fn test_env_credential_provider_partial_credentials() {
        // Only the key, no secret.
        let envs = HashMap::from([(
            SIMPLEGEO_CONSUMER_KEY.to_string(),
            "test_consumer_key".to_string(),
        )]);

        let ctx = Context::new().with_env(StaticEnv { envs });

        let provider = EnvCredentialProvider::new();
        let cred = provider.provide_credential(&ctx).await.unwrap();
        assert!(cred.is_none());
    }

    #[test]
    fn test_env_credential_provider_process_env() {
        let _ = env_logger::builder().is_test(true).try_init();

        temp_env::with_vars(
            vec![
                (SIMPLEGEO_CONSUMER_KEY, Some("consumer_key")),
                (SIMPLEGEO_CONSUMER_SECRET, Some("consumer_secret")),
            ],
            || {
                tokio::runtime::Runtime::new().unwrap().block_on(async {
                    let ctx = Context::new().with_env(OsEnv);
                    let provider = EnvCredentialProvider::new();

                    let cred = provider
                        .provide_credential(&ctx)
                        .await
                        .expect("load must succeed")
                        .expect("credential must be found");
                    assert_eq!("consumer_key", cred.consumer_key);
                    assert_eq!("consumer_secret", cred.consumer_secret);
                })
            },
        );
    }
}

use std::fmt::{Debug, Formatter};

use crate::constants::*;
use geosign_core::{utils::Redact, Context};

/// Config carries all the configuration for a geodata service client.
#[derive(Clone, Default)]
pub struct Config {
    /// `consumer_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`SIMPLEGEO_CONSUMER_KEY`]
    pub consumer_key: Option<String>,
    /// `consumer_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`SIMPLEGEO_CONSUMER_SECRET`]
    pub consumer_secret: Option<String>,
    /// Optional protection-space label included first in the credential
    /// header.
    pub realm: Option<String>,
    /// API endpoint the client talks to. Defaults to [`DEFAULT_BASE_URL`];
    /// set it explicitly to point a client at another environment.
    pub base_url: Option<String>,
}

impl Config {
    /// Create a new Config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set consumer_key.
    pub fn with_consumer_key(mut self, consumer_key: impl Into<String>) -> Self {
        self.consumer_key = Some(consumer_key.into());
        self
    }

    /// Set consumer_secret.
    pub fn with_consumer_secret(mut self, consumer_secret: impl Into<String>) -> Self {
        self.consumer_secret = Some(consumer_secret.into());
        self
    }

    /// Set realm.
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Set base_url.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(SIMPLEGEO_CONSUMER_KEY) {
            self.consumer_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(SIMPLEGEO_CONSUMER_SECRET) {
            self.consumer_secret.get_or_insert(v);
        }

        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("consumer_key", &self.consumer_key.as_ref().map(Redact::from))
            .field(
                "consumer_secret",
                &self.consumer_secret.as_ref().map(Redact::from),
            )
            .field("realm", &self.realm)
            .field("base_url", &self.base_url)
            .finish()
    }
}

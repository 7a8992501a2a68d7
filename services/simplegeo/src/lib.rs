//! Signed client for the SimpleGeo geodata service.
//!
//! The service exposes location context lookup, nearby-place search and a
//! key/value geospatial record store over HTTP, authenticated with
//! two-legged OAuth 1.0 request signing. This crate pairs the
//! [`RequestSigner`] with a [`Client`] that wraps every endpoint.
//!
//! ## Example
//!
//! ```no_run
//! use geosign_core::Context;
//! use geosign_http_send_reqwest::ReqwestHttpSend;
//! use geosign_simplegeo::{Client, Config, GeoPoint};
//!
//! # async fn example() -> geosign_core::Result<()> {
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
//! let config = Config::new()
//!     .with_consumer_key("my-key")
//!     .with_consumer_secret("my-secret");
//! let client = Client::new(ctx, config)?;
//!
//! let context = client
//!     .context_coord(GeoPoint::new(49.239, -123.129), &[("filter", "features")])
//!     .await?;
//! println!("{context}");
//! # Ok(())
//! # }
//! ```

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::{RequestSigner, SignatureMethod};

mod provide_credential;
pub use provide_credential::{
    DefaultCredentialProvider, EnvCredentialProvider, StaticCredentialProvider,
};

mod client;
pub use client::{Client, QueryParams};

mod record;
pub use record::{GeoPoint, Place, PropertyValue, Record};

mod constants;
pub use constants::DEFAULT_BASE_URL;

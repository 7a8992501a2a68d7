//! The geodata API client.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Uri};
use log::debug;
use std::str::FromStr;

use crate::config::Config;
use crate::constants::DEFAULT_BASE_URL;
use crate::credential::Credential;
use crate::provide_credential::{DefaultCredentialProvider, StaticCredentialProvider};
use crate::record::{GeoPoint, Place, Record};
use crate::sign_request::RequestSigner;
use geosign_core::{Context, Error, Result, Signer};

/// Extra query parameters accepted by most lookup endpoints
/// (`q`, `category`, `radius`, `limit`, `types`, `start`, `end`, `filter`, ...).
pub type QueryParams<'a> = &'a [(&'a str, &'a str)];

/// Client for a SimpleGeo-style geodata service.
///
/// The client owns no connection state of its own: the transport comes in
/// through the [`Context`], the credential through a provider chain, and the
/// base URL is an explicit per-instance field so differently-configured
/// clients (staging, production) can coexist in one process.
///
/// Responses are decoded into generic [`serde_json::Value`] mappings.
#[derive(Clone, Debug)]
pub struct Client {
    ctx: Context,
    signer: Signer<Credential>,
    base_url: String,
}

impl Client {
    /// Create a client from a config.
    ///
    /// A consumer key/secret pair in the config takes priority; otherwise
    /// the default provider chain applies (environment variables, then the
    /// anonymous credential for unsigned access).
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::config_invalid("base url must not be empty"));
        }

        let mut provider = DefaultCredentialProvider::new();
        if let (Some(key), Some(secret)) = (&config.consumer_key, &config.consumer_secret) {
            provider = provider.push_front(StaticCredentialProvider::new(key, secret));
        }

        let mut request_signer = RequestSigner::new();
        if let Some(realm) = &config.realm {
            request_signer = request_signer.with_realm(realm.as_str());
        }

        Ok(Self {
            signer: Signer::new(ctx.clone(), provider, request_signer),
            ctx,
            base_url,
        })
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the list of all possible feature categories.
    pub async fn feature_categories(&self) -> Result<serde_json::Value> {
        self.get("1.0/features/categories.json", &[]).await
    }

    /// Returns detailed information about a feature.
    pub async fn feature(&self, handle: &str) -> Result<serde_json::Value> {
        self.get(&format!("1.0/features/{handle}.json"), &[]).await
    }

    /// Returns the context of an IP address.
    pub async fn context_ip(&self, ip: &str, opts: QueryParams<'_>) -> Result<serde_json::Value> {
        self.get(&format!("1.0/context/{ip}.json"), opts).await
    }

    /// Returns the context of a coordinate.
    pub async fn context_coord(
        &self,
        point: GeoPoint,
        opts: QueryParams<'_>,
    ) -> Result<serde_json::Value> {
        self.get(&format!("1.0/context/{},{}.json", point.lat, point.lng), opts)
            .await
    }

    /// Returns the context of a street address (US only).
    pub async fn context_address(
        &self,
        address: &str,
        opts: QueryParams<'_>,
    ) -> Result<serde_json::Value> {
        let mut params = vec![("address", address)];
        params.extend_from_slice(opts);
        self.get("1.0/context/address.json", &params).await
    }

    /// Returns places nearby an IP address.
    pub async fn places_ip(&self, ip: &str, opts: QueryParams<'_>) -> Result<serde_json::Value> {
        self.get(&format!("1.0/places/{ip}.json"), opts).await
    }

    /// Returns places nearby a coordinate.
    pub async fn places_coord(
        &self,
        point: GeoPoint,
        opts: QueryParams<'_>,
    ) -> Result<serde_json::Value> {
        self.get(&format!("1.0/places/{},{}.json", point.lat, point.lng), opts)
            .await
    }

    /// Returns places nearby a street address (US only).
    pub async fn places_address(
        &self,
        address: &str,
        opts: QueryParams<'_>,
    ) -> Result<serde_json::Value> {
        let mut params = vec![("address", address)];
        params.extend_from_slice(opts);
        self.get("1.0/places/address.json", &params).await
    }

    /// Contribute a new feature to the shared places database.
    ///
    /// The service assigns the handle; inserting the same place twice makes
    /// the later insert win.
    pub async fn create_place(&self, place: &Place) -> Result<serde_json::Value> {
        self.send(Method::POST, "1.0/places", &[], Some(place.to_feature()))
            .await
    }

    /// Update an existing place.
    pub async fn update_place(&self, place: &Place) -> Result<serde_json::Value> {
        let handle = place.handle.as_deref().ok_or_else(|| {
            Error::request_invalid("place has no handle; create it before updating")
        })?;
        self.send(
            Method::POST,
            &format!("1.0/features/{handle}.json"),
            &[],
            Some(place.to_feature()),
        )
        .await
    }

    /// Suggest that a place be deleted, hiding it from this application's
    /// view. Returns a status token.
    pub async fn delete_place(&self, handle: &str) -> Result<serde_json::Value> {
        self.send(
            Method::DELETE,
            &format!("1.0/features/{handle}.json"),
            &[],
            None,
        )
        .await
    }

    /// Insert a storage record under its layer and id.
    pub async fn put_record(&self, record: &Record) -> Result<serde_json::Value> {
        self.send(
            Method::PUT,
            &format!("0.1/records/{}/{}.json", record.layer, record.id),
            &[],
            Some(record.to_feature()?),
        )
        .await
    }

    /// Fetch a storage record.
    pub async fn get_record(&self, layer: &str, id: &str) -> Result<serde_json::Value> {
        self.get(&format!("0.1/records/{layer}/{id}.json"), &[]).await
    }

    /// Delete a storage record.
    pub async fn delete_record(&self, layer: &str, id: &str) -> Result<serde_json::Value> {
        self.send(
            Method::DELETE,
            &format!("0.1/records/{layer}/{id}.json"),
            &[],
            None,
        )
        .await
    }

    /// Retrieve the history of a storage record.
    pub async fn record_history(
        &self,
        layer: &str,
        id: &str,
        opts: QueryParams<'_>,
    ) -> Result<serde_json::Value> {
        self.get(&format!("0.1/records/{layer}/{id}/history.json"), opts)
            .await
    }

    /// Retrieve storage records nearby a coordinate.
    pub async fn nearby_records_coord(
        &self,
        layer: &str,
        point: GeoPoint,
        opts: QueryParams<'_>,
    ) -> Result<serde_json::Value> {
        self.get(
            &format!("0.1/records/{layer}/nearby/{},{}.json", point.lat, point.lng),
            opts,
        )
        .await
    }

    /// Retrieve storage records nearby a [geohash](https://geohash.org).
    pub async fn nearby_records_geohash(
        &self,
        layer: &str,
        geohash: &str,
        opts: QueryParams<'_>,
    ) -> Result<serde_json::Value> {
        self.get(&format!("0.1/records/{layer}/nearby/{geohash}.json"), opts)
            .await
    }

    /// Retrieve storage records nearby an IP address.
    pub async fn nearby_records_ip(
        &self,
        layer: &str,
        ip: &str,
        opts: QueryParams<'_>,
    ) -> Result<serde_json::Value> {
        self.get(&format!("0.1/records/{layer}/nearby/{ip}.json"), opts)
            .await
    }

    /// Retrieve storage records nearby a street address (US only).
    pub async fn nearby_records_address(
        &self,
        layer: &str,
        address: &str,
        opts: QueryParams<'_>,
    ) -> Result<serde_json::Value> {
        let mut params = vec![("address", address)];
        params.extend_from_slice(opts);
        self.get(&format!("0.1/records/{layer}/nearby/address.json"), &params)
            .await
    }

    async fn get(&self, path: &str, query: QueryParams<'_>) -> Result<serde_json::Value> {
        self.send(Method::GET, path, query, None).await
    }

    /// Build, sign and dispatch one request, decoding the JSON response.
    ///
    /// Every request parameter travels in the query string so the signature
    /// covers it; JSON bodies never enter the canonical parameter set.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: QueryParams<'_>,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let mut url = format!("{}/{path}", self.base_url);
        if !query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }
        let uri = Uri::from_str(&url)?;
        debug!("sending {method} {uri}");

        let body_bytes = match &body {
            Some(value) => {
                let encoded = serde_json::to_vec(value).map_err(|e| {
                    Error::unexpected("failed to encode request body").with_source(e)
                })?;
                Bytes::from(encoded)
            }
            None => Bytes::new(),
        };

        let mut builder = http::Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let (mut parts, _) = builder.body(())?.into_parts();

        self.signer.sign(&mut parts, None).await?;

        let request = http::Request::from_parts(parts, body_bytes);
        let (parts, body) = self.ctx.http_send(request).await?.into_parts();

        if !parts.status.is_success() {
            return Err(Error::unexpected(format!(
                "request failed with status {}: {}",
                parts.status,
                String::from_utf8_lossy(&body)
            )));
        }

        if body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&body)
            .map_err(|e| Error::unexpected("response body is not valid JSON").with_source(e))
    }
}

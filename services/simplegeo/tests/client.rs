//! Client tests against an in-process transport double.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{Method, StatusCode};

use geosign_core::{Context, ErrorKind, HttpSend, Result, StaticEnv};
use geosign_simplegeo::{Client, Config, GeoPoint, Place, Record};

/// Captures every request and answers with a canned response.
#[derive(Debug, Clone)]
struct MockHttpSend {
    seen: Arc<Mutex<Vec<(http::request::Parts, Bytes)>>>,
    status: StatusCode,
    body: &'static str,
}

impl MockHttpSend {
    fn new(status: StatusCode, body: &'static str) -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
            status,
            body,
        }
    }

    fn ok(body: &'static str) -> Self {
        Self::new(StatusCode::OK, body)
    }

    fn last_request(&self) -> (http::request::Parts, Bytes) {
        self.seen
            .lock()
            .unwrap()
            .last()
            .map(|(parts, body)| {
                let mut builder = http::Request::builder()
                    .method(parts.method.clone())
                    .uri(parts.uri.clone());
                *builder.headers_mut().unwrap() = parts.headers.clone();
                (builder.body(()).unwrap().into_parts().0, body.clone())
            })
            .expect("no request was sent")
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        self.seen.lock().unwrap().push((parts, body));

        Ok(http::Response::builder()
            .status(self.status)
            .body(Bytes::from_static(self.body.as_bytes()))
            .unwrap())
    }
}

fn signed_client(mock: &MockHttpSend) -> Client {
    let ctx = Context::new().with_http_send(mock.clone());
    let config = Config::new()
        .with_consumer_key("CONSUMERKEY")
        .with_consumer_secret("CONSUMERSECRET");
    Client::new(ctx, config).unwrap()
}

#[tokio::test]
async fn test_context_coord_sends_signed_request() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mock = MockHttpSend::ok(r#"{"features": []}"#);
    let client = signed_client(&mock);

    let response = client
        .context_coord(GeoPoint::new(49.239, -123.129), &[("filter", "features")])
        .await
        .unwrap();
    assert_eq!(response["features"], serde_json::json!([]));

    let (parts, _) = mock.last_request();
    assert_eq!(parts.method, Method::GET);
    assert_eq!(parts.uri.path(), "/1.0/context/49.239,-123.129.json");
    assert_eq!(parts.uri.query(), Some("filter=features"));

    let auth = parts
        .headers
        .get(AUTHORIZATION)
        .expect("request must be signed")
        .to_str()
        .unwrap();
    assert!(auth.starts_with("OAuth "));
    for param in [
        "oauth_consumer_key=\"CONSUMERKEY\"",
        "oauth_nonce=",
        "oauth_signature=",
        "oauth_signature_method=\"HMAC-SHA1\"",
        "oauth_timestamp=",
        "oauth_version=\"1.0\"",
    ] {
        assert!(auth.contains(param), "header misses {param}: {auth}");
    }
}

#[tokio::test]
async fn test_client_without_credentials_sends_unsigned_request() {
    let mock = MockHttpSend::ok(r#"{"categories": []}"#);
    let ctx = Context::new().with_http_send(mock.clone());
    let client = Client::new(ctx, Config::new()).unwrap();

    client.feature_categories().await.unwrap();

    let (parts, _) = mock.last_request();
    assert_eq!(parts.uri.path(), "/1.0/features/categories.json");
    assert!(parts.headers.get(AUTHORIZATION).is_none());
}

#[tokio::test]
async fn test_env_credentials_are_picked_up() {
    let mock = MockHttpSend::ok("{}");
    let ctx = Context::new().with_http_send(mock.clone()).with_env(StaticEnv {
        envs: HashMap::from([
            ("SIMPLEGEO_CONSUMER_KEY".to_string(), "env_key".to_string()),
            (
                "SIMPLEGEO_CONSUMER_SECRET".to_string(),
                "env_secret".to_string(),
            ),
        ]),
    });
    let client = Client::new(ctx, Config::new()).unwrap();

    client.feature("SG_4H2GqJDZrc0ZAjKGR8qM4D").await.unwrap();

    let (parts, _) = mock.last_request();
    let auth = parts
        .headers
        .get(AUTHORIZATION)
        .expect("request must be signed")
        .to_str()
        .unwrap();
    assert!(auth.contains("oauth_consumer_key=\"env_key\""));
}

#[tokio::test]
async fn test_put_record_sends_feature_body() {
    let mock = MockHttpSend::ok("{}");
    let client = signed_client(&mock);

    let mut record =
        Record::new("restaurants", "record-1").with_point(GeoPoint::new(49.2, -123.1));
    record.set_property("name", "Milano Coffee");
    record.set_property("rating", 4.5);

    client.put_record(&record).await.unwrap();

    let (parts, body) = mock.last_request();
    assert_eq!(parts.method, Method::PUT);
    assert_eq!(parts.uri.path(), "/0.1/records/restaurants/record-1.json");
    assert_eq!(
        parts.headers.get(CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let feature: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let round_tripped = Record::from_feature("restaurants", &feature).unwrap();
    assert_eq!(round_tripped, record);
}

#[tokio::test]
async fn test_nearby_records_keeps_repeated_query_names() {
    let mock = MockHttpSend::ok(r#"{"features": []}"#);
    let client = signed_client(&mock);

    client
        .nearby_records_geohash(
            "restaurants",
            "c2b2qebz5b9w",
            &[("types", "object"), ("types", "place"), ("limit", "10")],
        )
        .await
        .unwrap();

    let (parts, _) = mock.last_request();
    assert_eq!(
        parts.uri.path(),
        "/0.1/records/restaurants/nearby/c2b2qebz5b9w.json"
    );
    assert_eq!(parts.uri.query(), Some("types=object&types=place&limit=10"));
}

#[tokio::test]
async fn test_update_place_requires_handle() {
    let mock = MockHttpSend::ok("{}");
    let client = signed_client(&mock);

    let place = Place::new(GeoPoint::new(37.0, -122.0));
    let err = client.update_place(&place).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);

    // Nothing must have gone out.
    assert!(mock.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_record_decodes_empty_body_as_null() {
    let mock = MockHttpSend::ok("");
    let client = signed_client(&mock);

    let response = client.delete_record("restaurants", "record-1").await.unwrap();
    assert_eq!(response, serde_json::Value::Null);

    let (parts, _) = mock.last_request();
    assert_eq!(parts.method, Method::DELETE);
}

#[tokio::test]
async fn test_non_success_status_is_surfaced() {
    let mock = MockHttpSend::new(StatusCode::NOT_FOUND, r#"{"message": "no such record"}"#);
    let client = signed_client(&mock);

    let err = client.get_record("restaurants", "missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert!(err.to_string().contains("404"));
    assert!(err.to_string().contains("no such record"));
}

#[tokio::test]
async fn test_base_url_override() {
    let mock = MockHttpSend::ok("{}");
    let ctx = Context::new().with_http_send(mock.clone());
    let config = Config::new()
        .with_consumer_key("CONSUMERKEY")
        .with_consumer_secret("CONSUMERSECRET")
        .with_base_url("http://localhost:8080/");
    let client = Client::new(ctx, config).unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");

    client.feature_categories().await.unwrap();

    let (parts, _) = mock.last_request();
    assert_eq!(
        parts.uri.to_string(),
        "http://localhost:8080/1.0/features/categories.json"
    );
}

#[tokio::test]
async fn test_malformed_base_url_fails_before_dispatch() {
    let mock = MockHttpSend::ok("{}");
    let ctx = Context::new().with_http_send(mock.clone());
    let config = Config::new().with_base_url("api.simplegeo.com");
    let client = Client::new(ctx, config).unwrap();

    let err = client.feature_categories().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UrlInvalid);

    // The signer rejected the URL; no network call was attempted.
    assert!(mock.seen.lock().unwrap().is_empty());
}

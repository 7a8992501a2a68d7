//! OAuth 1.0 request signing.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::request::Parts;
use http::HeaderValue;
use log::debug;
use percent_encoding::utf8_percent_encode;
use rand::Rng;

use crate::constants::*;
use crate::credential::Credential;
use geosign_core::hash::{base64_hmac_sha1, base64_hmac_sha256};
use geosign_core::time::{format_unix_timestamp, now, DateTime};
use geosign_core::{Context, Error, Result, SignRequest, SigningRequest};

/// Signature methods understood by the service.
///
/// HMAC-SHA1 is the protocol default and is retained for compatibility with
/// servers that verify it; HMAC-SHA256 is available where the server
/// negotiates a stronger hash. PLAINTEXT transmits the bare key and is only
/// useful against test servers over an encrypted transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureMethod {
    /// HMAC with SHA-1, the protocol default.
    #[default]
    HmacSha1,
    /// HMAC with SHA-256.
    HmacSha256,
    /// No hash at all; the signature is the signing key itself.
    Plaintext,
}

impl SignatureMethod {
    /// The protocol identifier for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::HmacSha1 => "HMAC-SHA1",
            SignatureMethod::HmacSha256 => "HMAC-SHA256",
            SignatureMethod::Plaintext => "PLAINTEXT",
        }
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HMAC-SHA1" => Ok(SignatureMethod::HmacSha1),
            "HMAC-SHA256" => Ok(SignatureMethod::HmacSha256),
            "PLAINTEXT" => Ok(SignatureMethod::Plaintext),
            _ => Err(Error::signature_method_unsupported(format!(
                "unknown signature method: {s}"
            ))),
        }
    }
}

/// RequestSigner that implements two-legged OAuth 1.0 signing.
///
/// - [RFC 5849: The OAuth 1.0 Protocol](https://tools.ietf.org/html/rfc5849)
///
/// The signer is a pure function of the request, the credential and the
/// per-call nonce/timestamp; it holds no shared mutable state and may be
/// used from any number of tasks at once.
#[derive(Debug)]
pub struct RequestSigner {
    realm: Option<String>,
    signature_method: SignatureMethod,

    time: Option<DateTime>,
    nonce: Option<String>,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a new signer with the default HMAC-SHA1 method.
    pub fn new() -> Self {
        Self {
            realm: None,
            signature_method: SignatureMethod::default(),
            time: None,
            nonce: None,
        }
    }

    /// Include a protection-space label as the first header parameter.
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Select the signature method.
    pub fn with_signature_method(mut self, method: SignatureMethod) -> Self {
        self.signature_method = method;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Specify the nonce.
    ///
    /// # Note
    ///
    /// Reusing a nonce defeats replay protection.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        parts: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        if expires_in.is_some() {
            return Err(Error::request_invalid(
                "bounded-lifetime signatures are not part of this scheme",
            ));
        }

        let cred =
            credential.ok_or_else(|| Error::credential_invalid("no credential loaded"))?;
        if cred.is_anonymous() {
            // Anonymous credential: the request goes out unsigned.
            return Ok(());
        }
        if cred.consumer_key.is_empty() {
            return Err(Error::credential_invalid(
                "consumer key must not be empty for signed requests",
            ));
        }

        let nonce = self.nonce.clone().unwrap_or_else(generate_nonce);
        let time = self.time.unwrap_or_else(now);

        let mut req = SigningRequest::build(parts)?;

        let oauth_params = protocol_params(cred, &nonce, time, self.signature_method);
        let base_string = signature_base_string(&req, &oauth_params);
        debug!("signature base string: {base_string}");

        let signature = compute_signature(
            self.signature_method,
            &base_string,
            &cred.consumer_secret,
        );

        let header = authorization_header(self.realm.as_deref(), &oauth_params, &signature);
        req.headers.insert(AUTHORIZATION, {
            let mut value: HeaderValue = header.parse()?;
            value.set_sensitive(true);

            value
        });

        req.apply(parts)
    }
}

/// Percent-encode per RFC 5849 §3.6.
fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, &PARAMETER_ENCODE_SET).to_string()
}

/// A fresh unpredictable token for each request.
fn generate_nonce() -> String {
    let mut buf = [0u8; 16];
    rand::thread_rng().fill(&mut buf[..]);
    hex::encode(buf)
}

/// The protocol parameters contributed by the auth scheme itself.
///
/// `oauth_signature` is deliberately absent: it never enters the canonical
/// parameter set it signs.
fn protocol_params(
    cred: &Credential,
    nonce: &str,
    time: DateTime,
    method: SignatureMethod,
) -> Vec<(String, String)> {
    vec![
        (OAUTH_CONSUMER_KEY.to_string(), cred.consumer_key.clone()),
        (OAUTH_NONCE.to_string(), nonce.to_string()),
        (
            OAUTH_SIGNATURE_METHOD.to_string(),
            method.as_str().to_string(),
        ),
        (OAUTH_TIMESTAMP.to_string(), format_unix_timestamp(time)),
        (OAUTH_VERSION.to_string(), OAUTH_VERSION_VALUE.to_string()),
    ]
}

/// Reconstruct the base URL: lowercased scheme and host, default ports
/// omitted, query and fragment stripped, path untouched.
fn base_uri(req: &SigningRequest) -> String {
    let scheme = req.scheme.as_str().to_ascii_lowercase();
    let host = req.authority.host().to_ascii_lowercase();

    let default_port = match scheme.as_str() {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    };
    let port = req.authority.port_u16().filter(|p| Some(*p) != default_port);

    match port {
        Some(port) => format!("{scheme}://{host}:{port}{}", req.path),
        None => format!("{scheme}://{host}{}", req.path),
    }
}

/// Construct the signature base string.
///
/// ## Format
///
/// ```text
/// METHOD & enc(base-url) & enc(sorted "name=value" pairs joined by "&")
/// ```
///
/// Request parameters and protocol parameters merge into one flat set; each
/// name and value is encoded first, then pairs sort byte-wise by encoded
/// name and value, so the result is independent of insertion order while
/// repeated names stay distinct.
fn signature_base_string(req: &SigningRequest, oauth_params: &[(String, String)]) -> String {
    let mut pairs = req
        .query
        .iter()
        .chain(oauth_params)
        .filter(|(k, _)| !RESERVED_PARAMS.contains(k.as_str()))
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect::<Vec<(String, String)>>();
    pairs.sort();

    let normalized = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<String>>()
        .join("&");

    format!(
        "{}&{}&{}",
        req.method.as_str().to_ascii_uppercase(),
        percent_encode(&base_uri(req)),
        percent_encode(&normalized)
    )
}

/// The key for the keyed hash: encoded consumer secret, a literal '&', and
/// the encoded token secret. This client never carries a per-request token,
/// so the token secret slot stays empty.
fn signing_key(consumer_secret: &str) -> String {
    format!("{}&{}", percent_encode(consumer_secret), percent_encode(""))
}

fn compute_signature(
    method: SignatureMethod,
    base_string: &str,
    consumer_secret: &str,
) -> String {
    let key = signing_key(consumer_secret);
    match method {
        SignatureMethod::HmacSha1 => base64_hmac_sha1(key.as_bytes(), base_string.as_bytes()),
        SignatureMethod::HmacSha256 => base64_hmac_sha256(key.as_bytes(), base_string.as_bytes()),
        SignatureMethod::Plaintext => key,
    }
}

/// Render the credential header: every protocol parameter plus the
/// signature, percent-encoded, double-quoted and comma-separated, with any
/// realm first.
fn authorization_header(
    realm: Option<&str>,
    oauth_params: &[(String, String)],
    signature: &str,
) -> String {
    let mut params = oauth_params.to_vec();
    params.push((OAUTH_SIGNATURE.to_string(), signature.to_string()));
    params.sort();

    let mut header = String::from("OAuth ");
    if let Some(realm) = realm {
        header.push_str(&format!("realm=\"{}\", ", percent_encode(realm)));
    }
    for (i, (k, v)) in params.iter().enumerate() {
        if i > 0 {
            header.push_str(", ");
        }
        header.push_str(&format!("{}=\"{}\"", percent_encode(k), percent_encode(v)));
    }

    header
}

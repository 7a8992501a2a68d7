use std::mem;

use http::uri::{Authority, PathAndQuery, Scheme};
use http::{HeaderMap, Method, Uri};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::str::FromStr;

use crate::{Error, Result};

/// RFC 3986 query encoding: everything but unreserved characters escapes.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Signing context for a request.
///
/// The URL is decomposed so signers can canonicalize its parts without
/// re-parsing, and query pairs are kept as a list so repeated names survive.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, exactly as given (no segment normalization).
    pub path: String,
    /// Decoded HTTP query parameters.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    ///
    /// Fails with `UrlInvalid` when the URI has no scheme or no authority,
    /// and with `EncodingInvalid` when the query does not decode to UTF-8.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri
                .scheme
                .ok_or_else(|| Error::url_invalid("request uri has no scheme"))?,
            authority: uri
                .authority
                .ok_or_else(|| Error::url_invalid("request uri has no authority"))?,
            path: paq.path().to_string(),
            query: paq.query().map(parse_query).transpose()?.unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return them when the context is applied.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        let query_size = self.query_size();

        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = if query_size == 0 {
                    self.path
                } else {
                    let mut s = self.path;
                    s.reserve(query_size + 1);

                    s.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            s.push('&');
                        }

                        s.extend(utf8_percent_encode(k, QUERY_ENCODE_SET));
                        if !v.is_empty() {
                            s.push('=');
                            s.extend(utf8_percent_encode(v, QUERY_ENCODE_SET));
                        }
                    }

                    s
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
    }

    /// Push a new query pair into the query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }
}

/// Parse a raw query string into decoded pairs.
///
/// Decoding is strict: bytes that do not form valid UTF-8 after
/// percent-decoding are an error, not replaced, so the canonical form stays
/// deterministic.
fn parse_query(query: &str) -> Result<Vec<(String, String)>> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((decode_component(k)?, decode_component(v)?))
        })
        .collect()
}

fn decode_component(s: &str) -> Result<String> {
    // form-style encoding transmits space as '+'; "%2B" is untouched here.
    let s = s.replace('+', " ");
    percent_decode_str(&s)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| {
            Error::encoding_invalid("query component is not valid utf-8 after percent-decoding")
                .with_source(e)
        })
}

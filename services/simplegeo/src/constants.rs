use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashSet;

// Protocol parameter names.
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub const OAUTH_NONCE: &str = "oauth_nonce";
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
pub const OAUTH_VERSION: &str = "oauth_version";
pub const OAUTH_VERSION_VALUE: &str = "1.0";
pub const REALM: &str = "realm";

// Env values used by the credential providers.
pub const SIMPLEGEO_CONSUMER_KEY: &str = "SIMPLEGEO_CONSUMER_KEY";
pub const SIMPLEGEO_CONSUMER_SECRET: &str = "SIMPLEGEO_CONSUMER_SECRET";

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "http://api.simplegeo.com";

/// AsciiSet for [RFC 5849 parameter encoding](https://tools.ietf.org/html/rfc5849#section-3.6)
///
/// - ALPHA, DIGIT, '-', '.', '_', '~' MUST NOT be encoded.
/// - All other characters MUST be encoded, with uppercase hex digits.
///
/// Form-style encoding (space as '+') must never be used here.
pub static PARAMETER_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

// Parameter names that never enter the signature base string.
pub(crate) static RESERVED_PARAMS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from([OAUTH_SIGNATURE, REALM]));

//! Hop-by-hop header scrubbing for the reverse proxy.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header};

/// Headers never forwarded upstream. Framing is recomputed for the streamed body.
pub const REQUEST_EXCLUDED: &[&str] = &[
    "host",
    "content-length",
    "transfer-encoding",
    "connection",
    "keep-alive",
    "accept-encoding",
];

/// Headers never relayed back to the caller.
pub const RESPONSE_EXCLUDED: &[&str] = &[
    "content-length",
    "transfer-encoding",
    "connection",
    "keep-alive",
    "content-encoding",
];

/// Headers copied onto the search request so authenticated databases accept it.
pub const SEARCH_FORWARDED: &[&str] = &["authorization", "api-key"];

fn without(headers: &HeaderMap, excluded: &[&str]) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !excluded.contains(&name.as_str()) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

/// Outbound request headers: hop-by-hop removed, `accept-encoding: identity` forced.
pub fn scrub_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = without(headers, REQUEST_EXCLUDED);
    out.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("identity"));
    out
}

/// Response headers: hop-by-hop and `content-encoding` removed, `connection: close` forced.
pub fn scrub_response_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = without(headers, RESPONSE_EXCLUDED);
    out.insert(header::CONNECTION, HeaderValue::from_static("close"));
    out
}

/// Authentication headers worth carrying over to the search call.
pub fn search_auth_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for name in SEARCH_FORWARDED {
        for value in headers.get_all(*name) {
            out.append(HeaderName::from_static(*name), value.clone());
        }
    }
    out
}

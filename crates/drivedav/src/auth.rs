//! Basic-authentication gate.
//!
//! Runs before the router: requests without valid credentials are
//! answered with a 401 challenge and never reach the namespace. The
//! router therefore assumes every request it sees is authorized.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use dav_server::body::Body;
use hyper::header::{HeaderMap, HeaderValue, AUTHORIZATION, WWW_AUTHENTICATE};
use hyper::{Response, StatusCode};
use tracing::debug;

/// The challenge announced on unauthenticated requests.
const CHALLENGE: &str = "Basic realm=\"drivedav\"";

/// One username/password pair checked against `Authorization: Basic`.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    /// Create a gate for the given credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Whether the request headers carry valid credentials.
    pub fn verify(&self, headers: &HeaderMap) -> bool {
        match decode_credentials(headers) {
            Some((user, pass)) => user == self.username && pass == self.password,
            None => false,
        }
    }
}

/// The 401 challenge sent when verification fails.
pub fn challenge() -> Response<Body> {
    debug!("rejecting unauthenticated request");
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
    response
}

/// Extract the username/password pair from an `Authorization` header.
fn decode_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;

    // Scheme comparison is case-insensitive per RFC 7617.
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}
